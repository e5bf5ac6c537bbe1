//! Fence evaluator — gathers fence inputs and applies the domain rules.

use std::collections::HashMap;

use gardenhub_domain::device::Device;
use gardenhub_domain::error::GardenHubError;
use gardenhub_domain::fence::{self, FenceVerdict};

use crate::ports::{DeviceRepository, WeatherProvider};

/// Decides whether a device may change to a requested status.
pub struct FenceEvaluator<R, W> {
    repo: R,
    weather: W,
}

impl<R, W> FenceEvaluator<R, W>
where
    R: DeviceRepository,
    W: WeatherProvider,
{
    pub fn new(repo: R, weather: W) -> Self {
        Self { repo, weather }
    }

    /// Evaluate `device`'s fences for `requested`.
    ///
    /// The device fence is checked before the weather fence and the first
    /// failing check wins. The weather service is only queried when needed.
    /// A failing weather lookup is logged and treated as "not fenced".
    ///
    /// # Errors
    ///
    /// Returns a storage error if the fence members cannot be loaded.
    #[tracing::instrument(skip(self, device), fields(device_id = %device.id))]
    pub async fn evaluate(
        &self,
        device: &Device,
        requested: bool,
    ) -> Result<FenceVerdict, GardenHubError> {
        if !requested {
            return Ok(FenceVerdict::Allow);
        }

        if !device.device_fence.is_empty() {
            let members = self.repo.get_many(&device.device_fence).await?;
            let states: HashMap<_, _> = members.iter().map(|d| (d.id, d.status)).collect();
            for id in &device.device_fence {
                if !states.contains_key(id) {
                    tracing::warn!(fence_member = %id, "device fence references unknown device");
                }
            }
            if let Some(blocking) = fence::blocking_device(device, |id| states.get(&id).copied()) {
                tracing::info!(blocking_device = %blocking, "order blocked by device fence");
                return Ok(FenceVerdict::DeviceFenced(blocking));
            }
        }

        if device.has_weather_fence() {
            let humidity = match self.weather.current_humidity().await {
                Ok(value) => Some(value),
                Err(err) => {
                    tracing::warn!(error = %err, "weather lookup failed, ignoring weather fence");
                    None
                }
            };
            if fence::weather_blocks(device, humidity) {
                tracing::info!(
                    humidity = humidity.unwrap_or_default(),
                    threshold = device.weather_fence,
                    "order blocked by weather fence"
                );
                return Ok(FenceVerdict::WeatherFenced);
            }
        }

        Ok(FenceVerdict::Allow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixedWeather, InMemoryDeviceRepo};
    use gardenhub_domain::id::DeviceId;
    use std::sync::Arc;

    fn device(name: &str, position: u32, status: bool) -> Device {
        Device::builder()
            .name(name)
            .position(position)
            .gpio(position + 10)
            .status(status)
            .build()
            .unwrap()
    }

    fn fenced(fence: &[DeviceId], weather_fence: u8) -> Device {
        Device::builder()
            .name("Lower irrigation")
            .position(9)
            .gpio(19)
            .device_fence(fence.iter().copied())
            .weather_fence(weather_fence)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_allow_turning_off_without_looking_at_fences() {
        let on = device("Pool", 1, true);
        let target = fenced(&[on.id], 10);
        let weather = Arc::new(FixedWeather::humidity(99));
        let evaluator =
            FenceEvaluator::new(InMemoryDeviceRepo::with([on]), Arc::clone(&weather));

        let verdict = evaluator.evaluate(&target, false).await.unwrap();

        assert_eq!(verdict, FenceVerdict::Allow);
        assert_eq!(weather.calls(), 0);
    }

    #[tokio::test]
    async fn should_block_when_fence_member_is_on() {
        let off = device("Chill out", 1, false);
        let on = device("Pool", 2, true);
        let target = fenced(&[off.id, on.id], 0);
        let evaluator = FenceEvaluator::new(
            InMemoryDeviceRepo::with([off, on.clone()]),
            FixedWeather::humidity(0),
        );

        let verdict = evaluator.evaluate(&target, true).await.unwrap();

        assert_eq!(verdict, FenceVerdict::DeviceFenced(on.id));
    }

    #[tokio::test]
    async fn should_prefer_device_fence_over_weather_fence() {
        let on = device("Pool", 1, true);
        let target = fenced(&[on.id], 50);
        let weather = Arc::new(FixedWeather::humidity(90));
        let evaluator =
            FenceEvaluator::new(InMemoryDeviceRepo::with([on.clone()]), Arc::clone(&weather));

        let verdict = evaluator.evaluate(&target, true).await.unwrap();

        assert_eq!(verdict, FenceVerdict::DeviceFenced(on.id));
        assert_eq!(weather.calls(), 0);
    }

    #[tokio::test]
    async fn should_block_when_humidity_exceeds_threshold() {
        let target = fenced(&[], 60);
        let evaluator =
            FenceEvaluator::new(InMemoryDeviceRepo::default(), FixedWeather::humidity(61));

        let verdict = evaluator.evaluate(&target, true).await.unwrap();

        assert_eq!(verdict, FenceVerdict::WeatherFenced);
    }

    #[tokio::test]
    async fn should_allow_when_weather_lookup_fails() {
        let target = fenced(&[], 60);
        let evaluator =
            FenceEvaluator::new(InMemoryDeviceRepo::default(), FixedWeather::unavailable());

        let verdict = evaluator.evaluate(&target, true).await.unwrap();

        assert_eq!(verdict, FenceVerdict::Allow);
    }

    #[tokio::test]
    async fn should_skip_weather_lookup_when_fence_disabled() {
        let target = fenced(&[], 0);
        let weather = Arc::new(FixedWeather::humidity(100));
        let evaluator = FenceEvaluator::new(InMemoryDeviceRepo::default(), Arc::clone(&weather));

        let verdict = evaluator.evaluate(&target, true).await.unwrap();

        assert_eq!(verdict, FenceVerdict::Allow);
        assert_eq!(weather.calls(), 0);
    }

    #[tokio::test]
    async fn should_treat_dangling_fence_member_as_off() {
        let target = fenced(&[DeviceId::new()], 0);
        let evaluator =
            FenceEvaluator::new(InMemoryDeviceRepo::default(), FixedWeather::humidity(0));

        let verdict = evaluator.evaluate(&target, true).await.unwrap();

        assert_eq!(verdict, FenceVerdict::Allow);
    }
}
