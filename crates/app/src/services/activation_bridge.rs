//! Activation bridge — answers desired events with a simulated reported
//! event, standing in for real hardware on test benches.
//!
//! Never wire this in front of physical devices: it would confirm orders the
//! hardware did not execute.

use std::time::Duration;

use gardenhub_domain::error::{GardenHubError, NotFoundError};
use gardenhub_domain::shadow::ShadowEvent;

use crate::ports::{DeviceRepository, ShadowTransport};

/// How long a simulated device takes to "switch".
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(3);

pub struct ActivationBridge<R, T> {
    repo: R,
    transport: T,
    settle_delay: Duration,
}

impl<R, T> ActivationBridge<R, T>
where
    R: DeviceRepository,
    T: ShadowTransport,
{
    pub fn new(repo: R, transport: T) -> Self {
        Self {
            repo,
            transport,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Echo a desired event back as reported after the settle delay.
    ///
    /// # Errors
    ///
    /// Returns [`GardenHubError::NotFound`] for an unknown device, or the
    /// transport's error.
    #[tracing::instrument(skip(self), fields(device_id = %desired.device_id()))]
    pub async fn simulate(&self, desired: ShadowEvent) -> Result<(), GardenHubError> {
        let device_id = desired.device_id();
        if self.repo.get_by_id(device_id).await?.is_none() {
            return Err(NotFoundError {
                entity: "Device",
                id: device_id.to_string(),
            }
            .into());
        }

        tokio::time::sleep(self.settle_delay).await;
        self.transport.publish(desired.echo_reported()).await?;
        tracing::debug!(is_on = desired.is_on(), "simulated device report published");
        Ok(())
    }
}
