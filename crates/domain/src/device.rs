//! Device — a garden appliance (pool pump, irrigation zone, lights…) wired to
//! a GPIO pin of the controller board.
//!
//! Besides identity and wiring, a device carries its three fences:
//!
//! | Fence | Field | Disabled when |
//! |-------|-------|---------------|
//! | weather | `weather_fence` (humidity %) | `0` |
//! | timer | `timer_fence` (seconds on) | `0` |
//! | device | `device_fence` (ids that must be off) | empty |

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;
use crate::id::DeviceId;

/// A controllable garden device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub description: Option<String>,
    /// Slot on the control panel. Unique across devices.
    pub position: u32,
    /// Controller pin. Unique across devices.
    pub gpio: u32,
    /// Last state *reported* by the hardware.
    pub status: bool,
    /// Humidity percentage above which the device may not be turned on.
    pub weather_fence: u8,
    /// Seconds after which a device that was turned on is turned off again.
    pub timer_fence: u32,
    /// Devices that must all be off before this one may be turned on.
    /// Order matters: the first conflicting entry is the one reported.
    pub device_fence: Vec<DeviceId>,
}

impl Device {
    /// Start building a new device with a freshly minted id.
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check every invariant that can be verified on a single record.
    ///
    /// Uniqueness of `position` and `gpio` spans several records and is
    /// enforced by the application layer and the registry.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.weather_fence > 100 {
            return Err(ValidationError::WeatherFenceOutOfRange(self.weather_fence));
        }
        if self.device_fence.contains(&self.id) {
            return Err(ValidationError::SelfFence);
        }
        Ok(())
    }

    /// Whether a humidity threshold is configured.
    #[must_use]
    pub fn has_weather_fence(&self) -> bool {
        self.weather_fence != 0
    }

    /// Whether an auto-shutoff delay is configured.
    #[must_use]
    pub fn has_timer_fence(&self) -> bool {
        self.timer_fence != 0
    }

    /// Drop `other` from this device's fence. Returns `true` when the fence
    /// changed.
    pub fn unfence(&mut self, other: DeviceId) -> bool {
        let before = self.device_fence.len();
        self.device_fence.retain(|id| *id != other);
        before != self.device_fence.len()
    }

    /// Apply a partial update. Fields left as `None` keep their value;
    /// `description: Some(None)` clears the description.
    pub fn apply(&mut self, update: DeviceUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(position) = update.position {
            self.position = position;
        }
        if let Some(gpio) = update.gpio {
            self.gpio = gpio;
        }
        if let Some(weather_fence) = update.weather_fence {
            self.weather_fence = weather_fence;
        }
        if let Some(timer_fence) = update.timer_fence {
            self.timer_fence = timer_fence;
        }
        if let Some(device_fence) = update.device_fence {
            self.device_fence = dedup(device_fence);
        }
    }
}

/// Partial update of a [`Device`].
///
/// `status` is deliberately absent: only shadow reconciliation writes it.
/// In JSON, an explicit `"description": null` clears the description while
/// an absent field keeps it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceUpdate {
    pub name: Option<String>,
    #[serde(
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    pub position: Option<u32>,
    pub gpio: Option<u32>,
    pub weather_fence: Option<u8>,
    pub timer_fence: Option<u32>,
    pub device_fence: Option<Vec<DeviceId>>,
}

/// Deserialize a present field, `null` included, as `Some`; absence is left
/// to `#[serde(default)]`.
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    name: Option<String>,
    description: Option<String>,
    position: u32,
    gpio: u32,
    status: bool,
    weather_fence: u8,
    timer_fence: u32,
    device_fence: Vec<DeviceId>,
}

impl DeviceBuilder {
    /// Use a known id instead of minting one (rehydration, tests).
    #[must_use]
    pub fn id(mut self, id: DeviceId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn position(mut self, position: u32) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn gpio(mut self, gpio: u32) -> Self {
        self.gpio = gpio;
        self
    }

    #[must_use]
    pub fn status(mut self, status: bool) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn weather_fence(mut self, threshold: u8) -> Self {
        self.weather_fence = threshold;
        self
    }

    #[must_use]
    pub fn timer_fence(mut self, seconds: u32) -> Self {
        self.timer_fence = seconds;
        self
    }

    #[must_use]
    pub fn device_fence(mut self, ids: impl IntoIterator<Item = DeviceId>) -> Self {
        self.device_fence = ids.into_iter().collect();
        self
    }

    /// Validate and produce the device.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when an invariant does not hold.
    pub fn build(self) -> Result<Device, ValidationError> {
        let device = Device {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description,
            position: self.position,
            gpio: self.gpio,
            status: self.status,
            weather_fence: self.weather_fence,
            timer_fence: self.timer_fence,
            device_fence: dedup(self.device_fence),
        };
        device.validate()?;
        Ok(device)
    }
}

/// Remove repeated ids, keeping the first occurrence.
fn dedup(ids: Vec<DeviceId>) -> Vec<DeviceId> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}
