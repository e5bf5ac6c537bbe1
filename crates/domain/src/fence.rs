//! Fences — interlocks that may forbid turning a device on.
//!
//! This module holds the pure decision rules. Gathering the inputs (fence
//! device states, current humidity) is IO and lives in the application layer.
//!
//! Rules, in evaluation order:
//! 1. Turning a device *off* is never fenced.
//! 2. Device fence: the first fence member (in stored order) that is on blocks.
//! 3. Weather fence: humidity strictly above the threshold blocks. An unknown
//!    humidity does **not** block.

use crate::device::Device;
use crate::id::DeviceId;

/// Result of evaluating a device's fences for a requested status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceVerdict {
    Allow,
    /// Blocked by the given fence member being on.
    DeviceFenced(DeviceId),
    WeatherFenced,
}

impl FenceVerdict {
    #[must_use]
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// First member of `device.device_fence` that is currently on.
///
/// `is_on` answers for a fence member; members it does not know about are
/// considered off.
#[must_use]
pub fn blocking_device(
    device: &Device,
    is_on: impl Fn(DeviceId) -> Option<bool>,
) -> Option<DeviceId> {
    device
        .device_fence
        .iter()
        .copied()
        .find(|id| is_on(*id).unwrap_or(false))
}

/// Whether `humidity` trips the device's weather fence.
///
/// `None` means the lookup failed; see the module docs for why that passes.
#[must_use]
pub fn weather_blocks(device: &Device, humidity: Option<u8>) -> bool {
    if !device.has_weather_fence() {
        return false;
    }
    humidity.is_some_and(|h| h > device.weather_fence)
}
