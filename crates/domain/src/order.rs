//! Order outcomes — the contract between the command core and its callers.
//!
//! Every order evaluation yields exactly one [`OrderStatus`]. Callers (voice
//! skill, HTTP API) branch on the code, never on error types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::DeviceId;

/// Result code of a send-order evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// The device reported the requested state within the deadline.
    Confirmed,
    /// The command was published; nobody waited for the device.
    Unconfirmed,
    /// The command was published but the device never reported back in time.
    Failed,
    /// The device was already in the requested state; nothing was sent.
    Existing,
    /// Another device in the mutual-exclusion fence is on.
    DeviceFenced,
    /// Current humidity is above the device's threshold.
    WeatherFenced,
}

impl OrderStatus {
    /// Stable numeric code, as exposed to the voice front end.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Confirmed => 0,
            Self::Unconfirmed => 1,
            Self::Failed => 2,
            Self::Existing => 3,
            Self::DeviceFenced => 4,
            Self::WeatherFenced => 5,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Confirmed => "CONFIRMED",
            Self::Unconfirmed => "UNCONFIRMED",
            Self::Failed => "FAILED",
            Self::Existing => "EXISTING",
            Self::DeviceFenced => "DEVICE_FENCED",
            Self::WeatherFenced => "WEATHER_FENCED",
        };
        f.write_str(s)
    }
}

/// `{info, err}` pair returned for every order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderOutcome {
    pub info: String,
    pub err: OrderStatus,
}

impl OrderOutcome {
    #[must_use]
    pub fn confirmed() -> Self {
        Self::new(OrderStatus::Confirmed, "Device status confirmed")
    }

    #[must_use]
    pub fn unconfirmed() -> Self {
        Self::new(OrderStatus::Unconfirmed, "Order sent, status not confirmed")
    }

    #[must_use]
    pub fn failed() -> Self {
        Self::new(OrderStatus::Failed, "Device status confirmation failed")
    }

    #[must_use]
    pub fn existing(status: bool) -> Self {
        let state = if status { "on" } else { "off" };
        Self::new(OrderStatus::Existing, format!("Device is already {state}"))
    }

    #[must_use]
    pub fn device_fenced(blocking: DeviceId) -> Self {
        Self::new(
            OrderStatus::DeviceFenced,
            format!("Device is fenced by device {blocking}"),
        )
    }

    #[must_use]
    pub fn weather_fenced() -> Self {
        Self::new(OrderStatus::WeatherFenced, "Device is fenced by weather")
    }

    fn new(err: OrderStatus, info: impl Into<String>) -> Self {
        Self {
            info: info.into(),
            err,
        }
    }
}
