//! Timer-fence runs — delayed auto-shutoff executions.
//!
//! A run is started every time a device with a timer fence reports that it
//! turned on. Several runs may overlap for the same device; only the most
//! recently started one is allowed to turn the device off.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::id::DeviceId;
use crate::shadow::ShadowEvent;

/// UTC timestamp.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Longest name accepted by workflow orchestrators.
pub const MAX_RUN_NAME_LEN: usize = 80;

const RUN_NAME_MARKER: &str = "-timer_fence-";
const ILLEGAL_CHARS: &str = "<>{}[]?*\"#%\\^|~`$&,;:/";

/// Remove every character a workflow orchestrator refuses in a run name
/// (whitespace, control characters, brackets, quotes, separators) and cap
/// the length.
#[must_use]
pub fn sanitize_run_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !c.is_control() && !ILLEGAL_CHARS.contains(*c))
        .take(MAX_RUN_NAME_LEN)
        .collect()
}

/// Name of a timer-fence run: `{device_id}-timer_fence-{timestamp}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TimerRunName(String);

impl TimerRunName {
    /// Deterministic name for a run of `device_id` started at `started_at`.
    #[must_use]
    pub fn new(device_id: DeviceId, started_at: Timestamp) -> Self {
        let stamp = started_at.format("%Y-%m-%dT%H:%M:%S%.6f");
        Self(sanitize_run_name(&format!(
            "{device_id}{RUN_NAME_MARKER}{stamp}"
        )))
    }

    /// Wrap a name read back from an orchestrator.
    #[must_use]
    pub fn from_raw(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Prefix shared by every run of `device_id`.
    #[must_use]
    pub fn prefix_for(device_id: DeviceId) -> String {
        format!("{device_id}{RUN_NAME_MARKER}")
    }

    #[must_use]
    pub fn belongs_to(&self, device_id: DeviceId) -> bool {
        self.0.starts_with(&Self::prefix_for(device_id))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimerRunName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A scheduled auto-shutoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerRun {
    pub name: TimerRunName,
    pub device_id: DeviceId,
    pub delay: Duration,
    /// The reported event that armed this run.
    pub event: ShadowEvent,
}

impl TimerRun {
    /// Arm a run for the device in `event`, waiting `delay_secs`.
    #[must_use]
    pub fn arm(event: ShadowEvent, delay_secs: u32, started_at: Timestamp) -> Self {
        let device_id = event.device_id();
        Self {
            name: TimerRunName::new(device_id, started_at),
            device_id,
            delay: Duration::from_secs(u64::from(delay_secs)),
            event,
        }
    }

    /// Execution input: the original envelope plus `delay` and `name`.
    #[must_use]
    pub fn input(&self) -> serde_json::Value {
        let mut value = self.event.to_value();
        if let Some(map) = value.as_object_mut() {
            map.insert("delay".to_string(), self.delay.as_secs().into());
            map.insert("name".to_string(), self.name.as_str().into());
        }
        value
    }
}
