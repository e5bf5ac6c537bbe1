//! Notification — the broadcast sent to subscribers on every shadow change.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::shadow::ShadowEvent;

/// A shadow change, shaped for the fan-out channel.
///
/// Subscribers filter on the flat string [`attributes`](Self::attributes);
/// the body is the shadow envelope double-encoded under `"default"`, which
/// is what the broadcast protocol expects for structured messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    event: ShadowEvent,
}

/// Wire form of a [`Notification`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationMessage {
    pub attributes: BTreeMap<&'static str, String>,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn new(event: ShadowEvent) -> Self {
        Self { event }
    }

    #[must_use]
    pub fn event(&self) -> &ShadowEvent {
        &self.event
    }

    /// `action`, `status` and `device_id` as strings. `status` uses the
    /// capitalised boolean spelling consumers already match on.
    #[must_use]
    pub fn attributes(&self) -> BTreeMap<&'static str, String> {
        let status = if self.event.is_on() { "True" } else { "False" };
        BTreeMap::from([
            ("action", self.event.action().as_str().to_string()),
            ("status", status.to_string()),
            ("device_id", self.event.device_id().to_string()),
        ])
    }

    /// `{"default": "<envelope as JSON string>"}`, serialised.
    #[must_use]
    pub fn body(&self) -> String {
        let inner = self.event.to_value().to_string();
        serde_json::json!({ "default": inner }).to_string()
    }

    #[must_use]
    pub fn to_message(&self) -> NotificationMessage {
        NotificationMessage {
            attributes: self.attributes(),
            message: self.body(),
        }
    }
}
