//! Shadow events — desired/reported state messages exchanged with devices.
//!
//! The wire envelope is
//! `{"state": {"desired"|"reported": {"device_id": "...", "is_on": true}}}`.
//! It is parsed once, at the boundary, into [`ShadowEvent`]; the rest of the
//! system never looks at the raw JSON again. When both keys are present the
//! event is treated as *reported*.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::DeviceId;

/// Payload carried by both kinds of shadow event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowState {
    pub device_id: DeviceId,
    pub is_on: bool,
}

/// A parsed shadow event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowEvent {
    /// Command intent sent towards the device.
    Desired(ShadowState),
    /// State the device claims to be in.
    Reported(ShadowState),
}

/// Which side of the shadow an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadowAction {
    Desired,
    Reported,
}

impl ShadowAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Desired => "desired",
            Self::Reported => "reported",
        }
    }
}

impl fmt::Display for ShadowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a shadow payload was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ShadowError {
    /// Not JSON, or fields of the wrong type.
    #[error("malformed shadow payload")]
    Json(#[from] serde_json::Error),

    /// Neither `state.desired` nor `state.reported` is present.
    #[error("shadow payload has neither desired nor reported state")]
    MissingState,
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    state: EnvelopeState,
}

#[derive(Default, Serialize, Deserialize)]
struct EnvelopeState {
    #[serde(skip_serializing_if = "Option::is_none")]
    desired: Option<ShadowState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reported: Option<ShadowState>,
}

impl ShadowEvent {
    #[must_use]
    pub fn desired(device_id: DeviceId, is_on: bool) -> Self {
        Self::Desired(ShadowState { device_id, is_on })
    }

    #[must_use]
    pub fn reported(device_id: DeviceId, is_on: bool) -> Self {
        Self::Reported(ShadowState { device_id, is_on })
    }

    /// Parse a raw envelope.
    ///
    /// # Errors
    ///
    /// Returns [`ShadowError`] when the payload is not a valid envelope.
    pub fn from_slice(payload: &[u8]) -> Result<Self, ShadowError> {
        let envelope: Envelope = serde_json::from_slice(payload)?;
        Self::from_envelope(envelope)
    }

    /// Parse an already-decoded JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`ShadowError`] when the value is not a valid envelope.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ShadowError> {
        let envelope: Envelope = serde_json::from_value(value)?;
        Self::from_envelope(envelope)
    }

    fn from_envelope(envelope: Envelope) -> Result<Self, ShadowError> {
        match (envelope.state.reported, envelope.state.desired) {
            (Some(reported), _) => Ok(Self::Reported(reported)),
            (None, Some(desired)) => Ok(Self::Desired(desired)),
            (None, None) => Err(ShadowError::MissingState),
        }
    }

    #[must_use]
    pub fn action(&self) -> ShadowAction {
        match self {
            Self::Desired(_) => ShadowAction::Desired,
            Self::Reported(_) => ShadowAction::Reported,
        }
    }

    #[must_use]
    pub fn state(&self) -> ShadowState {
        match self {
            Self::Desired(state) | Self::Reported(state) => *state,
        }
    }

    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        self.state().device_id
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.state().is_on
    }

    /// The reported event a device would emit after applying this one.
    #[must_use]
    pub fn echo_reported(&self) -> Self {
        Self::Reported(self.state())
    }

    /// Re-encode into the wire envelope.
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        let state = match self {
            Self::Desired(s) => EnvelopeState {
                desired: Some(*s),
                ..EnvelopeState::default()
            },
            Self::Reported(s) => EnvelopeState {
                reported: Some(*s),
                ..EnvelopeState::default()
            },
        };
        serde_json::json!({ "state": state })
    }

    /// Re-encode into wire bytes.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.to_value().to_string().into_bytes()
    }
}
