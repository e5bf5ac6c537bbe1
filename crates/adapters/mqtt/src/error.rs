//! MQTT adapter error types.

use std::time::Duration;

use gardenhub_domain::error::GardenHubError;
use gardenhub_domain::shadow::ShadowError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client returned an error.
    #[error("MQTT client error")]
    Client(#[from] rumqttc::ClientError),

    /// The client did not accept the message in time.
    #[error("MQTT publish timed out after {0:?}")]
    PublishTimeout(Duration),

    /// An incoming payload is not a shadow envelope.
    #[error("failed to parse MQTT payload")]
    PayloadParse(#[from] ShadowError),

    /// An outgoing payload could not be encoded.
    #[error("failed to encode MQTT payload")]
    Encode(#[from] serde_json::Error),
}

impl From<MqttError> for GardenHubError {
    fn from(err: MqttError) -> Self {
        Self::transport(err)
    }
}
