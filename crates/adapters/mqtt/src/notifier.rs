//! [`Notifier`] fanning shadow notifications out on an MQTT topic.

use std::time::Duration;

use rumqttc::AsyncClient;

use gardenhub_app::ports::Notifier;
use gardenhub_domain::error::GardenHubError;
use gardenhub_domain::notification::Notification;

use crate::config::MqttConfig;
use crate::error::MqttError;
use crate::transport::publish_bounded;

/// Publishes `{"attributes": {...}, "message": "..."}` for every shadow event.
#[derive(Clone)]
pub struct MqttNotifier {
    client: AsyncClient,
    topic: String,
    publish_timeout: Duration,
}

impl MqttNotifier {
    #[must_use]
    pub fn new(client: AsyncClient, config: &MqttConfig) -> Self {
        Self {
            client,
            topic: config.notify_topic.clone(),
            publish_timeout: config.publish_timeout(),
        }
    }
}

/// Encode the message subscribers receive.
///
/// # Errors
///
/// Returns [`MqttError::Encode`] if serialization fails.
pub fn encode(notification: &Notification) -> Result<Vec<u8>, MqttError> {
    Ok(serde_json::to_vec(&notification.to_message())?)
}

impl Notifier for MqttNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), GardenHubError> {
        let payload = encode(&notification)?;
        publish_bounded(&self.client, &self.topic, payload, self.publish_timeout).await?;
        tracing::debug!(topic = %self.topic, "shadow notification published");
        Ok(())
    }
}
