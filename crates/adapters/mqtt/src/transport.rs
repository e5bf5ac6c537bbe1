//! [`ShadowTransport`] publishing to the desired/reported topics.

use std::time::Duration;

use rumqttc::{AsyncClient, QoS};

use gardenhub_app::ports::ShadowTransport;
use gardenhub_domain::error::GardenHubError;
use gardenhub_domain::shadow::{ShadowAction, ShadowEvent};

use crate::config::MqttConfig;
use crate::error::MqttError;

/// Publishes shadow events at most once, bounded by the publish timeout.
#[derive(Clone)]
pub struct MqttShadowTransport {
    client: AsyncClient,
    desired_topic: String,
    reported_topic: String,
    publish_timeout: Duration,
}

impl MqttShadowTransport {
    #[must_use]
    pub fn new(client: AsyncClient, config: &MqttConfig) -> Self {
        Self {
            client,
            desired_topic: config.desired_topic.clone(),
            reported_topic: config.reported_topic.clone(),
            publish_timeout: config.publish_timeout(),
        }
    }

    /// Topic an event of `action` is published to.
    #[must_use]
    pub fn topic_for(&self, action: ShadowAction) -> &str {
        match action {
            ShadowAction::Desired => &self.desired_topic,
            ShadowAction::Reported => &self.reported_topic,
        }
    }
}

/// Hand `payload` to the client, giving up after `timeout`.
pub(crate) async fn publish_bounded(
    client: &AsyncClient,
    topic: &str,
    payload: Vec<u8>,
    timeout: Duration,
) -> Result<(), MqttError> {
    tokio::time::timeout(
        timeout,
        client.publish(topic, QoS::AtMostOnce, false, payload),
    )
    .await
    .map_err(|_| MqttError::PublishTimeout(timeout))??;
    Ok(())
}

impl ShadowTransport for MqttShadowTransport {
    async fn publish(&self, event: ShadowEvent) -> Result<(), GardenHubError> {
        let topic = self.topic_for(event.action());
        publish_bounded(&self.client, topic, event.to_vec(), self.publish_timeout).await?;
        tracing::debug!(topic, device_id = %event.device_id(), "shadow event published");
        Ok(())
    }
}
