//! MQTT adapter configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the MQTT shadow transport, notifier and listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// MQTT broker hostname or IP address.
    pub broker_host: String,
    /// MQTT broker port.
    pub broker_port: u16,
    /// MQTT client identifier.
    pub client_id: String,
    /// Optional broker credentials.
    pub username: Option<String>,
    pub password: Option<String>,
    /// Topic desired shadow events are published to.
    pub desired_topic: String,
    /// Topic devices publish their reported state to.
    pub reported_topic: String,
    /// Topic shadow notifications are fanned out on.
    pub notify_topic: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    /// Upper bound for handing a message to the client, in seconds.
    pub publish_timeout_secs: u64,
    /// Pause after a connection error before polling again, in seconds.
    pub reconnect_delay_secs: u64,
}

impl MqttConfig {
    #[must_use]
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_secs)
    }

    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            client_id: "gardenhub".to_string(),
            username: None,
            password: None,
            desired_topic: "device/desired".to_string(),
            reported_topic: "device/reported".to_string(),
            notify_topic: "device/notifications".to_string(),
            keep_alive_secs: 30,
            publish_timeout_secs: 5,
            reconnect_delay_secs: 5,
        }
    }
}
