//! # gardenhub-adapter-mqtt
//!
//! MQTT adapter — carries device shadow events between gardenhub and the
//! controller boards.
//!
//! ## Responsibilities
//! - Connect to an MQTT broker ([`connect`])
//! - Publish desired/reported shadow events ([`MqttShadowTransport`])
//! - Fan shadow notifications out to subscribers ([`MqttNotifier`])
//! - Subscribe to shadow topics and hand parsed events to the application
//!   ([`ShadowListener`])
//!
//! ## Dependency rule
//! Same as other adapters: depends on `gardenhub-app` and `gardenhub-domain`.

pub mod config;
pub mod error;
pub mod listener;
pub mod notifier;
pub mod transport;

pub use config::MqttConfig;
pub use error::MqttError;
pub use listener::ShadowListener;
pub use notifier::MqttNotifier;
pub use transport::MqttShadowTransport;

use std::time::Duration;

use rumqttc::{AsyncClient, EventLoop, MqttOptions};

/// Capacity of the client's outgoing request queue.
const REQUEST_CAPACITY: usize = 16;

/// Build a client and its event loop from `config`.
///
/// Nothing goes over the wire until the event loop is polled, which
/// [`ShadowListener::run`] does.
#[must_use]
pub fn connect(config: &MqttConfig) -> (AsyncClient, EventLoop) {
    let mut options = MqttOptions::new(&config.client_id, &config.broker_host, config.broker_port);
    options.set_keep_alive(Duration::from_secs(config.keep_alive_secs.into()));
    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        options.set_credentials(username, password);
    }
    AsyncClient::new(options, REQUEST_CAPACITY)
}
