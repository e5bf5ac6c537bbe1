//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `gardenhub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use gardenhub_adapter_mqtt::MqttConfig;
use gardenhub_adapter_weather_openweather::OpenWeatherConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Broker connection and shadow topics.
    pub mqtt: MqttConfig,
    /// Current-weather lookup used by weather fences.
    pub weather: OpenWeatherConfig,
    /// Command dispatch tuning.
    pub orders: OrdersConfig,
    /// Simulated hardware acknowledgements.
    pub simulation: SimulationConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OrdersConfig {
    /// Registry re-read interval while waiting for a confirmation.
    pub poll_interval_secs: u64,
}

/// Activation bridge toggle. Keep disabled in front of real hardware.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub enabled: bool,
    /// Delay before a desired state is echoed back as reported.
    pub settle_delay_secs: u64,
}

impl Config {
    /// Load configuration from `gardenhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// result fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("gardenhub.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Apply overrides read through `var`. Later keys win over earlier ones.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("GARDENHUB_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("GARDENHUB_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("GARDENHUB_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = var("GARDENHUB_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("GARDENHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }

        if let Some(val) = var("GARDENHUB_MQTT_HOST") {
            self.mqtt.broker_host = val;
        }
        if let Some(port) = var("GARDENHUB_MQTT_PORT").and_then(|val| val.parse().ok()) {
            self.mqtt.broker_port = port;
        }
        if let Some(val) = var("GARDENHUB_MQTT_USERNAME") {
            self.mqtt.username = Some(val);
        }
        if let Some(val) = var("GARDENHUB_MQTT_PASSWORD") {
            self.mqtt.password = Some(val);
        }
        if let Some(val) = var("IOT_DESIRED_TOPIC") {
            self.mqtt.desired_topic = val;
        }
        if let Some(val) = var("IOT_REPORTED_TOPIC") {
            self.mqtt.reported_topic = val;
        }

        if let Some(val) = var("OW_ENDPOINT") {
            self.weather.endpoint = val;
        }
        if let Some(val) = var("OW_APPID") {
            self.weather.appid = val;
        }
        if let Some(val) = var("OW_LAT") {
            self.weather.lat = val;
        }
        if let Some(val) = var("OW_LON") {
            self.weather.lon = val;
        }

        if let Some(enabled) = var("GARDENHUB_SIMULATION").and_then(|val| val.parse().ok()) {
            self.simulation.enabled = enabled;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.orders.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "orders.poll_interval_secs must be non-zero".to_string(),
            ));
        }
        if self.mqtt.desired_topic == self.mqtt.reported_topic {
            return Err(ConfigError::Validation(
                "desired and reported topics must differ".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl OrdersConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl SimulationConfig {
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:gardenhub.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "gardenhubd=info,gardenhub=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 2,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            settle_delay_secs: 3,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
