//! OpenWeather adapter configuration.

use std::time::Duration;

use serde::Deserialize;

/// Where and how to ask for the current weather.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenWeatherConfig {
    /// Current-weather endpoint.
    pub endpoint: String,
    /// API key.
    pub appid: String,
    /// Garden latitude, passed through verbatim.
    pub lat: String,
    /// Garden longitude, passed through verbatim.
    pub lon: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl OpenWeatherConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for OpenWeatherConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            appid: String::new(),
            lat: String::new(),
            lon: String::new(),
            timeout_secs: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_public_endpoint_and_short_timeout() {
        let config = OpenWeatherConfig::default();
        assert!(config.endpoint.starts_with("https://api.openweathermap.org/"));
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn should_deserialize_from_toml() {
        let config: OpenWeatherConfig = toml::from_str(
            r#"
            appid = "abc123"
            lat = "48.85"
            lon = "2.35"
            timeout_secs = 2
        "#,
        )
        .unwrap();
        assert_eq!(config.appid, "abc123");
        assert_eq!(config.lat, "48.85");
        assert_eq!(config.lon, "2.35");
        assert_eq!(config.timeout(), Duration::from_secs(2));
    }
}
