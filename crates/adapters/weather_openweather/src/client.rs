//! [`WeatherProvider`] backed by the OpenWeather current-weather API.

use serde::Deserialize;

use gardenhub_app::ports::WeatherProvider;
use gardenhub_domain::error::GardenHubError;

use crate::config::OpenWeatherConfig;
use crate::error::WeatherError;

#[derive(Deserialize)]
struct CurrentWeather {
    main: Main,
}

#[derive(Deserialize)]
struct Main {
    humidity: u8,
}

/// Read `main.humidity` out of a current-weather document.
///
/// # Errors
///
/// Returns [`WeatherError::Decode`] when the field is missing or not a
/// percentage.
pub fn parse_humidity(body: &[u8]) -> Result<u8, WeatherError> {
    let current: CurrentWeather = serde_json::from_slice(body)?;
    Ok(current.main.humidity)
}

/// HTTP client asking OpenWeather for the garden's current humidity.
pub struct OpenWeatherClient {
    client: reqwest::Client,
    config: OpenWeatherConfig,
}

impl OpenWeatherClient {
    /// Build a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherError::Http`] if the TLS backend cannot be set up.
    pub fn new(config: OpenWeatherConfig) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client, config })
    }

    /// The request sent for every lookup.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherError::Http`] if the endpoint is not a valid URL.
    pub fn request(&self) -> Result<reqwest::Request, WeatherError> {
        let request = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("lat", self.config.lat.as_str()),
                ("lon", self.config.lon.as_str()),
                ("appid", self.config.appid.as_str()),
            ])
            .build()?;
        Ok(request)
    }

    async fn fetch(&self) -> Result<u8, WeatherError> {
        let response = self.client.execute(self.request()?).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status));
        }
        let body = response.bytes().await?;
        parse_humidity(&body)
    }
}

impl WeatherProvider for OpenWeatherClient {
    async fn current_humidity(&self) -> Result<u8, GardenHubError> {
        let humidity = self.fetch().await?;
        tracing::debug!(humidity, "current humidity fetched");
        Ok(humidity)
    }
}
