//! Weather adapter error types.

use gardenhub_domain::error::GardenHubError;

/// Errors from the weather lookup.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// The request could not be sent or timed out.
    #[error("weather request failed")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("weather service answered {0}")]
    Status(reqwest::StatusCode),

    /// The body is not a current-weather document.
    #[error("unexpected weather payload")]
    Decode(#[from] serde_json::Error),
}

impl From<WeatherError> for GardenHubError {
    fn from(err: WeatherError) -> Self {
        Self::upstream(err)
    }
}
