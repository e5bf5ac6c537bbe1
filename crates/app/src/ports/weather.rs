//! Weather port — current conditions at the garden's location.

use std::future::Future;
use std::sync::Arc;

use gardenhub_domain::error::GardenHubError;

/// Source of the current relative humidity.
pub trait WeatherProvider {
    /// Current humidity in percent.
    ///
    /// Failures should be reported as [`GardenHubError::Upstream`]; callers
    /// decide whether to tolerate them.
    fn current_humidity(&self) -> impl Future<Output = Result<u8, GardenHubError>> + Send;
}

impl<T: WeatherProvider + Send + Sync> WeatherProvider for Arc<T> {
    fn current_humidity(&self) -> impl Future<Output = Result<u8, GardenHubError>> + Send {
        (**self).current_humidity()
    }
}
