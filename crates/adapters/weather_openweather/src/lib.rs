//! # gardenhub-adapter-weather-openweather
//!
//! Weather adapter — reads the current humidity from the
//! [OpenWeather](https://openweathermap.org/current) current-weather API.
//!
//! ## Dependency rule
//! Same as other adapters: depends on `gardenhub-app` and `gardenhub-domain`.

pub mod client;
pub mod config;
pub mod error;

pub use client::OpenWeatherClient;
pub use config::OpenWeatherConfig;
pub use error::WeatherError;
