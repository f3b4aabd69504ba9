//! Core library for `weatherdash`.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client behind the `WeatherProvider` seam
//! - Forecast aggregation into hourly and daily views
//! - Shared domain models (queries, snapshots, forecast points)
//!
//! It is used by the `weatherdash` binary, which serves the web form and the CLI.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod service;

pub use config::Config;
pub use error::FetchError;
pub use model::{
    Coordinates, DailyPoint, ForecastBundle, HourlyPoint, LocationQuery, WeatherSnapshot,
};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
pub use service::WeatherService;
