use crate::{
    Config,
    error::FetchError,
    model::{Coordinates, ForecastBundle, LocationQuery, WeatherSnapshot},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// The three lookups a snapshot is built from.
///
/// Each call reports a [`FetchError`] rather than panicking or retrying;
/// deciding what a failure means for the page is left to the caller.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Resolves free text to the first matching coordinates.
    async fn geocode(&self, query: &LocationQuery) -> Result<Coordinates, FetchError>;

    /// Current conditions, with the forecast fields left neutral.
    async fn current(&self, coords: Coordinates) -> Result<WeatherSnapshot, FetchError>;

    /// Hourly and daily forecast plus the UV index.
    async fn forecast(&self, coords: Coordinates) -> Result<ForecastBundle, FetchError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.require_api_key()?;

    let provider = OpenWeatherProvider::with_base_url(api_key.to_owned(), &config.base_url);
    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        let provider = provider_from_config(&cfg);
        assert!(provider.is_ok());
    }
}
