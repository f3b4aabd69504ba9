use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    model::{ForecastBundle, LocationQuery, WeatherSnapshot},
    provider::WeatherProvider,
};

/// Builds a [`WeatherSnapshot`] for a location, absorbing every provider failure.
#[derive(Debug, Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Geocodes `query`, then fetches current conditions and the forecast.
    ///
    /// Returns `None` when the location cannot be resolved (no further calls
    /// are made) or when current conditions are unavailable. A failed forecast
    /// only leaves the forecast fields neutral.
    pub async fn lookup(&self, query: &LocationQuery) -> Option<WeatherSnapshot> {
        let coords = match self.provider.geocode(query).await {
            Ok(coords) => coords,
            Err(e) => {
                if e.is_not_found() {
                    info!(city = %query.city, "location not found");
                } else {
                    warn!(city = %query.city, error = %e, "geocoding failed");
                }
                return None;
            }
        };

        let (current, forecast) =
            tokio::join!(self.provider.current(coords), self.provider.forecast(coords));

        let mut snapshot = match current {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "current conditions unavailable");
                return None;
            }
        };

        let forecast = forecast.unwrap_or_else(|e| {
            warn!(error = %e, "forecast unavailable, rendering without it");
            ForecastBundle::default()
        });

        snapshot.merge_forecast(forecast);
        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::model::{Coordinates, HourlyPoint};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct FakeProvider {
        geocode_ok: bool,
        current_ok: bool,
        forecast_ok: bool,
        calls: AtomicUsize,
        current_calls: AtomicUsize,
        forecast_calls: AtomicUsize,
    }

    impl FakeProvider {
        fn healthy() -> Self {
            Self {
                geocode_ok: true,
                current_ok: true,
                forecast_ok: true,
                ..Default::default()
            }
        }
    }

    fn unavailable(endpoint: &'static str) -> FetchError {
        FetchError::Unavailable {
            endpoint,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: String::new(),
        }
    }

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            name: "London".into(),
            main: "Clear".into(),
            description: "clear sky".into(),
            icon: "01d".into(),
            temperature_c: 20,
            feels_like_c: 19,
            humidity_pct: 40,
            pressure_hpa: 1015,
            wind_speed_mps: 3,
            visibility_m: 10000,
            uv_index: 0.0,
            hourly: Vec::new(),
            daily: Vec::new(),
            alerts: Vec::new(),
            timezone: "GB".into(),
            utc_offset_secs: 3600,
            sunrise: DateTime::<Utc>::default(),
            sunset: DateTime::<Utc>::default(),
            captured_at: Utc::now(),
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn geocode(&self, _query: &LocationQuery) -> Result<Coordinates, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.geocode_ok {
                Coordinates::new(51.5, -0.12).ok_or(FetchError::NotFound)
            } else {
                Err(FetchError::NotFound)
            }
        }

        async fn current(&self, _coords: Coordinates) -> Result<WeatherSnapshot, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.current_calls.fetch_add(1, Ordering::SeqCst);
            if self.current_ok { Ok(snapshot()) } else { Err(unavailable("current weather")) }
        }

        async fn forecast(&self, _coords: Coordinates) -> Result<ForecastBundle, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.forecast_calls.fetch_add(1, Ordering::SeqCst);
            if !self.forecast_ok {
                return Err(unavailable("forecast"));
            }
            Ok(ForecastBundle {
                hourly: vec![HourlyPoint {
                    time: Utc::now(),
                    temp: 21.0,
                    icon: "01d".into(),
                    description: "clear sky".into(),
                    precipitation: 0.0,
                }],
                daily: Vec::new(),
                uv_index: 5.5,
                alerts: Vec::new(),
            })
        }
    }

    #[tokio::test]
    async fn geocode_failure_short_circuits() {
        let provider = Arc::new(FakeProvider::default());
        let service = WeatherService::new(provider.clone());

        let result = service.lookup(&LocationQuery::new("Atlantis")).await;

        assert!(result.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.current_calls.load(Ordering::SeqCst), 0);
        assert_eq!(provider.forecast_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn merges_forecast_into_snapshot() {
        let provider = Arc::new(FakeProvider::healthy());
        let service = WeatherService::new(provider.clone());

        let snap = service.lookup(&LocationQuery::new("London")).await.expect("snapshot");

        assert_eq!(snap.name, "London");
        assert_eq!(snap.uv_index, 5.5);
        assert_eq!(snap.hourly.len(), 1);
        assert!(snap.alerts.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn forecast_failure_keeps_current_conditions() {
        let provider = Arc::new(FakeProvider {
            forecast_ok: false,
            ..FakeProvider::healthy()
        });
        let service = WeatherService::new(provider);

        let snap = service.lookup(&LocationQuery::new("London")).await.expect("snapshot");

        assert_eq!(snap.uv_index, 0.0);
        assert!(snap.hourly.is_empty());
        assert!(snap.daily.is_empty());
    }

    #[tokio::test]
    async fn current_failure_yields_no_snapshot() {
        let provider = Arc::new(FakeProvider {
            current_ok: false,
            ..FakeProvider::healthy()
        });
        let service = WeatherService::new(provider);

        assert!(service.lookup(&LocationQuery::new("London")).await.is_none());
    }
}
