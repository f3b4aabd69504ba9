use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Free-text location as typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationQuery {
    pub city: String,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl LocationQuery {
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: None,
            country: None,
        }
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Provider query string, `city[,state][,country]`.
    ///
    /// Blank parts are skipped; returns `None` when the city itself is blank.
    pub fn to_query_string(&self) -> Option<String> {
        let city = self.city.trim();
        if city.is_empty() {
            return None;
        }

        let mut q = city.to_string();
        for part in [&self.state, &self.country].into_iter().flatten() {
            let part = part.trim();
            if !part.is_empty() {
                q.push(',');
                q.push_str(part);
            }
        }
        Some(q)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Returns `None` outside standard geographic bounds.
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        valid.then_some(Self { lat, lon })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    pub time: DateTime<Utc>,
    pub temp: f64,
    pub icon: String,
    pub description: String,
    /// Probability of precipitation, 0-100.
    pub precipitation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    /// Local calendar date this point summarises.
    pub date: NaiveDate,
    /// Timestamp of the representative sample (closest to local noon).
    pub time: DateTime<Utc>,
    pub temp_max: f64,
    pub temp_min: f64,
    pub icon: String,
    pub description: String,
    pub humidity: u8,
    pub wind_speed: f64,
    pub precipitation: f64,
}

/// What the forecast aggregator contributes to a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastBundle {
    pub hourly: Vec<HourlyPoint>,
    pub daily: Vec<DailyPoint>,
    pub uv_index: f64,
    pub alerts: Vec<String>,
}

/// Everything rendered for one location, built once per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub name: String,
    pub main: String,
    pub description: String,
    pub icon: String,
    pub temperature_c: i32,
    pub feels_like_c: i32,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    pub wind_speed_mps: i32,
    pub visibility_m: u32,
    pub uv_index: f64,
    pub hourly: Vec<HourlyPoint>,
    pub daily: Vec<DailyPoint>,
    /// Always empty: the free provider tier carries no alerts.
    pub alerts: Vec<String>,
    /// Country code reported by the provider, used as a timezone label.
    pub timezone: String,
    pub utc_offset_secs: i32,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub captured_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    pub fn merge_forecast(&mut self, forecast: ForecastBundle) {
        self.hourly = forecast.hourly;
        self.daily = forecast.daily;
        self.uv_index = forecast.uv_index;
        self.alerts = forecast.alerts;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_string_joins_present_parts() {
        let q = LocationQuery::new("London").with_state("10").with_country("GB");
        assert_eq!(q.to_query_string().as_deref(), Some("London,10,GB"));
    }

    #[test]
    fn query_string_skips_blank_parts() {
        let q = LocationQuery::new(" Paris ").with_state("  ").with_country("FR");
        assert_eq!(q.to_query_string().as_deref(), Some("Paris,FR"));
    }

    #[test]
    fn blank_city_has_no_query() {
        assert_eq!(LocationQuery::new("   ").to_query_string(), None);
    }

    #[test]
    fn coordinates_reject_out_of_bounds() {
        assert!(Coordinates::new(51.5, -0.12).is_some());
        assert!(Coordinates::new(90.5, 0.0).is_none());
        assert!(Coordinates::new(0.0, -181.0).is_none());
        assert!(Coordinates::new(f64::NAN, 0.0).is_none());
    }
}
