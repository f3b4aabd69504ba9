use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{
    aggregate::{self, ForecastSample},
    config::DEFAULT_BASE_URL,
    error::FetchError,
    model::{Coordinates, ForecastBundle, LocationQuery, WeatherSnapshot},
};

use super::WeatherProvider;

const GEOCODE_PATH: &str = "/geo/1.0/direct";
const CURRENT_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";
const UV_PATH: &str = "/data/2.5/uvi";

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl std::fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    async fn get(
        &self,
        endpoint: &'static str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<String, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(endpoint, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Unavailable {
                endpoint,
                status,
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }

    async fn fetch_uv_index(&self, coords: Coordinates) -> Result<f64, FetchError> {
        // The free tier ignores any time parameter and answers with the day's maximum.
        let body = self.get("uv index", UV_PATH, &coord_params(coords, false)).await?;
        let parsed: OwUvResponse = parse("uv index", &body)?;
        Ok(parsed.value)
    }
}

fn coord_params(coords: Coordinates, metric: bool) -> Vec<(&'static str, String)> {
    let mut params = vec![("lat", coords.lat.to_string()), ("lon", coords.lon.to_string())];
    if metric {
        params.push(("units", "metric".to_string()));
    }
    params
}

fn parse<T: DeserializeOwned>(endpoint: &'static str, body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|source| FetchError::Malformed { endpoint, source })
}

#[derive(Debug, Deserialize)]
struct OwGeoMatch {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwCondition {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwSys {
    country: Option<String>,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwCurrentResponse {
    name: String,
    weather: Vec<OwCondition>,
    main: OwMain,
    wind: OwWind,
    visibility: u32,
    sys: OwSys,
    timezone: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwCity {
    timezone: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwCondition>,
    wind: OwWind,
    pop: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwUvResponse {
    value: f64,
}

impl OwForecastEntry {
    fn into_sample(self) -> ForecastSample {
        let condition = self.weather.into_iter().next().unwrap_or_default();
        ForecastSample {
            time: unix_to_utc(self.dt).unwrap_or_default(),
            temp: self.main.temp,
            temp_min: self.main.temp_min.unwrap_or(self.main.temp),
            temp_max: self.main.temp_max.unwrap_or(self.main.temp),
            humidity: self.main.humidity,
            wind_speed: self.wind.speed,
            pop: self.pop,
            icon: condition.icon,
            description: condition.description,
        }
    }
}

impl OwCurrentResponse {
    fn into_snapshot(self, captured_at: DateTime<Utc>) -> WeatherSnapshot {
        let condition = self.weather.into_iter().next().unwrap_or_default();
        let timezone = self
            .sys
            .country
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "UTC".to_string());

        WeatherSnapshot {
            name: self.name,
            main: condition.main,
            description: condition.description,
            icon: condition.icon,
            temperature_c: self.main.temp as i32,
            feels_like_c: self.main.feels_like as i32,
            humidity_pct: self.main.humidity,
            pressure_hpa: self.main.pressure,
            wind_speed_mps: self.wind.speed as i32,
            visibility_m: self.visibility,
            uv_index: 0.0,
            hourly: Vec::new(),
            daily: Vec::new(),
            alerts: Vec::new(),
            timezone,
            utc_offset_secs: self.timezone,
            sunrise: unix_to_utc(self.sys.sunrise).unwrap_or_default(),
            sunset: unix_to_utc(self.sys.sunset).unwrap_or_default(),
            captured_at,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn geocode(&self, query: &LocationQuery) -> Result<Coordinates, FetchError> {
        let Some(q) = query.to_query_string() else {
            return Err(FetchError::NotFound);
        };

        let params = [("q", q), ("limit", "1".to_string())];
        let body = match self.get("geocoding", GEOCODE_PATH, &params).await {
            Ok(body) => body,
            Err(e) => {
                debug!(error = %e, "geocoding failed, treating as not found");
                return Err(FetchError::NotFound);
            }
        };

        let matches: Vec<OwGeoMatch> = match parse("geocoding", &body) {
            Ok(matches) => matches,
            Err(e) => {
                debug!(error = %e, "geocoding response unusable, treating as not found");
                return Err(FetchError::NotFound);
            }
        };

        matches
            .first()
            .and_then(|m| Coordinates::new(m.lat, m.lon))
            .ok_or(FetchError::NotFound)
    }

    async fn current(&self, coords: Coordinates) -> Result<WeatherSnapshot, FetchError> {
        let body = self.get("current weather", CURRENT_PATH, &coord_params(coords, true)).await?;
        let parsed: OwCurrentResponse = parse("current weather", &body)?;

        Ok(parsed.into_snapshot(Utc::now()))
    }

    async fn forecast(&self, coords: Coordinates) -> Result<ForecastBundle, FetchError> {
        let body = self.get("forecast", FORECAST_PATH, &coord_params(coords, true)).await?;
        let parsed: OwForecastResponse = parse("forecast", &body)?;

        let offset = aggregate::offset_from_secs(parsed.city.timezone);
        let samples: Vec<ForecastSample> =
            parsed.list.into_iter().map(OwForecastEntry::into_sample).collect();

        let uv_index = match self.fetch_uv_index(coords).await {
            Ok(uv) => uv,
            Err(e) => {
                warn!(error = %e, "UV index unavailable, reporting 0");
                0.0
            }
        };

        Ok(ForecastBundle {
            hourly: aggregate::hourly_points(&samples),
            daily: aggregate::daily_points(&samples, offset),
            uv_index,
            alerts: Vec::new(),
        })
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
