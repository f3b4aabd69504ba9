use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::Password;
use tracing::info;
use weatherdash_core::{
    Config, LocationQuery, WeatherService, WeatherSnapshot, provider_from_config,
};

use crate::{templates::format_timestamp, web};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Current weather and forecast for a city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Show weather for a city.
    Show {
        /// City name, e.g. "London".
        city: String,

        /// Optional state code.
        #[arg(long)]
        state: Option<String>,

        /// Optional ISO 3166 country code.
        #[arg(long)]
        country: Option<String>,

        /// Print the snapshot as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Serve the web form.
    Serve {
        /// Listen address; defaults to the configured one.
        #[arg(long)]
        addr: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                city,
                state,
                country,
                json,
            } => {
                let service = service_from_config(&Config::load()?)?;
                let query = LocationQuery {
                    city,
                    state,
                    country,
                };

                let Some(snapshot) = service.lookup(&query).await else {
                    bail!("Location '{}' not found or weather unavailable", query.city);
                };

                if json {
                    let out = serde_json::to_string_pretty(&snapshot)
                        .context("Failed to serialize snapshot")?;
                    println!("{out}");
                } else {
                    print!("{}", summary(&snapshot));
                }
                Ok(())
            }
            Command::Serve { addr } => {
                let config = Config::load()?;
                let service = service_from_config(&config)?;
                let addr = addr.unwrap_or(config.listen_addr);

                let listener = tokio::net::TcpListener::bind(&addr)
                    .await
                    .with_context(|| format!("Failed to bind {addr}"))?;
                info!("weatherdash listening on http://{addr}");

                axum::serve(listener, web::app(service)).await.context("Server error")?;
                Ok(())
            }
        }
    }
}

fn service_from_config(config: &Config) -> anyhow::Result<WeatherService> {
    let provider = provider_from_config(config)?;
    Ok(WeatherService::new(Arc::from(provider)))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key);
    config.require_api_key()?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

/// Plain-text rendering for the terminal.
fn summary(s: &WeatherSnapshot) -> String {
    let offset = s.utc_offset_secs;
    let mut out = format!(
        "{name} ({tz})\n\
         {main}: {desc}\n\
         Temperature: {temp}°C (feels like {feels}°C)\n\
         Humidity: {hum}%  Pressure: {pres} hPa  Wind: {wind} m/s\n\
         Visibility: {vis} m  UV index: {uv}\n\
         Sunrise: {rise}  Sunset: {set}\n",
        name = s.name,
        tz = s.timezone,
        main = s.main,
        desc = s.description,
        temp = s.temperature_c,
        feels = s.feels_like_c,
        hum = s.humidity_pct,
        pres = s.pressure_hpa,
        wind = s.wind_speed_mps,
        vis = s.visibility_m,
        uv = s.uv_index,
        rise = format_timestamp(s.sunrise, offset, "%H:%M"),
        set = format_timestamp(s.sunset, offset, "%H:%M"),
    );

    if !s.hourly.is_empty() {
        out.push_str("\nNext 24 hours:\n");
        for h in &s.hourly {
            out.push_str(&format!(
                "  {}  {:>5.1}°C  {:>3.0}%  {}\n",
                format_timestamp(h.time, offset, "%H:%M"),
                h.temp,
                h.precipitation,
                h.description,
            ));
        }
    }

    if !s.daily.is_empty() {
        out.push_str("\nDaily:\n");
        for d in &s.daily {
            out.push_str(&format!(
                "  {}  {:>5.1} / {:>5.1}°C  {:>3.0}%  {}\n",
                format_timestamp(d.time, offset, "%a, %b %d"),
                d.temp_max,
                d.temp_min,
                d.precipitation,
                d.description,
            ));
        }
    }

    out.push_str(&format!(
        "\nUpdated {}\n",
        format_timestamp(s.captured_at, offset, "%Y-%m-%d %H:%M")
    ));
    out
}
