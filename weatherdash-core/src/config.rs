use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:5000";

/// Environment variables checked for the API key, first match wins.
const API_KEY_VARS: &[&str] = &["OPENWEATHER_API_KEY", "API_KEY"];

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// listen_addr = "0.0.0.0:8080"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenWeather API key, passed to the provider at construction.
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            listen_addr: default_listen_addr(),
        }
    }
}

impl Config {
    /// Load config from disk (or defaults on first run), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let cfg = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_toml(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        Ok(cfg.with_env_overrides(|key| env::var(key).ok()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies overrides from `lookup`, normally `std::env::var`.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(key) = API_KEY_VARS.iter().find_map(|&var| non_empty(var)) {
            self.api_key = Some(key);
        }
        if let Some(url) = non_empty("WEATHERDASH_BASE_URL") {
            self.base_url = url;
        }
        if let Some(addr) = non_empty("WEATHERDASH_LISTEN_ADDR") {
            self.listen_addr = addr;
        }
        self
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherdash", "weatherdash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key().ok_or_else(|| {
            anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: run `weatherdash configure` or set the API_KEY environment variable."
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn require_api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.require_api_key().unwrap_err();

        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_api_key("   ".into());
        assert_eq!(cfg.api_key(), None);
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let cfg = Config::from_toml(r#"api_key = "KEY""#).expect("valid toml");

        assert_eq!(cfg.api_key(), Some("KEY"));
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.listen_addr, DEFAULT_LISTEN_ADDR);
    }

    #[test]
    fn env_overrides_file_values() {
        let cfg = Config::from_toml(
            r#"
            api_key = "FROM_FILE"
            listen_addr = "0.0.0.0:9000"
            "#,
        )
        .expect("valid toml")
        .with_env_overrides(env_of(&[
            ("API_KEY", "FROM_ENV"),
            ("WEATHERDASH_BASE_URL", "http://localhost:1234"),
        ]));

        assert_eq!(cfg.api_key(), Some("FROM_ENV"));
        assert_eq!(cfg.base_url, "http://localhost:1234");
        assert_eq!(cfg.listen_addr, "0.0.0.0:9000");
    }

    #[test]
    fn openweather_specific_var_wins() {
        let cfg = Config::default().with_env_overrides(env_of(&[
            ("API_KEY", "GENERIC"),
            ("OPENWEATHER_API_KEY", "SPECIFIC"),
        ]));
        assert_eq!(cfg.api_key(), Some("SPECIFIC"));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEEP".into());
        let cfg = cfg.with_env_overrides(env_of(&[("API_KEY", "")]));
        assert_eq!(cfg.api_key(), Some("KEEP"));
    }

    #[test]
    fn env_values_are_trimmed() {
        let cfg = Config::default().with_env_overrides(env_of(&[
            ("API_KEY", "  KEY_WITH_NEWLINE\n"),
            ("WEATHERDASH_LISTEN_ADDR", " 0.0.0.0:8080 "),
        ]));
        assert_eq!(cfg.api_key(), Some("KEY_WITH_NEWLINE"));
        assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
    }

    #[test]
    fn toml_roundtrip_keeps_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        let text = toml::to_string_pretty(&cfg).expect("serializable");
        let back = Config::from_toml(&text).expect("parsable");
        assert_eq!(back.api_key(), Some("KEY"));
    }
}
