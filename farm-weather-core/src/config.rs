use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::{
    client::{DEFAULT_API_BASE_URL, HistoryPage},
    poll::DEFAULT_POLL_INTERVAL,
    snapshot::{GeoLocation, SnapshotDefaults},
};

/// Environment variable that overrides the configured backend URL.
pub const API_URL_ENV: &str = "FARM_WEATHER_API_URL";

/// Location shown when a reading carries no usable location of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend base URL, e.g. "http://localhost:8000/api".
    pub api_base_url: Option<String>,

    /// Refresh interval of `watch`, in seconds.
    pub poll_interval_secs: Option<u64>,

    /// Number of history rows requested per page.
    pub history_limit: Option<u32>,

    /// Example TOML:
    /// [default_location]
    /// lat = 41.1579
    /// lon = -8.6291
    /// name = "Porto"
    pub default_location: Option<LocationConfig>,
}

impl Config {
    /// Backend URL: environment override, then the config file, then the built-in default.
    pub fn api_base_url(&self) -> String {
        self.resolve_api_base_url(std::env::var(API_URL_ENV).ok().as_deref())
    }

    fn resolve_api_base_url(&self, env_override: Option<&str>) -> String {
        env_override
            .filter(|url| !url.trim().is_empty())
            .or(self.api_base_url.as_deref())
            .unwrap_or(DEFAULT_API_BASE_URL)
            .to_string()
    }

    /// Store a new backend URL after checking that it parses.
    pub fn set_api_base_url(&mut self, url: &str) -> Result<()> {
        let parsed = reqwest::Url::parse(url).with_context(|| {
            format!("Invalid API URL '{url}'.\nHint: use a full URL such as {DEFAULT_API_BASE_URL}")
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!("Unsupported URL scheme '{}': expected http or https", parsed.scheme()));
        }

        self.api_base_url = Some(url.to_string());
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        match self.poll_interval_secs {
            Some(secs) if secs > 0 => Duration::from_secs(secs),
            _ => DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn history_page(&self) -> HistoryPage {
        self.history_limit
            .map(|limit| HistoryPage::new(limit, 0))
            .unwrap_or_default()
    }

    /// Fallback values handed to the normalizers.
    pub fn snapshot_defaults(&self) -> SnapshotDefaults {
        let mut defaults = SnapshotDefaults::default();

        if let Some(loc) = &self.default_location {
            defaults.location = GeoLocation { lat: loc.lat, lon: loc.lon, name: loc.name.clone() };
        }

        defaults
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "farm-weather", "farm-weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_falls_back_to_default() {
        let cfg = Config::default();
        assert_eq!(cfg.resolve_api_base_url(None), DEFAULT_API_BASE_URL);
    }

    #[test]
    fn env_override_wins_over_file() {
        let cfg = Config { api_base_url: Some("http://farm.local/api".into()), ..Config::default() };

        assert_eq!(cfg.resolve_api_base_url(None), "http://farm.local/api");
        assert_eq!(cfg.resolve_api_base_url(Some("http://other/api")), "http://other/api");
        assert_eq!(cfg.resolve_api_base_url(Some("  ")), "http://farm.local/api");
    }

    #[test]
    fn set_api_base_url_rejects_garbage() {
        let mut cfg = Config::default();

        let err = cfg.set_api_base_url("not a url").unwrap_err();
        assert!(err.to_string().contains("Invalid API URL"));

        let err = cfg.set_api_base_url("ftp://farm.local").unwrap_err();
        assert!(err.to_string().contains("Unsupported URL scheme"));

        cfg.set_api_base_url("https://farm.example/api").expect("valid url");
        assert_eq!(cfg.api_base_url.as_deref(), Some("https://farm.example/api"));
    }

    #[test]
    fn zero_poll_interval_uses_default() {
        let cfg = Config { poll_interval_secs: Some(0), ..Config::default() };
        assert_eq!(cfg.poll_interval(), DEFAULT_POLL_INTERVAL);

        let cfg = Config { poll_interval_secs: Some(60), ..Config::default() };
        assert_eq!(cfg.poll_interval(), Duration::from_secs(60));
    }

    #[test]
    fn history_limit_is_clamped() {
        let cfg = Config { history_limit: Some(1000), ..Config::default() };
        assert_eq!(cfg.history_page().limit(), HistoryPage::MAX_LIMIT);
        assert_eq!(Config::default().history_page(), HistoryPage::default());
    }

    #[test]
    fn default_location_overrides_snapshot_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [default_location]
            lat = 41.1579
            lon = -8.6291
            name = "Porto"
            "#,
        )
        .expect("valid toml");

        let defaults = cfg.snapshot_defaults();
        assert_eq!(defaults.location.name, "Porto");
        assert_eq!(defaults.sun, SnapshotDefaults::default().sun);
    }

    #[test]
    fn missing_file_is_empty_config() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cfg = Config::load_from(&dir.path().join("absent.toml")).expect("load");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config {
            api_base_url: Some("http://farm.local/api".into()),
            poll_interval_secs: Some(120),
            history_limit: None,
            default_location: None,
        };
        cfg.save_to(&path).expect("save");

        assert_eq!(Config::load_from(&path).expect("load"), cfg);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "poll_interval_secs = \"soon\"").expect("write");

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
