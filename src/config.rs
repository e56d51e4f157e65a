use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::eyre::{OptionExt, Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::model::Privacy;
use crate::retry::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// spotify-backup `playlists.json` export.
    pub source_export: String,
    /// YouTube Music OAuth token file.
    pub credentials: String,
    /// CSV file collecting fallbacks, duplicates and failures of every run.
    pub session_log: String,
    pub track_sleep_ms: u64,
    pub search_strategy: u8,
    pub reverse_playlist: bool,
    pub privacy: Privacy,
    pub playlist_settle_ms: u64,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub initial_delay_secs: u64,
    pub factor: f32,
    pub max_delay_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_export: "playlists.json".to_string(),
            credentials: "oauth.json".to_string(),
            session_log: "unmatched_tracks.csv".to_string(),
            track_sleep_ms: 100,
            search_strategy: 0,
            reverse_playlist: true,
            privacy: Privacy::Private,
            playlist_settle_ms: 1000,
            retry: RetryConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_retries: policy.max_retries,
            initial_delay_secs: policy.initial_delay.as_secs(),
            factor: policy.factor,
            max_delay_secs: policy.max_delay.as_secs(),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_secs(config.initial_delay_secs),
            factor: config.factor,
            max_delay: Duration::from_secs(config.max_delay_secs),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("music-sync").join("config.toml"))
    }

    /// Load the default config file, falling back to built-in defaults when
    /// it does not exist.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write the defaults to the config path unless a file is already there.
    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path().ok_or_eyre("No config directory on this platform")?;
        Self::default().write_if_missing(&path)?;
        Ok(path)
    }

    fn write_if_missing(&self, path: &Path) -> Result<()> {
        if path.exists() {
            log::info!("Config file already exists: {}", path.display());
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self).wrap_err("Failed to serialize config")?;
        std::fs::write(path, contents)
            .wrap_err_with(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Expand ~ to home directory
    fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }
        PathBuf::from(path)
    }

    pub fn source_export_path(&self) -> PathBuf {
        Self::expand_path(&self.source_export)
    }

    pub fn credentials_path(&self) -> PathBuf {
        Self::expand_path(&self.credentials)
    }

    pub fn session_log_path(&self) -> PathBuf {
        Self::expand_path(&self.session_log)
    }

    pub fn track_sleep(&self) -> Duration {
        Duration::from_millis(self.track_sleep_ms)
    }

    pub fn playlist_settle(&self) -> Duration {
        Duration::from_millis(self.playlist_settle_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from(&self.retry)
    }
}
