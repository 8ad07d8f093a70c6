//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Team;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote API and retry behavior settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Season collection settings
    #[serde(default)]
    pub collector: CollectorConfig,

    /// Master dataset export settings
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(AppError::validation("api.base_url is empty"));
        }
        if self.api.user_agent.trim().is_empty() {
            return Err(AppError::validation("api.user_agent is empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(AppError::validation("api.timeout_secs must be > 0"));
        }
        if self.api.retries == 0 {
            return Err(AppError::validation("api.retries must be > 0"));
        }
        if self.collector.max_concurrent == 0 {
            return Err(AppError::validation("collector.max_concurrent must be > 0"));
        }
        if self.collector.teams.is_empty() {
            return Err(AppError::validation("No target teams defined"));
        }
        Ok(())
    }
}

/// Remote API client and retry behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base endpoint of the OpenF1 API
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Attempts per fetch before giving up
    #[serde(default = "defaults::retries")]
    pub retries: u32,

    /// Delay between attempts in milliseconds
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            retries: defaults::retries(),
            retry_delay_ms: defaults::retry_delay(),
        }
    }
}

/// Season collection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Season year to collect
    #[serde(default = "defaults::year")]
    pub year: i32,

    /// Root directory of the raw JSON cache
    #[serde(default = "defaults::cache_root")]
    pub cache_root: PathBuf,

    /// Maximum concurrent per-driver downloads within one session
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Teams whose drivers are collected
    #[serde(default = "defaults::teams")]
    pub teams: Vec<Team>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            year: defaults::year(),
            cache_root: defaults::cache_root(),
            max_concurrent: defaults::max_concurrent(),
            teams: defaults::teams(),
        }
    }
}

/// Master dataset export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory receiving the four master CSV files
    #[serde(default = "defaults::out_dir")]
    pub out_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            out_dir: defaults::out_dir(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    use crate::models::Team;

    // API defaults
    pub fn base_url() -> String {
        "https://api.openf1.org/v1".into()
    }
    pub fn user_agent() -> String {
        "paddock/0.1".into()
    }
    pub fn timeout() -> u64 {
        15
    }
    pub fn retries() -> u32 {
        3
    }
    pub fn retry_delay() -> u64 {
        500
    }

    // Collector defaults
    pub fn year() -> i32 {
        2025
    }
    pub fn cache_root() -> PathBuf {
        "raw_data".into()
    }
    pub fn max_concurrent() -> usize {
        6
    }
    pub fn teams() -> Vec<Team> {
        vec![
            Team::RedBull,
            Team::Ferrari,
            Team::Mercedes,
            Team::McLaren,
            Team::AstonMartin,
        ]
    }

    // Export defaults
    pub fn out_dir() -> PathBuf {
        ".".into()
    }
}
