//! Configuration management for the sync jobs.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables. The CLI applies its own flags on top.

use crate::models::{Season, YearRange};
use anyhow::{bail, Context, Result};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// AniList rejects `perPage` above this
pub const MAX_PER_PAGE: u32 = 50;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upstream API settings
    pub upstream: UpstreamConfig,

    /// Single-season sync settings
    pub season: SeasonSyncConfig,

    /// Full-database sync settings
    pub database: DatabaseSyncConfig,

    /// Request pacing and retry settings
    pub pacing: PacingConfig,

    /// Snapshot output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Upstream API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// GraphQL endpoint
    pub endpoint: String,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

/// Deployment A: one season of one year
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonSyncConfig {
    pub season: Season,
    pub year: i32,
}

/// Deployment B: every season across an inclusive year range
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSyncConfig {
    pub start_year: i32,

    /// Defaults to the current year when unset
    pub end_year: Option<i32>,
}

/// Pacing, throttling and retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Page size requested from upstream
    pub per_page: u32,

    /// Pause after every successful request
    pub req_delay_ms: u64,

    /// Pause between partitions
    pub season_delay_ms: u64,

    /// Retries allowed per page before the run aborts
    pub max_retries: u32,

    /// First backoff delay
    pub backoff_base_ms: u64,

    /// Upper bound for any backoff or retry-after delay
    pub backoff_max_ms: u64,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory of the static API tree
    pub root_dir: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log directory path
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://graphql.anilist.co".to_string(),
            timeout_seconds: 30,
            user_agent: format!("anime-season-sync/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for SeasonSyncConfig {
    fn default() -> Self {
        Self {
            season: Season::Winter,
            year: 2026,
        }
    }
}

impl Default for DatabaseSyncConfig {
    fn default() -> Self {
        Self {
            start_year: 2020,
            end_year: None,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            per_page: 50,
            req_delay_ms: 1200,
            season_delay_ms: 1500,
            max_retries: 8,
            backoff_base_ms: 1500,
            backoff_max_ms: 60_000,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root_dir: "docs/api/v1".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            default_level: "info".to_string(),
            console: true,
            file: false,
            json_format: false,
        }
    }
}

/// Parse an optional environment value, naming the key on failure
fn parse_env<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {:?} ({})", key, raw, e)),
        _ => Ok(None),
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Load from file, then apply process environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment-style overrides from the given lookup
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = parse_env::<String>(&lookup, "ANILIST_ENDPOINT")? {
            self.upstream.endpoint = v;
        }
        if let Some(v) = parse_env::<Season>(&lookup, "SEASON")? {
            self.season.season = v;
        }
        if let Some(v) = parse_env(&lookup, "YEAR")? {
            self.season.year = v;
        }
        if let Some(v) = parse_env(&lookup, "START_YEAR")? {
            self.database.start_year = v;
        }
        if let Some(v) = parse_env(&lookup, "END_YEAR")? {
            self.database.end_year = Some(v);
        }
        if let Some(v) = parse_env(&lookup, "PER_PAGE")? {
            self.pacing.per_page = v;
        }
        if let Some(v) = parse_env(&lookup, "REQ_DELAY_MS")? {
            self.pacing.req_delay_ms = v;
        }
        if let Some(v) = parse_env(&lookup, "SEASON_DELAY_MS")? {
            self.pacing.season_delay_ms = v;
        }
        if let Some(v) = parse_env(&lookup, "MAX_RETRIES")? {
            self.pacing.max_retries = v;
        }
        if let Some(v) = parse_env(&lookup, "BACKOFF_BASE_MS")? {
            self.pacing.backoff_base_ms = v;
        }
        if let Some(v) = parse_env(&lookup, "BACKOFF_MAX_MS")? {
            self.pacing.backoff_max_ms = v;
        }
        if let Some(v) = parse_env::<String>(&lookup, "OUTPUT_DIR")? {
            self.output.root_dir = v;
        }
        Ok(())
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.pacing.per_page == 0 || self.pacing.per_page > MAX_PER_PAGE {
            bail!(
                "per_page must be between 1 and {}, got {}",
                MAX_PER_PAGE,
                self.pacing.per_page
            );
        }
        if self.pacing.backoff_base_ms > self.pacing.backoff_max_ms {
            bail!(
                "backoff_base_ms ({}) exceeds backoff_max_ms ({})",
                self.pacing.backoff_base_ms,
                self.pacing.backoff_max_ms
            );
        }
        if self.logging.default_level.parse::<tracing::Level>().is_err() {
            bail!(
                "default_level must be one of trace, debug, info, warn, error, got {:?}",
                self.logging.default_level
            );
        }
        Ok(())
    }

    /// Check the year range used by a full-database run
    pub fn validate_range(&self) -> Result<YearRange> {
        let range = self.year_range();
        if range.start_year > range.end_year {
            bail!(
                "start_year ({}) is after end_year ({})",
                range.start_year,
                range.end_year
            );
        }
        Ok(range)
    }

    /// Year range for a full-database run
    pub fn year_range(&self) -> YearRange {
        YearRange {
            start_year: self.database.start_year,
            end_year: self
                .database
                .end_year
                .unwrap_or_else(|| chrono::Utc::now().year()),
        }
    }

    /// Root of the static API tree
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.output.root_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.upstream.endpoint, "https://graphql.anilist.co");
        assert_eq!(config.season.season, Season::Winter);
        assert_eq!(config.pacing.per_page, 50);
        assert_eq!(config.pacing.req_delay_ms, 1200);
        assert_eq!(config.pacing.season_delay_ms, 1500);
        assert_eq!(config.pacing.max_retries, 8);
        assert_eq!(config.pacing.backoff_base_ms, 1500);
        assert_eq!(config.pacing.backoff_max_ms, 60_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "[pacing]\nper_page = 25\n\n[season]\nseason = \"SUMMER\"\nyear = 2024\n",
        )?;

        let config = Config::from_file(&config_path)?;
        assert_eq!(config.pacing.per_page, 25);
        assert_eq!(config.pacing.max_retries, 8);
        assert_eq!(config.season.season, Season::Summer);
        assert_eq!(config.season.year, 2024);

        Ok(())
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.output.root_dir, "docs/api/v1");
    }

    #[test]
    fn test_env_overrides() -> Result<()> {
        let mut config = Config::default();
        config.apply_env(env(&[
            ("SEASON", "spring"),
            ("YEAR", "2024"),
            ("START_YEAR", "2018"),
            ("END_YEAR", "2019"),
            ("PER_PAGE", "10"),
            ("REQ_DELAY_MS", "0"),
            ("MAX_RETRIES", "2"),
            ("BACKOFF_MAX_MS", "5000"),
        ]))?;

        assert_eq!(config.season.season, Season::Spring);
        assert_eq!(config.season.year, 2024);
        assert_eq!(
            config.year_range(),
            YearRange {
                start_year: 2018,
                end_year: 2019
            }
        );
        assert_eq!(config.pacing.per_page, 10);
        assert_eq!(config.pacing.req_delay_ms, 0);
        assert_eq!(config.pacing.max_retries, 2);
        assert_eq!(config.pacing.backoff_max_ms, 5000);
        assert_eq!(config.pacing.season_delay_ms, 1500);

        Ok(())
    }

    #[test]
    fn test_env_invalid_value_is_error() {
        let mut config = Config::default();
        let err = config
            .apply_env(env(&[("MAX_RETRIES", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("MAX_RETRIES"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.pacing.per_page = 100;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pacing.backoff_base_ms = 70_000;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.default_level = "chatty".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("chatty"));
    }

    #[test]
    fn test_validate_range_rejects_inverted_years() {
        let mut config = Config::default();
        config.database.start_year = 2030;
        config.database.end_year = Some(2020);
        assert!(config.validate().is_ok());

        let err = config.validate_range().unwrap_err();
        assert!(err.to_string().contains("start_year (2030) is after end_year (2020)"));
    }

    #[test]
    fn test_future_start_year_does_not_block_season_config() -> Result<()> {
        let mut config = Config::default();
        config.apply_env(env(&[("START_YEAR", "2099"), ("YEAR", "2025")]))?;

        config.validate()?;
        assert_eq!(config.season.year, 2025);
        assert!(config.validate_range().is_err());

        Ok(())
    }

    #[test]
    fn test_validate_range_returns_range() -> Result<()> {
        let mut config = Config::default();
        config.database.start_year = 2019;
        config.database.end_year = Some(2021);

        assert_eq!(
            config.validate_range()?,
            YearRange {
                start_year: 2019,
                end_year: 2021
            }
        );

        Ok(())
    }
}
