//! Configuration management for the Jikan gateway.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Upstream gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,
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

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Jikan API base URL
    pub base_url: String,

    /// Minimum time between two dispatched requests, in milliseconds
    pub min_interval_ms: u64,

    /// Fixed wait after a 429 response before resubmitting, in milliseconds
    pub retry_backoff_ms: u64,

    /// Automatic retries allowed after a 429 response
    pub max_retries: u32,

    /// Transport timeout applied to every request, in seconds
    pub timeout_secs: u64,

    /// User-Agent header sent upstream
    pub user_agent: String,

    /// Use the server's `Retry-After` header instead of the fixed back-off
    pub honor_retry_after: bool,

    /// Longest `Retry-After` wait honored, in seconds
    pub max_retry_after_secs: u64,
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Parsed from this file
    File(PathBuf),
    /// File was missing; built-in defaults
    Defaults,
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

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jikan.moe/v4".to_string(),
            // Jikan allows ~3 requests/second
            min_interval_ms: 400,
            retry_backoff_ms: 2000,
            max_retries: 1,
            timeout_secs: 10,
            user_agent: concat!("jikan-gateway/", env!("CARGO_PKG_VERSION")).to_string(),
            honor_retry_after: false,
            max_retry_after_secs: 5,
        }
    }
}

impl GatewayConfig {
    /// Minimum interval between dispatches
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    /// Back-off applied after a 429 response
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Transport timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Cap on a server-supplied `Retry-After`
    pub fn max_retry_after(&self) -> Duration {
        Duration::from_secs(self.max_retry_after_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let (config, origin) = Self::load(path)?;

        match origin {
            ConfigOrigin::File(_) => tracing::info!(
                path = %path.display(),
                "Configuration loaded successfully"
            ),
            ConfigOrigin::Defaults => tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            ),
        }

        Ok(config)
    }

    /// Load configuration without logging, reporting where it came from.
    ///
    /// For callers that initialise logging from the result and report the
    /// origin afterwards.
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, ConfigOrigin)> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok((Self::default(), ConfigOrigin::Defaults));
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok((config, ConfigOrigin::File(path.to_path_buf())))
    }

    /// Load configuration from a TOML file or create default if not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::from_file(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load config, using defaults");
            Self::default()
        })
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }

    /// Reject settings the gateway cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.gateway.base_url.trim().is_empty() {
            bail!("gateway.base_url must not be empty");
        }
        if self.gateway.timeout_secs == 0 {
            bail!("gateway.timeout_secs must be greater than zero");
        }
        if self.logging.default_level.parse::<tracing::Level>().is_err() {
            bail!(
                "logging.default_level is not a valid level: {}",
                self.logging.default_level
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.gateway.base_url, "https://api.jikan.moe/v4");
        assert_eq!(config.gateway.min_interval(), Duration::from_millis(400));
        assert_eq!(config.gateway.retry_backoff(), Duration::from_millis(2000));
        assert_eq!(config.gateway.max_retries, 1);
        assert_eq!(config.gateway.timeout(), Duration::from_secs(10));
        assert!(!config.gateway.honor_retry_after);
        assert_eq!(config.gateway.max_retry_after(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let mut original_config = Config::default();
        original_config.gateway.min_interval_ms = 50;
        original_config.save(&config_path)?;

        assert!(config_path.exists());

        let loaded_config = Config::from_file(&config_path)?;
        assert_eq!(loaded_config.gateway.min_interval_ms, 50);
        assert_eq!(
            loaded_config.gateway.base_url,
            original_config.gateway.base_url
        );

        Ok(())
    }

    #[test]
    fn test_partial_config_uses_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[gateway]\nretry_backoff_ms = 100\n")?;

        let config = Config::from_file(&config_path)?;
        assert_eq!(config.gateway.retry_backoff_ms, 100);
        assert_eq!(config.gateway.min_interval_ms, 400);
        assert_eq!(config.logging.default_level, "info");

        Ok(())
    }

    #[test]
    fn test_invalid_config_rejected() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[gateway]\ntimeout_secs = 0\n")?;

        assert!(Config::from_file(&config_path).is_err());

        let config = Config::load_or_default(&config_path);
        assert_eq!(config.gateway.timeout_secs, 10);

        Ok(())
    }

    #[test]
    fn test_load_reports_origin() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let (_, origin) = Config::load(&config_path)?;
        assert_eq!(origin, ConfigOrigin::Defaults);

        std::fs::write(&config_path, "[gateway]\nmax_retry_after_secs = 2\n")?;
        let (config, origin) = Config::load(&config_path)?;
        assert_eq!(origin, ConfigOrigin::File(config_path.clone()));
        assert_eq!(config.gateway.max_retry_after(), Duration::from_secs(2));

        Ok(())
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.gateway.max_retries, 1);
    }
}
