//! Configuration loading and defaults for taskbar-autohider.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Smallest accepted idle timeout in seconds.
pub const MIN_TIMEOUT_SECONDS: u64 = 5;

/// Largest accepted idle timeout in seconds (one hour).
pub const MAX_TIMEOUT_SECONDS: u64 = 3600;

/// Idle timeout used when nothing else is configured.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Default interval between idle polls.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Errors from validating configuration values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Idle timeout must be between 5 and 3600 seconds, got {0}")]
    OutOfRange(i64),

    #[error("Poll interval must be greater than zero")]
    ZeroPollInterval,
}

/// Validated idle timeout (newtype for the `[5, 3600]` second range).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleTimeout(u64);

impl IdleTimeout {
    /// Validate a timeout in seconds. Out-of-range values are rejected, never clamped.
    pub fn new(seconds: i64) -> Result<Self, ConfigError> {
        match u64::try_from(seconds) {
            Ok(s) if (MIN_TIMEOUT_SECONDS..=MAX_TIMEOUT_SECONDS).contains(&s) => Ok(Self(s)),
            _ => Err(ConfigError::OutOfRange(seconds)),
        }
    }

    /// Get the timeout in whole seconds.
    pub fn seconds(self) -> u64 {
        self.0
    }

    /// Get the timeout as a duration.
    pub fn as_duration(self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Default for IdleTimeout {
    fn default() -> Self {
        Self(DEFAULT_TIMEOUT_SECONDS)
    }
}

/// Main configuration for taskbar-autohider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds without input before the taskbar is hidden (default: 30).
    pub idle_timeout_seconds: u64,

    /// Milliseconds between idle polls (default: 1000).
    pub poll_interval_ms: u64,

    /// Whether notifications are surfaced to the user (default: true).
    /// When false they are still logged at debug level.
    pub notifications: bool,

    /// Dry run mode: log taskbar commands instead of sending them.
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            idle_timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            notifications: true,
            dry_run: false,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration from the default path, or return defaults if not found.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(p) = path {
            return Self::load(p);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let default_path = config_dir.join("taskbar-autohider").join("config.toml");
            if default_path.exists() {
                return Self::load(&default_path);
            }
        }

        Ok(Self::default())
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.idle_timeout()?;
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }

    /// The configured idle timeout, validated.
    pub fn idle_timeout(&self) -> Result<IdleTimeout, ConfigError> {
        let seconds = i64::try_from(self.idle_timeout_seconds).unwrap_or(i64::MAX);
        IdleTimeout::new(seconds)
    }

    /// Interval between idle polls.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
