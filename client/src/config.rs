//! Configuration management for the client.

use std::env;
use std::time::Duration;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Fixed interval between scheduled sync cycles
    pub sync_interval: Duration,
    /// Whether to run a sync cycle immediately on startup
    pub sync_on_start: bool,
}

/// Default sync interval in seconds.
const DEFAULT_SYNC_INTERVAL_SECS: u64 = 30;

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let interval_secs = match env::var("SYNC_INTERVAL_SECS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidInterval)?,
            Err(_) => DEFAULT_SYNC_INTERVAL_SECS,
        };
        if interval_secs == 0 {
            return Err(ConfigError::InvalidInterval);
        }

        let sync_on_start = match env::var("SYNC_ON_START") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidSyncOnStart)?,
            Err(_) => true,
        };

        Ok(Self {
            sync_interval: Duration::from_secs(interval_secs),
            sync_on_start,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sync_interval: Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS),
            sync_on_start: true,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SYNC_INTERVAL_SECS must be a positive integer number of seconds")]
    InvalidInterval,

    #[error("SYNC_ON_START must be 'true' or 'false'")]
    InvalidSyncOnStart,
}
