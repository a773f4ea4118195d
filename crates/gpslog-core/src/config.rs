//! Configuration management for gpslog.
//!
//! Loads configuration from ${GPSLOG_HOME}/config.toml with sensible defaults.
//! Every service base URL can also be overridden through an environment
//! variable; resolution happens in the service constructors, not here.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Identity service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Base URL of the identity service (defaults to the hosted endpoint).
    pub base_url: Option<String>,
    /// API key sent with every sign-in request.
    pub api_key: Option<String>,
}

/// Location daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Base URL of the local position daemon.
    pub base_url: Option<String>,
}

/// Coordinate store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the coordinate store (no default; must be configured).
    pub base_url: Option<String>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identity service settings.
    pub identity: IdentityConfig,
    /// Location daemon settings.
    pub locator: LocatorConfig,
    /// Coordinate store settings.
    pub store: StoreConfig,
}

impl Config {
    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }
}

pub mod paths {
    //! Path resolution for gpslog configuration and data directories.
    //!
    //! GPSLOG_HOME resolution order:
    //! 1. GPSLOG_HOME environment variable (if set)
    //! 2. ~/.config/gpslog (default)

    use std::path::PathBuf;

    /// Returns the gpslog home directory.
    ///
    /// Checks GPSLOG_HOME env var first, falls back to ~/.config/gpslog
    pub fn gpslog_home() -> PathBuf {
        if let Ok(home) = std::env::var("GPSLOG_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("gpslog"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        gpslog_home().join("config.toml")
    }

    /// Returns the directory log files are written to.
    pub fn logs_dir() -> PathBuf {
        gpslog_home().join("logs")
    }
}
