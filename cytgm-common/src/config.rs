//! Bootstrap configuration loading
//!
//! Configuration is a single small TOML file. Sources in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Platform config directory (`<config_dir>/cytgm/config.toml`)
//! 4. Built-in defaults (fallback)
//!
//! A missing file is never fatal: a warning is logged and defaults are used.
//! A file that exists but cannot be parsed is an error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "CYTGM_CONFIG";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct TomlConfig {
    /// Playback session tuning
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[playback]` table
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PlaybackConfig {
    /// Delay between a navigation request and the media swap
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Cadence of time observer ticks
    #[serde(default = "default_time_observer_interval_ms")]
    pub time_observer_interval_ms: u64,

    /// Volume applied to the first video (0.0-1.0)
    #[serde(default = "default_initial_volume")]
    pub initial_volume: f32,

    /// Rate applied to the first video (0.5-2.0)
    #[serde(default = "default_initial_rate")]
    pub initial_rate: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            time_observer_interval_ms: default_time_observer_interval_ms(),
            initial_volume: default_initial_volume(),
            initial_rate: default_initial_rate(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_settle_delay_ms() -> u64 {
    500
}

fn default_time_observer_interval_ms() -> u64 {
    1000
}

fn default_initial_volume() -> f32 {
    0.5
}

fn default_initial_rate() -> f32 {
    1.0
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Load configuration from a file
    ///
    /// Missing file → defaults (with a warning). Unreadable or malformed
    /// file → error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "Config file {} not found, using built-in defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Resolve the config file location and load it
    ///
    /// Falls back to defaults when no file can be located at all.
    pub fn resolve_and_load(cli_arg: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_arg, CONFIG_ENV_VAR) {
            Some(path) => Self::load(&path),
            None => {
                info!("No config file located, using built-in defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Config file resolution following the documented priority order
///
/// Returns `None` only when neither an explicit path is given nor a platform
/// config directory can be determined.
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    default_config_path()
}

/// `<platform config dir>/cytgm/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cytgm").join("config.toml"))
}
