//! Configuration for the render device host.
//!
//! The configuration is a small TOML document:
//!
//! ```toml
//! egl_library = "C:/Program Files/App/libEGL.dll"
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```
//!
//! Every field is optional. Unknown fields are rejected so that typos do not
//! silently fall back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["text", "json"];

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Logging settings consumed by [`crate::logging::init_logging`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// One of "trace", "debug", "info", "warn", "error" (case-insensitive).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "text" or "json" (case-insensitive).
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderDeviceConfig {
    /// Path to ANGLE's libEGL. `None` uses the platform loader search path.
    #[serde(default)]
    pub egl_library: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Loads and validates [`RenderDeviceConfig`].
pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads `path`; a missing file yields the default configuration.
    pub fn load(path: &Path) -> Result<RenderDeviceConfig, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(?path, "config file not found, using defaults");
                Self::validate(RenderDeviceConfig::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<RenderDeviceConfig, ConfigError> {
        let config: RenderDeviceConfig = toml::from_str(content)?;
        Self::validate(config)
    }

    /// Lower-cases level and format and rejects values outside the known sets.
    fn validate(mut config: RenderDeviceConfig) -> Result<RenderDeviceConfig, ConfigError> {
        let level = config.logging.level.trim().to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "unknown log level `{}`",
                config.logging.level
            )));
        }
        let format = config.logging.format.trim().to_lowercase();
        if !LOG_FORMATS.contains(&format.as_str()) {
            return Err(ConfigError::Validation(format!(
                "unknown log format `{}`",
                config.logging.format
            )));
        }
        if let Some(library) = &config.egl_library {
            if library.as_os_str().is_empty() {
                return Err(ConfigError::Validation("egl_library must not be empty".to_string()));
            }
        }
        config.logging.level = level;
        config.logging.format = format;
        Ok(config)
    }
}
