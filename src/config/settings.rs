//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.
//! Command-line flags and environment variables are layered on top through
//! [`Overrides`].

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::acquire::{AcquireSettings, DEFAULT_API_BASE_URL};
use crate::error::ConfigError;

/// Port used when nothing else is configured.
pub const DEFAULT_PORT: u16 = 3333;

/// Accepted values for `logging.level`.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Sketch Cloud API access token.
    #[serde(default)]
    pub sketch_api_key: Option<String>,

    /// Port for the HTTP/SSE server.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Sketch file used when a location is not an absolute path.
    #[serde(default)]
    pub local_file: Option<PathBuf>,

    /// Read messages from stdin instead of serving requests over HTTP only.
    #[serde(default)]
    pub stdio: bool,

    /// Sketch Cloud settings.
    #[serde(default)]
    pub cloud: CloudConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            _schema: None,
            _comment: None,
            sketch_api_key: None,
            port: default_port(),
            local_file: None,
            stdio: false,
            cloud: CloudConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::ValidationError {
                message: "port must be between 1 and 65535".to_string(),
            });
        }

        let base = &self.cloud.api_base_url;
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::ValidationError {
                message: format!("Invalid cloud.api_base_url '{base}'. Must be an http(s) URL"),
            });
        }

        if self.cloud.timeout_secs == Some(0) {
            return Err(ConfigError::ValidationError {
                message: "cloud.timeout_secs must be greater than zero".to_string(),
            });
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }

        Ok(())
    }

    /// Applies command-line/environment values on top of the file values.
    pub fn apply(&mut self, overrides: Overrides) {
        if overrides.sketch_api_key.is_some() {
            self.sketch_api_key = overrides.sketch_api_key;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if overrides.local_file.is_some() {
            self.local_file = overrides.local_file;
        }
        self.stdio |= overrides.stdio;
    }

    /// Settings for the document acquirer.
    #[must_use]
    pub fn acquire_settings(&self) -> AcquireSettings {
        AcquireSettings {
            api_key: self.sketch_api_key.clone(),
            api_base_url: self.cloud.api_base_url.clone(),
            local_file: self.local_file.clone(),
            timeout: self.cloud.timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Values that take precedence over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Sketch Cloud API access token.
    pub sketch_api_key: Option<String>,
    /// HTTP/SSE port.
    pub port: Option<u16>,
    /// Default local Sketch file.
    pub local_file: Option<PathBuf>,
    /// Enable stdio mode.
    pub stdio: bool,
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Sketch Cloud configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CloudConfig {
    /// API root for document metadata requests.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout in seconds. Requests wait indefinitely when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout_secs: None,
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
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

fn default_log_level() -> String {
    "warn".to_string()
}
