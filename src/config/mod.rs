//! Configuration file loading and parsing.
//!
//! This module handles loading the optional configuration file from disk and
//! parsing it into validated, type-safe structures.
//!
//! # Precedence
//!
//! 1. Command-line flags
//! 2. Environment variables (`SKETCH_API_KEY`, `PORT`, `LOCAL_SKETCH_PATH`)
//! 3. Configuration file
//! 4. Built-in defaults
//!
//! # Configuration File Locations
//!
//! 1. Path specified via the `CONFIG_FILE` argument (must exist)
//! 2. Default location (skipped silently if absent):
//!    - **Linux/macOS:** `~/.sketch-context-mcp/config.json`
//!    - **Windows:** `%USERPROFILE%\.sketch-context-mcp\config.json`

mod settings;

pub use settings::{CloudConfig, Config, LoggingConfig, Overrides, DEFAULT_PORT};

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Returns the default configuration directory.
///
/// - **Linux/macOS:** `~/.sketch-context-mcp/`
/// - **Windows:** `%USERPROFILE%\.sketch-context-mcp\`
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".sketch-context-mcp"))
}

/// Returns the platform-specific default configuration file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("config.json"))
}

/// Loads and parses the configuration file.
///
/// If `path` is `None`, uses the platform-specific default location, falling
/// back to [`Config::default`] when no file exists there.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given configuration file cannot be found
/// - The file cannot be read
/// - The JSON is malformed
/// - Fields are invalid
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::NotFound {
                    path: p.to_path_buf(),
                });
            }
            p.to_path_buf()
        }
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(Config::default()),
        },
    };

    let contents = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;

    let config: Config = serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: config_path.clone(),
        source: e,
    })?;

    // Validate the configuration
    config.validate()?;

    Ok(config)
}
