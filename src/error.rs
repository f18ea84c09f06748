//! Error types for sketch-context-mcp.
//!
//! # Security Note
//!
//! Error messages never include the Sketch API key. Variants that could carry
//! credentials use generic descriptions instead of the actual values.

use std::path::PathBuf;

use serde_json::{json, Value};
use thiserror::Error;

use crate::sketch::error::SketchError;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors surfaced by message handling and tool dispatch.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The requested tool is not in the catalog.
    #[error("Unknown tool: {name}")]
    UnknownTool {
        /// The requested tool name.
        name: String,
    },

    /// The message `type` is not one the server understands.
    #[error("Unknown message type: {kind}")]
    UnknownMessageType {
        /// The received `type`, or `undefined` when missing.
        kind: String,
    },

    /// The message is not a JSON object.
    #[error("Invalid message: {message}")]
    InvalidMessage {
        /// Description of what's wrong.
        message: String,
    },

    /// Tool parameters are missing or have the wrong shape.
    #[error("Invalid parameters for {tool}: {message}")]
    InvalidParams {
        /// The tool being called.
        tool: String,
        /// Description of what's wrong.
        message: String,
    },

    /// A document acquisition or query failure.
    #[error(transparent)]
    Sketch(#[from] SketchError),
}

impl DispatchError {
    /// Whether the failure is the client's fault (malformed or unknown request).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownTool { .. }
                | Self::UnknownMessageType { .. }
                | Self::InvalidMessage { .. }
                | Self::InvalidParams { .. }
        )
    }

    /// Stable machine-readable code for the error envelope.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnknownTool { .. } => "UNKNOWN_TOOL",
            Self::UnknownMessageType { .. } => "UNKNOWN_MESSAGE_TYPE",
            Self::InvalidMessage { .. } => "INVALID_MESSAGE",
            Self::InvalidParams { .. } => "INVALID_PARAMS",
            Self::Sketch(e) => e.code(),
        }
    }

    /// Structured context for the error envelope; `{}` when there is none.
    #[must_use]
    pub fn details(&self) -> Value {
        match self {
            Self::UnknownTool { name } => json!({ "tool": name }),
            Self::InvalidParams { tool, .. } => json!({ "tool": tool }),
            Self::Sketch(e) => e.details(),
            Self::UnknownMessageType { .. } | Self::InvalidMessage { .. } => json!({}),
        }
    }
}
