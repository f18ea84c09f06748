//! Message types shared by the HTTP and stdio transports.
//!
//! Every message is a JSON object discriminated by its `type` field.
//!
//! # Incoming
//!
//! - `{"type": "ping"}`
//! - `{"type": "get_tools"}`
//! - `{"type": "execute_tool", "tool": "...", "params": {...}, "id": ...}`
//!
//! # Outgoing
//!
//! - `{"type": "connection_success"}` (first SSE event)
//! - `{"type": "pong"}`
//! - `{"type": "tools", "tools": [...]}`
//! - `{"type": "tool_result", "id": ..., "result": ...}`
//! - `{"type": "error", "error": ...}` where `error` is a plain message over
//!   HTTP and a structured [`ErrorEnvelope`] on the stdio transport

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::DispatchError;
use crate::mcp::tools::{ToolDefinition, ToolOutput};

/// Server name reported to clients.
pub const SERVER_NAME: &str = "sketch-context-mcp";

/// Suggestion attached to every stdio error envelope.
pub const ERROR_SUGGESTION: &str = "Please try again later or contact support for assistance.";

/// A parsed incoming message.
#[derive(Debug, Clone, PartialEq)]
pub enum IncomingMessage {
    /// Liveness check.
    Ping,
    /// Request for the tool catalog.
    GetTools,
    /// Tool invocation.
    ExecuteTool(ExecuteTool),
}

/// Body of an `execute_tool` message.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteTool {
    /// Tool name.
    pub tool: String,
    /// Tool parameters; `{}` when omitted.
    pub params: Value,
    /// Client correlation id, echoed back in the result.
    pub id: Option<Value>,
}

/// Parses a JSON string into an incoming message.
///
/// # Errors
///
/// - [`DispatchError::InvalidMessage`] if the JSON is malformed or not an object
/// - [`DispatchError::UnknownMessageType`] if `type` is missing or unrecognised
pub fn parse_message(json: &str) -> Result<IncomingMessage, DispatchError> {
    let value: Value = serde_json::from_str(json).map_err(|e| DispatchError::InvalidMessage {
        message: e.to_string(),
    })?;
    parse_value(value)
}

/// Interprets an already-parsed JSON value as an incoming message.
///
/// # Errors
///
/// See [`parse_message`].
pub fn parse_value(value: Value) -> Result<IncomingMessage, DispatchError> {
    let Value::Object(mut obj) = value else {
        return Err(DispatchError::InvalidMessage {
            message: "message must be a JSON object".to_string(),
        });
    };

    let kind = obj.get("type").and_then(Value::as_str).unwrap_or("undefined");

    match kind {
        "ping" => Ok(IncomingMessage::Ping),
        "get_tools" => Ok(IncomingMessage::GetTools),
        "execute_tool" => {
            let tool = obj
                .get("tool")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| DispatchError::InvalidMessage {
                    message: "execute_tool requires a string `tool` field".to_string(),
                })?;
            let params = obj
                .remove("params")
                .filter(|p| !p.is_null())
                .unwrap_or_else(|| Value::Object(Map::new()));
            let id = obj.remove("id").filter(|id| !id.is_null());

            Ok(IncomingMessage::ExecuteTool(ExecuteTool { tool, params, id }))
        }
        other => Err(DispatchError::UnknownMessageType {
            kind: other.to_string(),
        }),
    }
}

/// A message sent to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutgoingMessage {
    /// First event on every SSE stream.
    ConnectionSuccess,
    /// Reply to `ping`.
    Pong,
    /// Reply to `get_tools`.
    Tools {
        /// The tool catalog.
        tools: Vec<ToolDefinition>,
    },
    /// Reply to a successful `execute_tool`.
    ToolResult {
        /// The client's correlation id.
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<Value>,
        /// The tool's output.
        result: ToolOutput,
    },
    /// A failure.
    Error {
        /// Message or structured envelope.
        error: ErrorPayload,
    },
}

impl OutgoingMessage {
    /// Error reply in the HTTP transport's form: a plain message.
    #[must_use]
    pub fn error_message(error: &DispatchError) -> Self {
        Self::Error {
            error: ErrorPayload::Message(error.to_string()),
        }
    }

    /// Error reply in the stdio transport's form: a structured envelope.
    #[must_use]
    pub fn error_envelope(error: &DispatchError) -> Self {
        Self::Error {
            error: ErrorPayload::Envelope(ErrorEnvelope::from_error(error)),
        }
    }
}

/// The `error` member of an error reply.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ErrorPayload {
    /// Human-readable message only.
    Message(String),
    /// Structured envelope.
    Envelope(ErrorEnvelope),
}

/// Structured error body used by the stdio transport.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    /// Human-readable message.
    pub message: String,
    /// Machine-readable code (`UNKNOWN_ERROR` when none applies).
    pub code: &'static str,
    /// Structured context, `{}` when there is none.
    pub details: Value,
    /// Generic remediation hint.
    pub suggestion: &'static str,
}

impl ErrorEnvelope {
    /// Builds the envelope for `error`.
    #[must_use]
    pub fn from_error(error: &DispatchError) -> Self {
        Self {
            message: error.to_string(),
            code: error.code(),
            details: error.details(),
            suggestion: ERROR_SUGGESTION,
        }
    }
}
