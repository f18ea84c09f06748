//! Error types for Sketch document acquisition and queries.

use std::io;
use std::path::PathBuf;

use serde_json::{json, Value};
use thiserror::Error;

/// Result type for Sketch operations.
pub type SketchResult<T> = Result<T, SketchError>;

/// Code reported for failures that carry no specific code.
pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN_ERROR";

/// Errors that can occur while acquiring, parsing or querying a Sketch document.
#[derive(Debug, Error)]
pub enum SketchError {
    /// The bytes are not a readable ZIP archive.
    #[error("Invalid Sketch archive: {message}")]
    ArchiveFormat {
        /// Description of what's wrong.
        message: String,
    },

    /// A required archive entry is missing.
    #[error("Archive entry not found: {name}")]
    EntryNotFound {
        /// Name of the missing entry.
        name: String,
    },

    /// The archive has no usable primary document.
    #[error("Invalid Sketch file: {message}")]
    InvalidDocument {
        /// Description of what's wrong.
        message: String,
    },

    /// An archive entry is not valid JSON.
    #[error("Failed to parse {entry} as JSON")]
    InvalidJson {
        /// Name of the offending entry.
        entry: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// No node carries the requested identifier.
    #[error("Node with ID {id} not found in the document")]
    NodeNotFound {
        /// The identifier that was searched for.
        id: String,
    },

    /// A node was required but none was supplied.
    #[error("Invalid node: no node supplied")]
    InvalidNode,

    /// A cloud location has no extractable document identifier.
    #[error("Invalid Sketch Cloud URL: {url}")]
    InvalidUrl {
        /// The location that failed to parse.
        url: String,
    },

    /// Cloud access was requested without an API key.
    #[error("Sketch API key is required for cloud files")]
    MissingCredential,

    /// The document metadata request was rejected.
    #[error("Failed to fetch document from Sketch Cloud: {status}")]
    RemoteFetch {
        /// HTTP status text.
        status: String,
    },

    /// The archive download was rejected.
    #[error("Failed to download Sketch file: {status}")]
    RemoteDownload {
        /// HTTP status text.
        status: String,
    },

    /// The metadata response lacks the fields needed to continue.
    #[error("Unexpected Sketch Cloud response: {message}")]
    MalformedMetadata {
        /// Description of what's missing.
        message: String,
    },

    /// The HTTP exchange itself failed (connection, TLS, body decoding).
    #[error("Sketch Cloud request failed: {source}")]
    Http {
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// Neither an absolute path nor a default local file is available.
    #[error(
        "No local Sketch file specified. Use --local-file parameter or set LOCAL_SKETCH_PATH environment variable."
    )]
    MissingLocalFile,

    /// The resolved local file does not exist.
    #[error("Local Sketch file not found: {}", path.display())]
    FileNotFound {
        /// The resolved path.
        path: PathBuf,
    },

    /// The local file exists but could not be read.
    #[error("Failed to read file: {}", path.display())]
    FileRead {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Staging the archive bytes on disk failed.
    #[error("Failed to stage archive on disk")]
    Staging {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The blocking assembly task panicked or was cancelled.
    #[error("Archive assembly did not complete: {source}")]
    AssemblyTask {
        /// The task's join error.
        #[source]
        source: tokio::task::JoinError,
    },
}

impl SketchError {
    /// Creates an archive format error.
    pub fn archive_format(message: impl Into<String>) -> Self {
        Self::ArchiveFormat {
            message: message.into(),
        }
    }

    /// Creates an entry-not-found error.
    pub fn entry_not_found(name: impl Into<String>) -> Self {
        Self::EntryNotFound { name: name.into() }
    }

    /// Creates an invalid document error.
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            message: message.into(),
        }
    }

    /// Creates a node-not-found error.
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }

    /// Creates a file read error.
    pub fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Stable machine-readable code for the error envelope.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ArchiveFormat { .. } => "ARCHIVE_FORMAT_ERROR",
            Self::EntryNotFound { .. } => "ENTRY_NOT_FOUND",
            Self::InvalidDocument { .. } => "INVALID_DOCUMENT",
            Self::NodeNotFound { .. } => "NODE_NOT_FOUND",
            Self::InvalidNode => "INVALID_NODE",
            Self::InvalidUrl { .. } => "INVALID_URL",
            Self::MissingCredential => "MISSING_CREDENTIAL",
            Self::RemoteFetch { .. } => "REMOTE_FETCH_ERROR",
            Self::RemoteDownload { .. } => "REMOTE_DOWNLOAD_ERROR",
            Self::MissingLocalFile => "MISSING_LOCAL_FILE",
            Self::FileNotFound { .. } => "FILE_NOT_FOUND",
            Self::InvalidJson { .. }
            | Self::MalformedMetadata { .. }
            | Self::Http { .. }
            | Self::FileRead { .. }
            | Self::Staging { .. }
            | Self::AssemblyTask { .. } => UNKNOWN_ERROR_CODE,
        }
    }

    /// Structured context for the error envelope; `{}` when there is none.
    #[must_use]
    pub fn details(&self) -> Value {
        match self {
            Self::EntryNotFound { name } => json!({ "entry": name }),
            Self::InvalidJson { entry, .. } => json!({ "entry": entry }),
            Self::NodeNotFound { id } => json!({ "nodeId": id }),
            Self::InvalidUrl { url } => json!({ "url": url }),
            Self::RemoteFetch { status } | Self::RemoteDownload { status } => {
                json!({ "status": status })
            }
            Self::FileNotFound { path } | Self::FileRead { path, .. } => {
                json!({ "path": path.display().to_string() })
            }
            _ => json!({}),
        }
    }
}

impl From<reqwest::Error> for SketchError {
    fn from(source: reqwest::Error) -> Self {
        Self::Http { source }
    }
}
