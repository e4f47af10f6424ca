//! Error types for `ferry-core`.
//!
//! Remote failures never show up here: the transport folds them into an
//! [`Envelope`](crate::remote::envelope::Envelope). `CoreError` is reserved
//! for local problems (bad input, unreadable config, a payload whose shape
//! does not match what the operation expects).

use std::path::PathBuf;

/// Unified error type for all local core failures.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A file or directory name is invalid (empty, contains path separators, etc.).
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// A successful response carried a payload of the wrong shape.
    #[error("unexpected {operation} payload: {reason}")]
    Payload {
        operation: &'static str,
        reason: String,
    },

    /// A request body could not be encoded.
    #[error("failed to encode request: {0}")]
    Encode(String),

    /// Failed to parse a TOML configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// The target path does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The process lacks permission to access the path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub(crate) fn payload(operation: &'static str, err: serde_json::Error) -> Self {
        Self::Payload {
            operation,
            reason: err.to_string(),
        }
    }
}

/// Convenience alias used throughout `ferry-core`.
pub type CoreResult<T> = Result<T, CoreError>;
