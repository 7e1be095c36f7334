//! Error types for jobfeed.
//!
//! Library crates use [`JobFeedError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all jobfeed operations.
#[derive(Debug, thiserror::Error)]
pub enum JobFeedError {
    /// Configuration loading or validation error (missing credential, bad config file).
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level HTTP failure (connect, timeout, client construction).
    #[error("network error: {0}")]
    Network(String),

    /// The upstream API answered with a non-success status.
    #[error("upstream error: HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Response body could not be decoded.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, JobFeedError>;

/// Longest upstream body excerpt kept in an [`JobFeedError::Upstream`].
const MAX_BODY_EXCERPT: usize = 300;

impl JobFeedError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create an upstream error, keeping only the head of the response body.
    pub fn upstream(status: u16, body: &str) -> Self {
        let body = match body.char_indices().nth(MAX_BODY_EXCERPT) {
            Some((idx, _)) => format!("{}...", &body[..idx]),
            None => body.to_string(),
        };
        Self::Upstream { status, body }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the pipeline may continue with an empty result set after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Upstream { .. } | Self::Parse { .. }
        )
    }
}
