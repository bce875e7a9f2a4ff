//! Error types for the ACMI telemetry client.
//!
//! All fatal conditions funnel into [`AcmiError`]. Field-level decode
//! problems (bad numerals, malformed coordinate tuples, unknown aliases)
//! are deliberately *not* errors: the wire format is loosely specified and
//! forward compatibility requires skipping what we cannot interpret. Those
//! outcomes are reported through [`crate::object::FieldOutcome`] and the
//! tracing log instead.
//!
//! ## Error Categories
//!
//! - **Connection**: DNS resolution or TCP connect failures
//! - **Handshake**: the host rejected the session (no handshake lines)
//! - **Transport**: mid-stream socket read/write failures
//! - **Parse**: structural failures in contexts that must parse
//! - **Timeout**: a bounded operation exceeded its deadline
//! - **Closed**: the session ended and the client is no longer usable

use std::time::Duration;
use thiserror::Error;

/// Result type alias for telemetry operations.
pub type Result<T, E = AcmiError> = std::result::Result<T, E>;

/// Main error type for ACMI client operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AcmiError {
    #[error("Failed to connect to telemetry host: {reason}")]
    Connection {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Handshake failed: {reason}")]
    Handshake { reason: String },

    #[error("Transport error during {context}")]
    Transport {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("Session closed")]
    Closed,
}

impl AcmiError {
    /// Returns whether this error is potentially recoverable by building a
    /// fresh client. The crate itself never retries; that call belongs to
    /// the owner of the session.
    pub fn is_retryable(&self) -> bool {
        match self {
            AcmiError::Connection { .. } => true,
            AcmiError::Transport { .. } => true,
            AcmiError::Timeout { .. } => true,
            AcmiError::Closed => true,
            AcmiError::Handshake { .. } => false,
            AcmiError::Parse { .. } => false,
        }
    }

    /// Helper constructor for connection errors.
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        AcmiError::Connection { reason: reason.into(), source: None }
    }

    /// Helper constructor for connection errors with source.
    pub fn connection_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        AcmiError::Connection { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for handshake rejections.
    pub fn handshake_failed(reason: impl Into<String>) -> Self {
        AcmiError::Handshake { reason: reason.into() }
    }

    /// Helper constructor for transport errors with context.
    pub fn transport(context: impl Into<String>, source: std::io::Error) -> Self {
        AcmiError::Transport { context: context.into(), source }
    }

    /// Helper constructor for parse errors.
    pub fn parse_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        AcmiError::Parse { context: context.into(), details: details.into() }
    }
}

impl From<std::io::Error> for AcmiError {
    fn from(err: std::io::Error) -> Self {
        AcmiError::Transport { context: "socket I/O".to_string(), source: err }
    }
}
