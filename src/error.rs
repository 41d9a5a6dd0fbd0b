//! Error types for cotejar
//!
//! Only the edges of a benchmark run can fail as `Err`: loading and
//! validating configuration before the suite starts, and writing the
//! results artifact after it finishes. Everything that goes wrong while
//! talking to an endpoint is downgraded to data (a failed
//! [`BenchRecord`](crate::http_client::BenchRecord)) so that one broken
//! endpoint can never abort the run.

use thiserror::Error;

/// Error type for configuration and artifact I/O
#[derive(Debug, Error)]
pub enum CotejarError {
    /// File read/write failure
    #[error("I/O error: {message}")]
    IoError {
        /// What was being read or written, and the underlying error
        message: String,
    },

    /// Invalid or incomplete benchmark configuration
    #[error("invalid configuration: {reason}")]
    ConfigError {
        /// Why the configuration was rejected
        reason: String,
    },

    /// JSON serialization failure
    #[error("serialization error: {0}")]
    SerializationError(String),
}

/// Result type alias using [`CotejarError`]
pub type Result<T> = std::result::Result<T, CotejarError>;
