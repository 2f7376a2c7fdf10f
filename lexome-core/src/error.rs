//! Structured error types for the Lexome ecosystem.

use thiserror::Error;

/// Unified error type for all Lexome operations.
#[derive(Debug, Error)]
pub enum LexomeError {
    /// I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error (malformed input data)
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid input (bad arguments, shape mismatches, out-of-range values)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Catch-all for other errors
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the Lexome ecosystem.
pub type Result<T> = std::result::Result<T, LexomeError>;
