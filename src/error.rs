//! Error types for the docsift library.

use thiserror::Error;

/// Main error type for the docsift library.
///
/// The rule-based parser itself is total: `parse` returns a record for any
/// UTF-8 input and never constructs one of these. The error type exists for
/// the surfaces around the core, chiefly the enhancement seam.
#[derive(Error, Debug)]
pub enum SiftError {
    /// An enhancement provider failed. Callers treat this as non-fatal and
    /// keep the rule-based record.
    #[error("enhancement failed: {0}")]
    Enhancement(String),

    /// Serialization to or from the wire shape failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for the docsift library.
pub type Result<T> = std::result::Result<T, SiftError>;
