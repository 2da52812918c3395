//! Error types shared by the ranking crates.
//!
//! Only two kinds of failure ever reach a caller:
//! - loading fixture data (missing files, malformed JSON, dangling references)
//! - invalid arguments to a scoring/recording call (a follow ratio outside
//!   (0, 1), a negative watch duration)
//!
//! Missing optional item fields are not errors; they score as empty sets.

use thiserror::Error;

/// Errors produced while loading data or validating ranking inputs
#[derive(Error, Debug)]
pub enum FeedError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A fixture file was not valid JSON for the expected shape
    #[error("Parse error in {file}: {reason}")]
    ParseError { file: String, reason: String },

    /// An argument was rejected before any scoring happened
    ///
    /// Callers map this to a client-facing 4xx-style response.
    #[error("Invalid value for {field}: {value}")]
    InvalidInput { field: String, value: String },

    /// Referenced entity doesn't exist (e.g., interaction for an unknown item)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: String },
}

impl FeedError {
    /// Shorthand for building an `InvalidInput` error.
    pub fn invalid_input(field: &str, value: impl ToString) -> Self {
        FeedError::InvalidInput {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// Convenience type alias for Results across the ranking crates
pub type Result<T> = std::result::Result<T, FeedError>;
