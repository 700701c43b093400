//! Error types for the data-loader crate.

use thiserror::Error;

/// Errors that can occur while loading a candidate pool or genre catalog
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Document couldn't be parsed
    ///
    /// `source_name` is the file (or label) the payload came from
    #[error("Parse error in {source_name}: {reason}")]
    ParseError { source_name: String, reason: String },

    /// A movie field had a value outside its documented domain
    #[error("Invalid value for {field} on movie {movie_id}: {value}")]
    InvalidValue {
        field: String,
        movie_id: u32,
        value: String,
    },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
