//! Error types for the preferences crate.

use data_loader::{MovieId, StarRating};
use thiserror::Error;

/// Errors surfaced by the preference store and its storage backends
#[derive(Error, Debug)]
pub enum PreferenceError {
    /// A rating outside 1..=5 under the `Reject` policy
    #[error("Invalid argument: rating {rating} for movie {movie_id} is outside 1..=5")]
    InvalidArgument { movie_id: MovieId, rating: StarRating },

    /// The storage backend refused a read or write (quota, permissions, ...)
    #[error("Storage error for '{key}': {reason}")]
    Storage { key: String, reason: String },

    /// A collection couldn't be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, PreferenceError>;
