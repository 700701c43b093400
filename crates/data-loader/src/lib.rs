//! # Data Loader Crate
//!
//! This crate holds the movie records the rest of the workspace operates on
//! and loads an already-fetched candidate pool from disk.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Movie, GenreCatalog, WatchHistoryEntry, RatingsMap)
//! - **parser**: Parse provider JSON payloads into Rust structs
//! - **index**: MovieIndex for lookups by id and title, plus trending and top-rated rails
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::MovieIndex;
//! use std::path::Path;
//!
//! let index = MovieIndex::load_from_files(Path::new("data/tmdb"))?;
//!
//! let movie = index.get_movie(603).unwrap();
//! println!("{} [{}]", movie.title, index.catalog().describe(&movie.genre_ids, 3));
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use index::MovieIndex;
pub use types::{
    // Type aliases
    MovieId,
    GenreId,
    StarRating,
    RatingsMap,
    // Core types
    Movie,
    Genre,
    GenreCatalog,
    WatchHistoryEntry,
};
