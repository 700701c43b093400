//! Filter implementations for the presentation pipeline.
//!
//! This module contains all the concrete filter implementations
//! that can be composed into a FilterPipeline.

pub mod already_watched;
pub mod genre;

// Re-export for convenience
pub use already_watched::AlreadyWatchedFilter;
pub use genre::SelectedGenresFilter;
