//! Core traits for the presentation pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to scored movies.

use anyhow::Result;
use engine::{ScoredMovie, UserContext};

/// Core trait for filtering scored movies.
///
/// Filters take ownership of the list and return what survives, in the
/// same relative order. Reordering is the job of [`crate::SortBy`].
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a list of scored movies.
    ///
    /// # Arguments
    /// * `movies` - The scored movies to filter (takes ownership)
    /// * `context` - User context built from the preference store
    fn apply(&self, movies: Vec<ScoredMovie>, context: &UserContext) -> Result<Vec<ScoredMovie>>;
}
