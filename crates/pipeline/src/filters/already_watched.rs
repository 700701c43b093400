//! Filter to remove movies the user has already watched.
//!
//! The history source excludes watched movies on its own; this filter is
//! for the rails that do not (similar, trending) when the caller asks to
//! hide them.

use crate::traits::Filter;
use anyhow::Result;
use engine::{ScoredMovie, UserContext};

/// Removes movies present in the user's watch history.
///
/// ## Algorithm
/// Uses the HashSet in UserContext.watched_movies for O(1) lookups.
pub struct AlreadyWatchedFilter;

impl Filter for AlreadyWatchedFilter {
    fn name(&self) -> &str {
        "AlreadyWatchedFilter"
    }

    fn apply(&self, movies: Vec<ScoredMovie>, context: &UserContext) -> Result<Vec<ScoredMovie>> {
        let filtered: Vec<ScoredMovie> = movies
            .into_iter()
            .filter(|scored| !context.watched_movies.contains(&scored.movie_id()))
            .collect();
        Ok(filtered)
    }
}
