//! Filter to keep only movies in the genres the user picked.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::GenreId;
use engine::{ScoredMovie, UserContext};

/// Keeps movies that share at least one genre with the selection.
///
/// An empty selection keeps everything.
pub struct SelectedGenresFilter {
    selected: Vec<GenreId>,
}

impl SelectedGenresFilter {
    pub fn new(selected: impl Into<Vec<GenreId>>) -> Self {
        Self {
            selected: selected.into(),
        }
    }
}

impl Filter for SelectedGenresFilter {
    fn name(&self) -> &str {
        "SelectedGenresFilter"
    }

    fn apply(&self, movies: Vec<ScoredMovie>, _context: &UserContext) -> Result<Vec<ScoredMovie>> {
        if self.selected.is_empty() {
            return Ok(movies);
        }

        let filtered: Vec<ScoredMovie> = movies
            .into_iter()
            .filter(|scored| {
                scored
                    .movie
                    .genre_ids
                    .iter()
                    .any(|genre| self.selected.contains(genre))
            })
            .collect();
        Ok(filtered)
    }
}
