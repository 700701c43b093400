//! Shared types for the scoring sources.

use data_loader::{GenreId, Movie, MovieId};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Which source produced a scored movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateSource {
    /// Genre affinity from the user's liked watch history
    History,
    /// Similarity to a single movie
    Similar,
    /// Popularity reweighted by favorite genres
    Trending,
    /// Vote average, best rated first
    #[serde(rename = "top_rated")]
    TopRated,
}

/// A movie record with the score a source attached to it.
///
/// Serializes as the movie's own fields plus `score`, `source` and
/// `matched_genres`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMovie {
    #[serde(flatten)]
    pub movie: Movie,
    pub score: f64,
    pub source: CandidateSource,
    /// Genres that contributed to the score
    pub matched_genres: Vec<GenreId>,
}

impl ScoredMovie {
    pub fn new(movie: Movie, source: CandidateSource, score: f64) -> Self {
        Self {
            movie,
            score,
            source,
            matched_genres: Vec::new(),
        }
    }

    pub fn movie_id(&self) -> MovieId {
        self.movie.id
    }
}

/// Sort by score, highest first.
///
/// The sort is stable: equal scores keep their input (pool) order.
pub fn sort_by_score(scored: &mut [ScoredMovie]) {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// What the sources know about the user, gathered once per request.
#[derive(Debug, Clone, Default)]
pub struct UserContext {
    /// Ids of every movie in the watch history
    pub watched_movies: HashSet<MovieId>,

    /// History movies rated at or above the like threshold, newest first
    pub liked_movies: Vec<MovieId>,

    /// Genres of liked movies by descending frequency
    pub preferred_genres: Vec<GenreId>,

    /// How often each preferred genre occurs across liked movies
    pub genre_counts: HashMap<GenreId, u32>,

    /// How often each genre occurs across favorites
    pub favorite_genres: HashMap<GenreId, u32>,

    pub history_len: usize,
    pub rated_count: usize,
    pub favorite_count: usize,
}

impl UserContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rank of a genre in `preferred_genres` (0 = most liked)
    pub fn genre_rank(&self, genre_id: GenreId) -> Option<usize> {
        self.preferred_genres.iter().position(|&g| g == genre_id)
    }

    /// The user's top N preferred genres
    pub fn top_genres(&self, n: usize) -> Vec<GenreId> {
        self.preferred_genres.iter().take(n).copied().collect()
    }

    /// Rank-weighted genre affinity before any rating multiplier.
    ///
    /// Each genre shared with `preferred_genres` adds
    /// `len(preferred_genres) - rank`, so the most liked genre weighs most.
    pub fn affinity_score(&self, genre_ids: &[GenreId]) -> u32 {
        let total = self.preferred_genres.len();
        genre_ids
            .iter()
            .filter_map(|&g| self.genre_rank(g))
            .map(|rank| (total - rank) as u32)
            .sum()
    }

    /// No liked movies means no basis for history recommendations
    pub fn has_liked_movies(&self) -> bool {
        !self.liked_movies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affinity_score_is_monotonic_in_rank() {
        let mut context = UserContext::new();
        context.preferred_genres = vec![28, 12, 35];

        let rank_0 = context.affinity_score(&[28]);
        let rank_1 = context.affinity_score(&[12]);
        let rank_2 = context.affinity_score(&[35]);

        assert_eq!(rank_0, 3);
        assert_eq!(rank_1, 2);
        assert_eq!(rank_2, 1);
        assert_eq!(context.affinity_score(&[28, 35, 99]), 4);
        assert_eq!(context.affinity_score(&[]), 0);
    }

    #[test]
    fn test_sort_by_score_is_stable() {
        let mut scored = vec![
            ScoredMovie::new(Movie::new(1, "a"), CandidateSource::History, 1.0),
            ScoredMovie::new(Movie::new(2, "b"), CandidateSource::History, 2.0),
            ScoredMovie::new(Movie::new(3, "c"), CandidateSource::History, 1.0),
        ];
        sort_by_score(&mut scored);

        let ids: Vec<MovieId> = scored.iter().map(|s| s.movie_id()).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }
}
