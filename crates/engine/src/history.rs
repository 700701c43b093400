//! History Source - content-based recommendations from liked movies
//!
//! Scores a candidate pool by genre affinity:
//! "You liked these genres, here is more of them"
//!
//! ## Algorithm
//! 1. Liked movies = watch history entries rated >= 4 (see `UserContext`)
//! 2. Rank the genres of liked movies by frequency -> preferred genres
//! 3. For each candidate, sum `len(preferred) - rank` over shared genres
//! 4. Multiply by `vote_average / 10` to favour well-rated candidates
//! 5. Drop candidates already in the watch history
//! 6. Sort by score (stable) and keep the top 20
//!
//! A candidate with no shared genre scores 0 and is still returned when
//! there is room for it.

use crate::types::{CandidateSource, ScoredMovie, UserContext, sort_by_score};
use data_loader::Movie;
use tracing::{debug, instrument};

/// Default number of history recommendations
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// History source scores a pool against the user's genre affinity
#[derive(Debug, Clone)]
pub struct HistorySource {
    /// Maximum number of recommendations returned
    limit: usize,
}

impl HistorySource {
    pub fn new() -> Self {
        Self {
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Configure the number of recommendations (default: 20)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Score, filter and rank `pool` for this user.
    ///
    /// Returns an empty list when the user has no liked movies; that is the
    /// expected answer for a new profile, not an error.
    #[instrument(skip_all, fields(pool = pool.len(), liked = user_context.liked_movies.len()))]
    pub fn get_candidates(&self, user_context: &UserContext, pool: &[Movie]) -> Vec<ScoredMovie> {
        if user_context.history_len == 0 && user_context.rated_count == 0 {
            debug!("No history and no ratings, nothing to recommend");
            return Vec::new();
        }
        if !user_context.has_liked_movies() {
            debug!("No liked movies in history, nothing to recommend");
            return Vec::new();
        }

        debug!(
            "Scoring {} candidates against {} preferred genres",
            pool.len(),
            user_context.preferred_genres.len()
        );

        let mut candidates: Vec<ScoredMovie> = pool
            .iter()
            .filter(|movie| !user_context.watched_movies.contains(&movie.id))
            .map(|movie| self.score(user_context, movie))
            .collect();

        sort_by_score(&mut candidates);
        candidates.truncate(self.limit);

        debug!("Generated {} history recommendations", candidates.len());
        candidates
    }

    fn score(&self, user_context: &UserContext, movie: &Movie) -> ScoredMovie {
        let affinity = user_context.affinity_score(&movie.genre_ids);
        let score = affinity as f64 * (movie.vote_average() / 10.0);

        let mut scored = ScoredMovie::new(movie.clone(), CandidateSource::History, score);
        scored.matched_genres = movie
            .genre_ids
            .iter()
            .copied()
            .filter(|&g| user_context.genre_rank(g).is_some())
            .collect();
        scored
    }
}

impl Default for HistorySource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user_context::{DEFAULT_LIKE_THRESHOLD, build_user_context};
    use data_loader::{MovieId, RatingsMap, WatchHistoryEntry};

    fn entry(movie: Movie) -> WatchHistoryEntry {
        let watched_at = "2024-01-01T00:00:00Z".parse().unwrap();
        WatchHistoryEntry::new(movie, watched_at)
    }

    fn context_for(history: &[WatchHistoryEntry], ratings: &RatingsMap) -> UserContext {
        build_user_context(history, ratings, &[], DEFAULT_LIKE_THRESHOLD)
    }

    #[test]
    fn test_worked_example() {
        let history = vec![entry(Movie::new(1, "Liked").with_genres(vec![28, 12]))];
        let ratings: RatingsMap = [(1, 5)].into_iter().collect();
        let pool = vec![
            Movie::new(2, "Action").with_genres(vec![28]).with_vote_average(8.0),
            Movie::new(3, "Documentary").with_genres(vec![99]).with_vote_average(9.0),
        ];

        let context = context_for(&history, &ratings);
        assert_eq!(context.preferred_genres, vec![28, 12]);

        let recommended = HistorySource::new().get_candidates(&context, &pool);

        let ids: Vec<MovieId> = recommended.iter().map(|s| s.movie_id()).collect();
        assert_eq!(ids, vec![2, 3]);
        assert!((recommended[0].score - 1.6).abs() < 1e-9);
        assert_eq!(recommended[0].matched_genres, vec![28]);
        assert_eq!(recommended[1].score, 0.0);
        assert_eq!(recommended[0].source, CandidateSource::History);
    }

    #[test]
    fn test_tied_genres_rank_in_first_seen_order() {
        let history = vec![entry(Movie::new(1, "Sci-fi Horror").with_genres(vec![878, 27]))];
        let ratings: RatingsMap = [(1, 5)].into_iter().collect();
        let pool = vec![
            Movie::new(2, "Horror").with_genres(vec![27]).with_vote_average(10.0),
            Movie::new(3, "Sci-fi").with_genres(vec![878]).with_vote_average(10.0),
        ];

        let recommended = HistorySource::new().get_candidates(&context_for(&history, &ratings), &pool);

        // 878 was listed first, so it outranks the lower id 27
        let ids: Vec<MovieId> = recommended.iter().map(|s| s.movie_id()).collect();
        assert_eq!(ids, vec![3, 2]);
        assert!((recommended[0].score - 2.0).abs() < 1e-9);
        assert!((recommended[1].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_excludes_watched_and_caps_at_limit() {
        let history = vec![
            entry(Movie::new(1, "Seen").with_genres(vec![18])),
            entry(Movie::new(2, "Also seen").with_genres(vec![18])),
        ];
        let ratings: RatingsMap = [(1, 4)].into_iter().collect();
        let mut pool: Vec<Movie> = (1..=40)
            .map(|id| Movie::new(id, format!("Drama {}", id)).with_genres(vec![18]).with_vote_average(7.0))
            .collect();
        pool.push(Movie::new(2, "Also seen").with_genres(vec![18]).with_vote_average(10.0));

        let recommended = HistorySource::new().get_candidates(&context_for(&history, &ratings), &pool);

        assert_eq!(recommended.len(), 20);
        assert!(recommended.iter().all(|s| s.movie_id() != 1 && s.movie_id() != 2));
    }

    #[test]
    fn test_empty_without_liked_movies() {
        let history = vec![entry(Movie::new(1, "Meh").with_genres(vec![28]))];
        let pool = vec![Movie::new(2, "Action").with_genres(vec![28]).with_vote_average(8.0)];

        let ratings: RatingsMap = [(1, 3)].into_iter().collect();
        assert!(HistorySource::new().get_candidates(&context_for(&history, &ratings), &pool).is_empty());

        assert!(HistorySource::new().get_candidates(&context_for(&history, &RatingsMap::new()), &pool).is_empty());
        assert!(HistorySource::new().get_candidates(&context_for(&[], &RatingsMap::new()), &pool).is_empty());
    }

    #[test]
    fn test_equal_scores_keep_pool_order() {
        let history = vec![entry(Movie::new(1, "Liked").with_genres(vec![35]))];
        let ratings: RatingsMap = [(1, 5)].into_iter().collect();
        let pool = vec![
            Movie::new(10, "First").with_genres(vec![35]).with_vote_average(6.0),
            Movie::new(11, "Second").with_genres(vec![35]).with_vote_average(6.0),
            Movie::new(12, "Better").with_genres(vec![35]).with_vote_average(9.0),
        ];

        let recommended = HistorySource::new().get_candidates(&context_for(&history, &ratings), &pool);
        let ids: Vec<MovieId> = recommended.iter().map(|s| s.movie_id()).collect();
        assert_eq!(ids, vec![12, 10, 11]);
    }

    #[test]
    fn test_missing_vote_average_scores_zero() {
        let history = vec![entry(Movie::new(1, "Liked").with_genres(vec![35]))];
        let ratings: RatingsMap = [(1, 5)].into_iter().collect();
        let pool = vec![Movie::new(10, "Unvoted").with_genres(vec![35])];

        let recommended = HistorySource::new()
            .with_limit(5)
            .get_candidates(&context_for(&history, &ratings), &pool);
        assert_eq!(recommended.len(), 1);
        assert_eq!(recommended[0].score, 0.0);
    }
}
