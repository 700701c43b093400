//! # Engine Crate
//!
//! Pure scoring over an in-memory candidate pool. Nothing here performs IO,
//! and the same inputs always produce the same ordered output.
//!
//! ## Components
//!
//! ### History Source
//! Genre affinity learned from the watch history:
//! - Genres of movies rated 4 or 5 are ranked by frequency
//! - Candidates earn `len - rank` per shared genre, scaled by `vote_average / 10`
//! - Watched movies are excluded, top 20 returned
//!
//! ### Similar Source
//! "More like this" for one movie: shared genres, rating proximity and
//! release-year proximity. Top 12 returned.
//!
//! ### Trending Source
//! Popularity plus a large bonus per favorite in a matching genre.
//!
//! ## Example Usage
//!
//! ```ignore
//! use engine::{recommend, similar_to};
//!
//! let picks = recommend(store.watch_history(), store.ratings(), index.movies());
//! let more = similar_to(index.get_movie(603), index.movies());
//! ```

pub mod history;
pub mod similar;
pub mod trending;
pub mod types;
pub mod user_context;

pub use history::HistorySource;
pub use similar::SimilarSource;
pub use trending::TrendingSource;
pub use types::{CandidateSource, ScoredMovie, UserContext, sort_by_score};
pub use user_context::{DEFAULT_LIKE_THRESHOLD, build_user_context};

use data_loader::{Movie, RatingsMap, WatchHistoryEntry};

/// Up to 20 history-based recommendations from `pool`
pub fn recommend(
    watch_history: &[WatchHistoryEntry],
    ratings: &RatingsMap,
    pool: &[Movie],
) -> Vec<ScoredMovie> {
    let context = build_user_context(watch_history, ratings, &[], DEFAULT_LIKE_THRESHOLD);
    HistorySource::new().get_candidates(&context, pool)
}

/// Up to 12 movies from `pool` most similar to `movie`
pub fn similar_to(movie: Option<&Movie>, pool: &[Movie]) -> Vec<ScoredMovie> {
    SimilarSource::new().get_candidates(movie, pool)
}

/// Reorder a trending pool by the user's favorite genres
pub fn reweight_by_affinity(
    trending: &[Movie],
    favorites: &[Movie],
    ratings: &RatingsMap,
) -> Vec<ScoredMovie> {
    let context = build_user_context(&[], ratings, favorites, DEFAULT_LIKE_THRESHOLD);
    TrendingSource::new().get_candidates(&context, trending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::MovieId;

    fn create_pool() -> Vec<Movie> {
        vec![
            Movie::new(2, "Action").with_genres(vec![28]).with_vote_average(8.0).with_popularity(40.0),
            Movie::new(3, "Documentary").with_genres(vec![99]).with_vote_average(9.0).with_popularity(80.0),
        ]
    }

    #[test]
    fn test_recommend_is_idempotent() {
        let watched_at = "2024-03-01T00:00:00Z".parse().unwrap();
        let history = vec![WatchHistoryEntry::new(
            Movie::new(1, "Liked").with_genres(vec![28, 12]),
            watched_at,
        )];
        let ratings: RatingsMap = [(1, 5)].into_iter().collect();
        let pool = create_pool();

        let first = recommend(&history, &ratings, &pool);
        let second = recommend(&history, &ratings, &pool);
        assert_eq!(first, second);
        assert_eq!(first[0].movie_id(), 2);
    }

    #[test]
    fn test_reweight_identity_passthrough() {
        let pool = create_pool();
        let reweighted = reweight_by_affinity(&pool, &[], &RatingsMap::new());

        let ids: Vec<MovieId> = reweighted.iter().map(|s| s.movie_id()).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_scored_movie_serializes_flat() {
        let scored = ScoredMovie::new(Movie::new(7, "Flat"), CandidateSource::Similar, 2.5);
        let value = serde_json::to_value(&scored).unwrap();

        assert_eq!(value["id"], 7);
        assert_eq!(value["title"], "Flat");
        assert_eq!(value["source"], "similar");
        assert_eq!(value["score"], 2.5);
    }
}
