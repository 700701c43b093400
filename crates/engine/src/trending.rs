//! Trending Source - popularity reweighted by favorite genres
//!
//! `score = popularity + Σ favorite_genres[g] * affinity_weight` over the
//! candidate's genres. With the default weight of 100, one favorite in a
//! genre outweighs most raw popularity differences. The weight is a
//! tuning constant.
//!
//! A user with no favorites and no ratings gets the pool back untouched.

use crate::types::{CandidateSource, ScoredMovie, UserContext, sort_by_score};
use data_loader::Movie;
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
pub struct TrendingSource {
    affinity_weight: f64,
}

impl TrendingSource {
    pub fn new() -> Self {
        Self {
            affinity_weight: 100.0,
        }
    }

    /// Configure the bonus per favorite in a matching genre (default: 100.0)
    pub fn with_affinity_weight(mut self, weight: f64) -> Self {
        self.affinity_weight = weight;
        self
    }

    #[instrument(skip_all, fields(pool = pool.len(), favorites = user_context.favorite_count))]
    pub fn get_candidates(&self, user_context: &UserContext, pool: &[Movie]) -> Vec<ScoredMovie> {
        if user_context.favorite_count == 0 && user_context.rated_count == 0 {
            debug!("No favorites or ratings, keeping trending order");
            return pool
                .iter()
                .map(|movie| ScoredMovie::new(movie.clone(), CandidateSource::Trending, movie.popularity()))
                .collect();
        }

        let mut candidates: Vec<ScoredMovie> = pool
            .iter()
            .map(|movie| {
                let mut bonus = 0.0;
                let mut matched_genres = Vec::new();
                for genre_id in &movie.genre_ids {
                    if let Some(&count) = user_context.favorite_genres.get(genre_id) {
                        bonus += count as f64 * self.affinity_weight;
                        matched_genres.push(*genre_id);
                    }
                }

                let mut scored =
                    ScoredMovie::new(movie.clone(), CandidateSource::Trending, movie.popularity() + bonus);
                scored.matched_genres = matched_genres;
                scored
            })
            .collect();

        sort_by_score(&mut candidates);
        candidates
    }
}

impl Default for TrendingSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user_context::{DEFAULT_LIKE_THRESHOLD, build_user_context};
    use data_loader::{MovieId, RatingsMap};

    fn create_pool() -> Vec<Movie> {
        vec![
            Movie::new(1, "Low").with_genres(vec![99]).with_popularity(10.0),
            Movie::new(2, "Blockbuster").with_genres(vec![28]).with_popularity(900.0),
            Movie::new(3, "Horror").with_genres(vec![27]).with_popularity(50.0),
        ]
    }

    fn ids(scored: &[ScoredMovie]) -> Vec<MovieId> {
        scored.iter().map(|s| s.movie_id()).collect()
    }

    #[test]
    fn test_passthrough_without_preferences() {
        let context = build_user_context(&[], &RatingsMap::new(), &[], DEFAULT_LIKE_THRESHOLD);
        let trending = TrendingSource::new().get_candidates(&context, &create_pool());

        assert_eq!(ids(&trending), vec![1, 2, 3]);
        assert_eq!(trending[1].score, 900.0);
    }

    #[test]
    fn test_favorite_genres_dominate_popularity() {
        let favorites: Vec<Movie> = (0..10)
            .map(|i| Movie::new(100 + i, "Slasher").with_genres(vec![27]))
            .collect();
        let context = build_user_context(&[], &RatingsMap::new(), &favorites, DEFAULT_LIKE_THRESHOLD);

        let trending = TrendingSource::new().get_candidates(&context, &create_pool());

        assert_eq!(ids(&trending), vec![3, 2, 1]);
        assert_eq!(trending[0].score, 1050.0);
        assert_eq!(trending[0].matched_genres, vec![27]);
    }

    #[test]
    fn test_affinity_weight() {
        let favorites: Vec<Movie> = (0..10)
            .map(|i| Movie::new(100 + i, "Slasher").with_genres(vec![27]))
            .collect();
        let context = build_user_context(&[], &RatingsMap::new(), &favorites, DEFAULT_LIKE_THRESHOLD);

        // 10 favorites at 1.0 each no longer beat the blockbuster
        let trending = TrendingSource::new()
            .with_affinity_weight(1.0)
            .get_candidates(&context, &create_pool());

        assert_eq!(ids(&trending), vec![2, 3, 1]);
        assert_eq!(trending[1].score, 60.0);
        assert_eq!(trending[1].matched_genres, vec![27]);
    }

    #[test]
    fn test_ratings_only_sorts_by_popularity() {
        let ratings: RatingsMap = [(42, 3)].into_iter().collect();
        let context = build_user_context(&[], &ratings, &[], DEFAULT_LIKE_THRESHOLD);

        let trending = TrendingSource::new().get_candidates(&context, &create_pool());
        assert_eq!(ids(&trending), vec![2, 3, 1]);
    }
}
