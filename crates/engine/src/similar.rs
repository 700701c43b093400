//! Similar Source - "more like this" for a single movie
//!
//! Each candidate (other than the movie itself) is scored as the sum of:
//! - `genre_weight` per genre shared with the movie
//! - `rating_base - |Δ vote_average|`, which goes negative for very
//!   different ratings
//! - `max(0, year_base - |Δ release year| * year_decay)`, only when both
//!   release dates parse; otherwise the term is 0

use crate::types::{CandidateSource, ScoredMovie, sort_by_score};
use data_loader::Movie;
use tracing::{debug, instrument};

/// Default number of similar movies returned
pub const DEFAULT_SIMILAR_LIMIT: usize = 12;

#[derive(Debug, Clone)]
pub struct SimilarSource {
    limit: usize,
    genre_weight: f64,
    rating_base: f64,
    year_base: f64,
    year_decay: f64,
}

impl SimilarSource {
    pub fn new() -> Self {
        Self {
            limit: DEFAULT_SIMILAR_LIMIT,
            genre_weight: 10.0,
            rating_base: 5.0,
            year_base: 10.0,
            year_decay: 0.5,
        }
    }

    /// Configure the number of similar movies (default: 12)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Configure the bonus per shared genre (default: 10.0)
    pub fn with_genre_weight(mut self, weight: f64) -> Self {
        self.genre_weight = weight;
        self
    }

    /// Rank `pool` by similarity to `movie`.
    ///
    /// An absent movie, or one without genres, yields an empty list.
    #[instrument(skip_all, fields(movie_id = movie.map(|m| m.id), pool = pool.len()))]
    pub fn get_candidates(&self, movie: Option<&Movie>, pool: &[Movie]) -> Vec<ScoredMovie> {
        let target = match movie {
            Some(m) if !m.genre_ids.is_empty() => m,
            Some(_) => {
                debug!("Target movie has no genres, no similar movies");
                return Vec::new();
            }
            None => return Vec::new(),
        };

        let target_year = target.release_year();

        let mut candidates: Vec<ScoredMovie> = pool
            .iter()
            .filter(|candidate| candidate.id != target.id)
            .map(|candidate| {
                let matched_genres: Vec<_> = candidate
                    .genre_ids
                    .iter()
                    .copied()
                    .filter(|g| target.genre_ids.contains(g))
                    .collect();

                let mut score = matched_genres.len() as f64 * self.genre_weight;
                score += self.rating_base - (candidate.vote_average() - target.vote_average()).abs();
                score += self.year_score(target_year, candidate.release_year());

                let mut scored = ScoredMovie::new(candidate.clone(), CandidateSource::Similar, score);
                scored.matched_genres = matched_genres;
                scored
            })
            .collect();

        sort_by_score(&mut candidates);
        candidates.truncate(self.limit);

        debug!("Found {} similar movies for {}", candidates.len(), target.id);
        candidates
    }

    fn year_score(&self, target: Option<i32>, candidate: Option<i32>) -> f64 {
        match (target, candidate) {
            (Some(a), Some(b)) => {
                let gap = (a - b).abs() as f64;
                (self.year_base - gap * self.year_decay).max(0.0)
            }
            _ => 0.0,
        }
    }
}

impl Default for SimilarSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::MovieId;

    fn ids(scored: &[ScoredMovie]) -> Vec<MovieId> {
        scored.iter().map(|s| s.movie_id()).collect()
    }

    #[test]
    fn test_scoring_terms() {
        let target = Movie::new(1, "Target")
            .with_genres(vec![28, 12])
            .with_vote_average(7.0)
            .with_release_date("2010-06-01");
        let pool = vec![
            target.clone(),
            // 2 shared genres, same rating, 4 years apart: 20 + 5 + 8
            Movie::new(2, "Close")
                .with_genres(vec![12, 28])
                .with_vote_average(7.0)
                .with_release_date("2014-01-01"),
            // no genres, rating 2 apart, no date: 0 + 3 + 0
            Movie::new(3, "Far").with_vote_average(9.0),
        ];

        let similar = SimilarSource::new().get_candidates(Some(&target), &pool);

        assert_eq!(ids(&similar), vec![2, 3]);
        assert!((similar[0].score - 33.0).abs() < 1e-9);
        assert!((similar[1].score - 3.0).abs() < 1e-9);
        assert_eq!(similar[0].matched_genres, vec![12, 28]);
        assert_eq!(similar[0].source, CandidateSource::Similar);
    }

    #[test]
    fn test_genre_weight() {
        let target = Movie::new(1, "Target")
            .with_genres(vec![28, 12])
            .with_vote_average(7.0)
            .with_release_date("2010-06-01");
        let pool = vec![
            Movie::new(2, "Close")
                .with_genres(vec![12, 28])
                .with_vote_average(7.0)
                .with_release_date("2014-01-01"),
            Movie::new(3, "Far").with_vote_average(9.0),
        ];

        // 2 shared genres at 1.0 each: 2 + 5 + 8
        let similar = SimilarSource::new()
            .with_genre_weight(1.0)
            .get_candidates(Some(&target), &pool);
        assert!((similar[0].score - 15.0).abs() < 1e-9);

        // Without the genre term only rating and year remain
        let similar = SimilarSource::new()
            .with_genre_weight(0.0)
            .get_candidates(Some(&target), &pool);
        assert_eq!(ids(&similar), vec![2, 3]);
        assert!((similar[0].score - 13.0).abs() < 1e-9);
        assert_eq!(similar[0].matched_genres, vec![12, 28]);
    }

    #[test]
    fn test_missing_date_contributes_zero() {
        let target = Movie::new(1, "Target").with_genres(vec![18]).with_vote_average(5.0);
        let pool = vec![Movie::new(2, "Dated")
            .with_genres(vec![18])
            .with_vote_average(5.0)
            .with_release_date("2010-01-01")];

        let similar = SimilarSource::new().get_candidates(Some(&target), &pool);
        assert!((similar[0].score - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_year_term_floors_at_zero() {
        let target = Movie::new(1, "Old")
            .with_genres(vec![18])
            .with_release_date("1950-01-01");
        let pool = vec![Movie::new(2, "New")
            .with_genres(vec![18])
            .with_release_date("2020-01-01")];

        let similar = SimilarSource::new().get_candidates(Some(&target), &pool);
        assert!((similar[0].score - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_rating_gap_can_go_negative() {
        let target = Movie::new(1, "Loved").with_genres(vec![18]).with_vote_average(9.5);
        let pool = vec![Movie::new(2, "Panned").with_vote_average(1.0)];

        let similar = SimilarSource::new().get_candidates(Some(&target), &pool);
        assert!(similar[0].score < 0.0);
    }

    #[test]
    fn test_excludes_self_and_caps_at_limit() {
        let target = Movie::new(1, "Target").with_genres(vec![35]);
        let pool: Vec<Movie> = (1..=30)
            .map(|id| Movie::new(id, format!("Comedy {}", id)).with_genres(vec![35]))
            .collect();

        let similar = SimilarSource::new().get_candidates(Some(&target), &pool);

        assert_eq!(similar.len(), 12);
        assert!(similar.iter().all(|s| s.movie_id() != 1));
        // equal scores keep pool order
        assert_eq!(similar[0].movie_id(), 2);
    }

    #[test]
    fn test_absent_or_genreless_movie() {
        let pool = vec![Movie::new(2, "Anything").with_genres(vec![35])];

        assert!(SimilarSource::new().get_candidates(None, &pool).is_empty());

        let bare = Movie::new(1, "Bare");
        assert!(SimilarSource::new().get_candidates(Some(&bare), &pool).is_empty());
    }
}
