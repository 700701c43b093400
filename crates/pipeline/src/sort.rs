//! Display orderings for a scored list.
//!
//! Every ordering is a stable sort, so ties keep their score order.

use data_loader::Movie;
use engine::ScoredMovie;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Most popular first
    Popularity,
    /// Highest vote average first
    Rating,
    /// Newest first; movies without a release date go last
    ReleaseDate,
    /// A-Z, ignoring case
    Title,
}

impl SortBy {
    pub const ALL: [SortBy; 4] = [
        SortBy::Popularity,
        SortBy::Rating,
        SortBy::ReleaseDate,
        SortBy::Title,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Popularity => "popularity",
            SortBy::Rating => "rating",
            SortBy::ReleaseDate => "release_date",
            SortBy::Title => "title",
        }
    }

    /// Compare two movies under this ordering
    pub fn compare(&self, a: &Movie, b: &Movie) -> Ordering {
        match self {
            SortBy::Popularity => b.popularity().total_cmp(&a.popularity()),
            SortBy::Rating => b.vote_average().total_cmp(&a.vote_average()),
            SortBy::ReleaseDate => match (a.release(), b.release()) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortBy::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        SortBy::ALL
            .into_iter()
            .find(|mode| mode.as_str() == wanted)
            .ok_or_else(|| anyhow::anyhow!("Unknown sort mode: {}", s))
    }
}

/// Sort scored movies in place by `sort_by`
pub fn sort_movies(movies: &mut [ScoredMovie], sort_by: SortBy) {
    movies.sort_by(|a, b| sort_by.compare(&a.movie, &b.movie));
}
