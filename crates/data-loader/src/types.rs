//! Core domain types for movie discovery.
//!
//! This module defines the records shared by every other crate:
//! - Type aliases for domain clarity (MovieId, GenreId, StarRating)
//! - The movie record as delivered by the metadata provider
//! - The genre catalog used for display names
//! - Watch history entries and the ratings map persisted per user

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique, stable identifier of a movie in the metadata provider
pub type MovieId = u32;

/// Identifier of a genre (e.g. 28 = Action in TMDB)
pub type GenreId = u32;

/// A user's star rating, expected in 1..=5
pub type StarRating = u8;

/// Movie id -> star rating. A later rating for the same id overwrites the former.
///
/// BTreeMap keeps the persisted JSON stable between saves.
pub type RatingsMap = BTreeMap<MovieId, StarRating>;

// =============================================================================
// Movie
// =============================================================================

/// A movie record.
///
/// Only `id` is required. Every optional field has a documented zero value
/// that scoring code falls back to:
/// - `genre_ids`: empty (absent or `null` both load as empty)
/// - `popularity`: 0.0, see [`Movie::popularity`]
/// - `vote_average`: 0.0, see [`Movie::vote_average`]
/// - `release_date`: no year, see [`Movie::release_year`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre_ids: Vec<GenreId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    /// ISO date string (`YYYY-MM-DD`) as sent by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
}

impl Movie {
    /// Create a bare movie with only an id and title
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            genre_ids: Vec::new(),
            popularity: None,
            vote_average: None,
            release_date: None,
            overview: None,
            poster_path: None,
            backdrop_path: None,
        }
    }

    pub fn with_genres(mut self, genre_ids: impl Into<Vec<GenreId>>) -> Self {
        self.genre_ids = genre_ids.into();
        self
    }

    pub fn with_popularity(mut self, popularity: f64) -> Self {
        self.popularity = Some(popularity);
        self
    }

    pub fn with_vote_average(mut self, vote_average: f64) -> Self {
        self.vote_average = Some(vote_average);
        self
    }

    pub fn with_release_date(mut self, release_date: impl Into<String>) -> Self {
        self.release_date = Some(release_date.into());
        self
    }

    /// Popularity, or 0.0 when the provider omitted it
    pub fn popularity(&self) -> f64 {
        self.popularity.unwrap_or(0.0)
    }

    /// Vote average in [0, 10], or 0.0 when the provider omitted it
    pub fn vote_average(&self) -> f64 {
        self.vote_average.unwrap_or(0.0)
    }

    /// Release date, if present and parseable
    pub fn release(&self) -> Option<NaiveDate> {
        self.release_date.as_deref().and_then(parse_release_date)
    }

    /// Year extracted from the release date
    ///
    /// Example: "1999-03-31" -> Some(1999)
    ///          "" or None    -> None
    pub fn release_year(&self) -> Option<i32> {
        self.release().map(|date| date.year())
    }
}

/// Parse `YYYY-MM-DD`, or a bare `YYYY` (treated as January 1st).
pub fn parse_release_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if raw.len() == 4 {
        let year = raw.parse::<i32>().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }
    None
}

/// Deserialize `null` the same way as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Genres
// =============================================================================

/// One entry of the provider's genre list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

/// Mapping from genre id to display name.
///
/// Only presentation uses this; the scoring engine works on raw ids.
#[derive(Debug, Clone, Default)]
pub struct GenreCatalog {
    /// Genres in provider order
    genres: Vec<Genre>,
    names: HashMap<GenreId, usize>,
}

impl GenreCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a genre, replacing the name of an existing id
    pub fn insert(&mut self, genre: Genre) {
        match self.names.get(&genre.id) {
            Some(&pos) => self.genres[pos] = genre,
            None => {
                self.names.insert(genre.id, self.genres.len());
                self.genres.push(genre);
            }
        }
    }

    /// Display name for a genre id
    pub fn name(&self, id: GenreId) -> Option<&str> {
        self.names.get(&id).map(|&pos| self.genres[pos].name.as_str())
    }

    /// Join the names of at most `max` known genres with ", ".
    ///
    /// Unknown ids are skipped and do not count towards `max`.
    pub fn describe(&self, ids: &[GenreId], max: usize) -> String {
        ids.iter()
            .filter_map(|&id| self.name(id))
            .take(max)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    pub fn len(&self) -> usize {
        self.genres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }
}

impl FromIterator<Genre> for GenreCatalog {
    fn from_iter<I: IntoIterator<Item = Genre>>(iter: I) -> Self {
        let mut catalog = GenreCatalog::new();
        for genre in iter {
            catalog.insert(genre);
        }
        catalog
    }
}

// =============================================================================
// Watch History
// =============================================================================

/// A movie the user watched, stamped when it entered the history.
///
/// Serialized as the movie's own fields plus `watchedAt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchHistoryEntry {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(rename = "watchedAt")]
    pub watched_at: DateTime<Utc>,
}

impl WatchHistoryEntry {
    pub fn new(movie: Movie, watched_at: DateTime<Utc>) -> Self {
        Self { movie, watched_at }
    }

    pub fn movie_id(&self) -> MovieId {
        self.movie.id
    }
}
