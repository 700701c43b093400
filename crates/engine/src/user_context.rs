//! Helper functions to build a UserContext from the user's lists
//!
//! This module turns watch history, ratings and favorites into the
//! aggregates the sources score against.

use crate::types::UserContext;
use data_loader::{GenreId, Movie, RatingsMap, StarRating, WatchHistoryEntry};
use std::collections::HashMap;

/// Ratings at or above this make a history entry a "liked movie"
pub const DEFAULT_LIKE_THRESHOLD: StarRating = 4;

/// Build a UserContext from the user's lists
///
/// This function aggregates:
/// - Movies watched (every history entry)
/// - Liked movies (history entries rated >= `like_threshold`)
/// - Preferred genres (genre frequency across liked movies, most frequent first)
/// - Favorite genre counts (genre frequency across favorites)
pub fn build_user_context(
    watch_history: &[WatchHistoryEntry],
    ratings: &RatingsMap,
    favorites: &[Movie],
    like_threshold: StarRating,
) -> UserContext {
    let mut context = UserContext::new();
    context.history_len = watch_history.len();
    context.rated_count = ratings.len();
    context.favorite_count = favorites.len();

    let mut liked: Vec<&Movie> = Vec::new();
    for entry in watch_history {
        context.watched_movies.insert(entry.movie_id());

        let rating = ratings.get(&entry.movie_id()).copied().unwrap_or(0);
        if rating >= like_threshold {
            context.liked_movies.push(entry.movie_id());
            liked.push(&entry.movie);
        }
    }

    let (preferred_genres, genre_counts) = rank_genres(liked.iter().copied());
    context.preferred_genres = preferred_genres;
    context.genre_counts = genre_counts;
    context.favorite_genres = count_genres(favorites.iter());

    context
}

/// Count genre occurrences across movies
fn count_genres<'a>(movies: impl Iterator<Item = &'a Movie>) -> HashMap<GenreId, u32> {
    let mut counts: HashMap<GenreId, u32> = HashMap::new();
    for movie in movies {
        for &genre_id in &movie.genre_ids {
            *counts.entry(genre_id).or_insert(0) += 1;
        }
    }
    counts
}

/// Rank genres by descending frequency.
///
/// Equal frequencies keep the order in which genres were first seen
/// (history order, then each movie's genre order).
fn rank_genres<'a>(
    movies: impl Iterator<Item = &'a Movie>,
) -> (Vec<GenreId>, HashMap<GenreId, u32>) {
    let mut first_seen: Vec<GenreId> = Vec::new();
    let mut counts: HashMap<GenreId, u32> = HashMap::new();

    for movie in movies {
        for &genre_id in &movie.genre_ids {
            let count = counts.entry(genre_id).or_insert(0);
            if *count == 0 {
                first_seen.push(genre_id);
            }
            *count += 1;
        }
    }

    // Stable sort keeps first-seen order among equal counts
    first_seen.sort_by(|a, b| counts[b].cmp(&counts[a]));
    (first_seen, counts)
}
