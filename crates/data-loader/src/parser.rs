//! Parser for metadata-provider payloads.
//!
//! This module handles the two JSON documents the loader reads:
//! - movie pages: `{"page": 1, "results": [movie, ...]}` or a bare array
//! - genre lists: `{"genres": [{"id": 28, "name": "Action"}, ...]}` or a bare array

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum GenrePayload {
    Wrapped { genres: Vec<Genre> },
    List(Vec<Genre>),
}

/// Read a whole file, mapping a missing file to `FileNotFound`
fn read_to_string(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(fs::read_to_string(path)?)
}

fn parse_error(source_name: &str, reason: impl ToString) -> DataLoadError {
    DataLoadError::ParseError {
        source_name: source_name.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a movie page payload.
///
/// A page object (popular, trending, ...) carries its movies under
/// `results`; a bare array is the list itself. `source_name` only labels
/// errors.
pub fn parse_movie_page(payload: &str, source_name: &str) -> Result<Vec<Movie>> {
    let value: Value = serde_json::from_str(payload).map_err(|e| parse_error(source_name, e))?;

    let list = match value {
        Value::Object(mut page) => page
            .remove("results")
            .ok_or_else(|| parse_error(source_name, "page has no `results` field"))?,
        list @ Value::Array(_) => list,
        _ => {
            return Err(parse_error(
                source_name,
                "expected a page with `results` or an array of movies",
            ));
        }
    };

    let movies: Vec<Movie> =
        serde_json::from_value(list).map_err(|e| parse_error(source_name, e))?;

    for movie in &movies {
        validate_movie(movie)?;
    }
    Ok(movies)
}

/// Parse a genre list payload
pub fn parse_genre_list(payload: &str, source_name: &str) -> Result<GenreCatalog> {
    let parsed: GenrePayload =
        serde_json::from_str(payload).map_err(|e| parse_error(source_name, e))?;

    let genres = match parsed {
        GenrePayload::Wrapped { genres } => genres,
        GenrePayload::List(genres) => genres,
    };
    Ok(genres.into_iter().collect())
}

/// Parse the movies file
pub fn parse_movies(path: &Path) -> Result<Vec<Movie>> {
    let payload = read_to_string(path)?;
    parse_movie_page(&payload, &path.display().to_string())
}

/// Parse the genres file
pub fn parse_genres(path: &Path) -> Result<GenreCatalog> {
    let payload = read_to_string(path)?;
    parse_genre_list(&payload, &path.display().to_string())
}

/// Check numeric fields against their documented domains
///
/// - vote_average must lie in [0, 10]
/// - popularity must be non-negative
fn validate_movie(movie: &Movie) -> Result<()> {
    if let Some(vote) = movie.vote_average {
        if !(0.0..=10.0).contains(&vote) {
            return Err(DataLoadError::InvalidValue {
                field: "vote_average".to_string(),
                movie_id: movie.id,
                value: vote.to_string(),
            });
        }
    }
    if let Some(popularity) = movie.popularity {
        if popularity < 0.0 || popularity.is_nan() {
            return Err(DataLoadError::InvalidValue {
                field: "popularity".to_string(),
                movie_id: movie.id,
                value: popularity.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page() {
        let payload = r#"{
            "page": 1,
            "results": [
                {"id": 603, "title": "The Matrix", "genre_ids": [28, 878],
                 "popularity": 83.2, "vote_average": 8.2, "release_date": "1999-03-30",
                 "poster_path": null},
                {"id": 604, "title": "The Matrix Reloaded"}
            ],
            "total_pages": 1
        }"#;

        let movies = parse_movie_page(payload, "popular").unwrap();
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].genre_ids, vec![28, 878]);
        assert_eq!(movies[0].release_year(), Some(1999));
        assert_eq!(movies[0].poster_path, None);
        assert!(movies[1].genre_ids.is_empty());
    }

    #[test]
    fn test_parse_bare_array() {
        let movies = parse_movie_page(r#"[{"id": 1}, {"id": 2}]"#, "inline").unwrap();
        assert_eq!(movies.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_rejects_out_of_range_vote() {
        let err = parse_movie_page(r#"[{"id": 9, "vote_average": 11.5}]"#, "inline").unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidValue { movie_id: 9, .. }));
    }

    #[test]
    fn test_rejects_malformed_payload() {
        let err = parse_movie_page(r#"{"results": "nope"}"#, "broken.json").unwrap_err();
        match err {
            DataLoadError::ParseError { source_name, .. } => assert_eq!(source_name, "broken.json"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_record_keeps_field_detail() {
        let payload = r#"{"page": 1, "results": [{"id": 1}, {"id": 2, "title": 42}]}"#;
        match parse_movie_page(payload, "popular").unwrap_err() {
            DataLoadError::ParseError { reason, .. } => {
                assert!(reason.contains("invalid type"), "reason was: {reason}");
                assert!(!reason.contains("did not match any variant"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_object_without_results() {
        let err = parse_movie_page(r#"{"page": 1}"#, "empty.json").unwrap_err();
        assert!(matches!(err, DataLoadError::ParseError { .. }));
    }

    #[test]
    fn test_parse_genre_list() {
        let catalog = parse_genre_list(
            r#"{"genres": [{"id": 28, "name": "Action"}, {"id": 35, "name": "Comedy"}]}"#,
            "genres",
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.name(35), Some("Comedy"));
    }

    #[test]
    fn test_missing_file() {
        let err = parse_movies(Path::new("definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { .. }));
    }
}
