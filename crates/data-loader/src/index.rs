//! MovieIndex building and lookups.
//!
//! The index owns one already-fetched candidate pool together with the
//! genre catalog:
//! - the pool in provider order (the order recommenders see)
//! - a position index for O(1) lookups by id
//! - popularity and rating rails over the whole pool

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// File holding the candidate pool inside a data directory
pub const MOVIES_FILE: &str = "movies.json";

/// File holding the genre catalog inside a data directory (optional)
pub const GENRES_FILE: &str = "genres.json";

/// In-memory candidate pool plus genre catalog.
#[derive(Debug, Default)]
pub struct MovieIndex {
    movies: Vec<Movie>,
    positions: HashMap<MovieId, usize>,
    catalog: GenreCatalog,
}

impl MovieIndex {
    /// Creates a new, empty MovieIndex
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from an already-fetched pool and catalog
    pub fn from_parts(movies: Vec<Movie>, catalog: GenreCatalog) -> Self {
        let mut index = MovieIndex::new();
        for movie in movies {
            index.insert_movie(movie);
        }
        index.catalog = catalog;
        index
    }

    /// Load `movies.json` and `genres.json` from a directory.
    ///
    /// Both files are parsed in parallel. A missing genre catalog is not an
    /// error; the index then has an empty catalog and shows raw ids.
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!("Loading candidate pool from {:?}", data_dir);

        let movies_path = data_dir.join(MOVIES_FILE);
        let genres_path = data_dir.join(GENRES_FILE);

        let (movies, catalog) = rayon::join(
            || parser::parse_movies(&movies_path),
            || parser::parse_genres(&genres_path),
        );

        let movies = movies?;
        let catalog = match catalog {
            Ok(catalog) => catalog,
            Err(DataLoadError::FileNotFound { path }) => {
                debug!("No genre catalog at {}, continuing without names", path);
                GenreCatalog::new()
            }
            Err(e) => return Err(e),
        };

        let index = MovieIndex::from_parts(movies, catalog);
        info!(
            "Loaded {} movies and {} genres",
            index.len(),
            index.catalog.len()
        );
        Ok(index)
    }

    /// Insert a movie.
    ///
    /// A duplicate id keeps its original position and takes the new record.
    pub fn insert_movie(&mut self, movie: Movie) {
        match self.positions.get(&movie.id) {
            Some(&pos) => self.movies[pos] = movie,
            None => {
                self.positions.insert(movie.id, self.movies.len());
                self.movies.push(movie);
            }
        }
    }

    /// The whole pool in provider order
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    /// Get a movie by ID
    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.positions.get(&id).map(|&pos| &self.movies[pos])
    }

    pub fn catalog(&self) -> &GenreCatalog {
        &self.catalog
    }

    /// The pool ordered by popularity, most popular first.
    ///
    /// Ties keep pool order.
    pub fn trending(&self, limit: usize) -> Vec<Movie> {
        let mut movies = self.movies.clone();
        movies.sort_by(|a, b| b.popularity().total_cmp(&a.popularity()));
        movies.truncate(limit);
        movies
    }

    /// The pool ordered by vote average, best rated first.
    ///
    /// Ties keep pool order. Unrated movies count as 0.0.
    pub fn top_rated(&self, limit: usize) -> Vec<Movie> {
        let mut movies = self.movies.clone();
        movies.sort_by(|a, b| b.vote_average().total_cmp(&a.vote_average()));
        movies.truncate(limit);
        movies
    }

    /// Case-insensitive title search.
    ///
    /// Exact matches come first, then substring matches; each group is
    /// ordered by popularity.
    pub fn search_title(&self, query: &str) -> Vec<&Movie> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<(u8, &Movie)> = self
            .movies
            .iter()
            .filter_map(|movie| {
                let title = movie.title.to_lowercase();
                if title == query {
                    Some((0, movie))
                } else if title.contains(&query) {
                    Some((1, movie))
                } else {
                    None
                }
            })
            .collect();

        matches.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| b.1.popularity().total_cmp(&a.1.popularity()))
        });
        matches.into_iter().map(|(_, movie)| movie).collect()
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}
