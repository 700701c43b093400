//! The preference store: watchlist, favorites, ratings and watch history.
//!
//! One `PreferenceStore` exists per session. It is owned by the composition
//! root and passed by reference to whatever needs to read or mutate it.
//!
//! ## Invariants
//! - Watchlist and favorites hold at most one record per movie id
//! - The watch history holds at most one entry per movie id, newest first,
//!   and never more than `history_cap` entries
//! - Every mutation writes the affected collection (and only that one)
//!   back to storage; a failed write is logged and never undoes the change

use crate::config::{MAX_RATING, MIN_RATING, PreferenceConfig, RatingPolicy};
use crate::error::{PreferenceError, Result};
use crate::storage::{PreferenceStorage, StorageKey};
use chrono::Utc;
use data_loader::{Movie, MovieId, RatingsMap, StarRating, WatchHistoryEntry};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

pub struct PreferenceStore {
    watchlist: Vec<Movie>,
    favorites: Vec<Movie>,
    ratings: RatingsMap,
    watch_history: Vec<WatchHistoryEntry>,
    config: PreferenceConfig,
    storage: Box<dyn PreferenceStorage>,
    last_persist_error: Option<PreferenceError>,
}

impl PreferenceStore {
    /// Create an empty store backed by `storage`. Nothing is read from it.
    pub fn new(storage: impl PreferenceStorage + 'static) -> Self {
        Self {
            watchlist: Vec::new(),
            favorites: Vec::new(),
            ratings: RatingsMap::new(),
            watch_history: Vec::new(),
            config: PreferenceConfig::default(),
            storage: Box::new(storage),
            last_persist_error: None,
        }
    }

    pub fn with_config(mut self, config: PreferenceConfig) -> Self {
        self.config = config;
        self
    }

    /// Reload all four collections from `storage`.
    ///
    /// A collection that is missing, unreadable or corrupt starts empty;
    /// the problem is logged and loading carries on with the others.
    pub fn load(storage: impl PreferenceStorage + 'static, config: PreferenceConfig) -> Self {
        let mut store = PreferenceStore::new(storage).with_config(config);

        store.watchlist = store.load_collection(StorageKey::Watchlist);
        store.favorites = store.load_collection(StorageKey::Favorites);
        store.ratings = store.load_collection(StorageKey::Ratings);
        store.watch_history = store.load_collection(StorageKey::WatchHistory);
        store.watch_history.truncate(store.config.history_cap);

        info!(
            "Loaded preferences: watchlist={}, favorites={}, ratings={}, history={}",
            store.watchlist.len(),
            store.favorites.len(),
            store.ratings.len(),
            store.watch_history.len()
        );
        store
    }

    fn load_collection<T: DeserializeOwned + Default>(&self, key: StorageKey) -> T {
        let payload = match self.storage.load(key) {
            Ok(Some(payload)) => payload,
            Ok(None) => return T::default(),
            Err(e) => {
                warn!("Failed to read stored {}: {}. Starting empty.", key, e);
                return T::default();
            }
        };
        match serde_json::from_str(&payload) {
            Ok(value) => value,
            Err(e) => {
                warn!("Stored {} is corrupt ({}). Starting empty.", key, e);
                T::default()
            }
        }
    }

    // =========================================================================
    // Watchlist
    // =========================================================================

    /// Returns false if the movie was already on the watchlist
    pub fn add_to_watchlist(&mut self, movie: Movie) -> bool {
        if self.is_in_watchlist(movie.id) {
            return false;
        }
        debug!("Adding movie {} to watchlist", movie.id);
        self.watchlist.push(movie);
        self.persist(StorageKey::Watchlist);
        true
    }

    /// Returns false if the movie wasn't on the watchlist
    pub fn remove_from_watchlist(&mut self, id: MovieId) -> bool {
        let before = self.watchlist.len();
        self.watchlist.retain(|m| m.id != id);
        if self.watchlist.len() == before {
            return false;
        }
        self.persist(StorageKey::Watchlist);
        true
    }

    pub fn is_in_watchlist(&self, id: MovieId) -> bool {
        self.watchlist.iter().any(|m| m.id == id)
    }

    pub fn watchlist(&self) -> &[Movie] {
        &self.watchlist
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// Returns false if the movie was already a favorite
    pub fn add_to_favorites(&mut self, movie: Movie) -> bool {
        if self.is_in_favorites(movie.id) {
            return false;
        }
        debug!("Adding movie {} to favorites", movie.id);
        self.favorites.push(movie);
        self.persist(StorageKey::Favorites);
        true
    }

    /// Returns false if the movie wasn't a favorite
    pub fn remove_from_favorites(&mut self, id: MovieId) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|m| m.id != id);
        if self.favorites.len() == before {
            return false;
        }
        self.persist(StorageKey::Favorites);
        true
    }

    pub fn is_in_favorites(&self, id: MovieId) -> bool {
        self.favorites.iter().any(|m| m.id == id)
    }

    pub fn favorites(&self) -> &[Movie] {
        &self.favorites
    }

    // =========================================================================
    // Ratings
    // =========================================================================

    /// Upsert a rating and return the value actually stored.
    ///
    /// Ratings are expected in 1..=5; out-of-range input is handled by the
    /// configured [`RatingPolicy`].
    pub fn rate_movie(&mut self, id: MovieId, rating: StarRating) -> Result<StarRating> {
        let in_range = (MIN_RATING..=MAX_RATING).contains(&rating);
        let stored = match self.config.rating_policy {
            _ if in_range => rating,
            RatingPolicy::Accept => rating,
            RatingPolicy::Clamp => rating.clamp(MIN_RATING, MAX_RATING),
            RatingPolicy::Reject => {
                return Err(PreferenceError::InvalidArgument {
                    movie_id: id,
                    rating,
                });
            }
        };

        debug!("Rating movie {} with {}", id, stored);
        self.ratings.insert(id, stored);
        self.persist(StorageKey::Ratings);
        Ok(stored)
    }

    /// The stored rating, or 0 when unrated
    pub fn get_movie_rating(&self, id: MovieId) -> StarRating {
        self.ratings.get(&id).copied().unwrap_or(0)
    }

    pub fn ratings(&self) -> &RatingsMap {
        &self.ratings
    }

    // =========================================================================
    // Watch history
    // =========================================================================

    /// Prepend a history entry stamped now.
    ///
    /// Returns false (and changes nothing) when the movie is already in the
    /// history: re-watching neither duplicates nor reorders it.
    pub fn add_to_watch_history(&mut self, movie: Movie) -> bool {
        if self.watch_history.iter().any(|e| e.movie_id() == movie.id) {
            return false;
        }
        debug!("Adding movie {} to watch history", movie.id);
        self.watch_history
            .insert(0, WatchHistoryEntry::new(movie, Utc::now()));
        self.watch_history.truncate(self.config.history_cap);
        self.persist(StorageKey::WatchHistory);
        true
    }

    pub fn clear_watch_history(&mut self) {
        self.watch_history.clear();
        self.persist(StorageKey::WatchHistory);
    }

    /// Newest first
    pub fn watch_history(&self) -> &[WatchHistoryEntry] {
        &self.watch_history
    }

    pub fn config(&self) -> &PreferenceConfig {
        &self.config
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// The most recent persistence failure, cleared by this call
    pub fn take_persist_error(&mut self) -> Option<PreferenceError> {
        self.last_persist_error.take()
    }

    fn persist(&mut self, key: StorageKey) {
        let result = self
            .encode(key)
            .and_then(|payload| self.storage.save(key, &payload));

        if let Err(e) = result {
            warn!("Failed to persist {}: {}. Keeping in-memory state.", key, e);
            self.last_persist_error = Some(e);
        }
    }

    fn encode(&self, key: StorageKey) -> Result<String> {
        let payload = match key {
            StorageKey::Watchlist => serde_json::to_string(&self.watchlist)?,
            StorageKey::Favorites => serde_json::to_string(&self.favorites)?,
            StorageKey::Ratings => serde_json::to_string(&self.ratings)?,
            StorageKey::WatchHistory => serde_json::to_string(&self.watch_history)?,
        };
        Ok(payload)
    }
}
