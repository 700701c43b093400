//! # Preferences Crate
//!
//! The user's personal lists, kept in memory and mirrored to local storage:
//!
//! - **Watchlist** and **favorites**: sets of movie records keyed by id,
//!   displayed in insertion order
//! - **Ratings**: movie id -> 1..=5 stars, 0 meaning unrated
//! - **Watch history**: newest first, one entry per movie, capped at 50
//!
//! ## Example Usage
//!
//! ```ignore
//! use preferences::{JsonFileStorage, PreferenceConfig, PreferenceStore};
//!
//! let mut store = PreferenceStore::load(
//!     JsonFileStorage::new("profile"),
//!     PreferenceConfig::default(),
//! );
//!
//! store.add_to_watch_history(movie.clone());
//! store.rate_movie(movie.id, 5)?;
//! assert!(store.add_to_favorites(movie));
//! ```

pub mod config;
pub mod error;
pub mod storage;
pub mod store;

pub use config::{PreferenceConfig, RatingPolicy};
pub use error::{PreferenceError, Result};
pub use storage::{JsonFileStorage, MemoryStorage, PreferenceStorage, StorageKey};
pub use store::PreferenceStore;
