//! Key-value storage backends for the preference store.
//!
//! The store serializes a whole collection on every mutation and hands the
//! payload to a backend under one of four keys. Backends only move strings.

use crate::error::{PreferenceError, Result};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// The four independently persisted collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Watchlist,
    Favorites,
    Ratings,
    WatchHistory,
}

impl StorageKey {
    pub const ALL: [StorageKey; 4] = [
        StorageKey::Watchlist,
        StorageKey::Favorites,
        StorageKey::Ratings,
        StorageKey::WatchHistory,
    ];

    /// Key name used by the storage backend
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Watchlist => "watchlist",
            StorageKey::Favorites => "favorites",
            StorageKey::Ratings => "ratings",
            StorageKey::WatchHistory => "watchHistory",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistent client-side key-value storage.
pub trait PreferenceStorage {
    /// Returns `Ok(None)` when nothing was ever saved under `key`
    fn load(&self, key: StorageKey) -> Result<Option<String>>;

    /// Replace the payload stored under `key`
    fn save(&self, key: StorageKey, payload: &str) -> Result<()>;
}

/// Stores each collection as `<dir>/<key>.json`.
///
/// Writes go to `<key>.json.tmp` first and are renamed into place, so a
/// reader never sees a half-written collection.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: StorageKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }

    fn temp_path_for(&self, key: StorageKey) -> PathBuf {
        self.dir.join(format!("{}.json.tmp", key.as_str()))
    }
}

impl PreferenceStorage for JsonFileStorage {
    fn load(&self, key: StorageKey) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            debug!("No stored {} at {:?}", key, path);
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn save(&self, key: StorageKey, payload: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let temp_path = self.temp_path_for(key);
        fs::write(&temp_path, payload)?;
        fs::rename(&temp_path, &path)?;
        debug!("Saved {} ({} bytes) to {:?}", key, payload.len(), path);
        Ok(())
    }
}

/// In-memory backend.
///
/// Clones share the same map, so a caller can keep a handle and inspect
/// what the store persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<StorageKey, String>>>,
    /// Reject writes larger than this many bytes, like a browser quota
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the size of a single payload
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// The raw payload currently stored under `key`
    pub fn get(&self, key: StorageKey) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(&key).cloned())
    }

    /// Seed a payload without going through a store
    pub fn put(&self, key: StorageKey, payload: impl Into<String>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, payload.into());
        }
    }
}

impl PreferenceStorage for MemoryStorage {
    fn load(&self, key: StorageKey) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|e| PreferenceError::Storage {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        Ok(entries.get(&key).cloned())
    }

    fn save(&self, key: StorageKey, payload: &str) -> Result<()> {
        if let Some(quota) = self.quota {
            if payload.len() > quota {
                return Err(PreferenceError::Storage {
                    key: key.to_string(),
                    reason: format!("quota of {} bytes exceeded ({} bytes)", quota, payload.len()),
                });
            }
        }
        let mut entries = self.entries.lock().map_err(|e| PreferenceError::Storage {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        entries.insert(key, payload.to_string());
        Ok(())
    }
}
