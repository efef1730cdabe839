//! Best-effort local persistence.
//!
//! Everything the core keeps between runs goes through a [`LocalStore`]:
//! cached puzzles, progress snapshots, the sync queue, stats and profiles.
//! Writes may fail (full disk, read-only directory); callers log and carry on,
//! and reads of missing or corrupt values yield `None`.

mod file;
pub mod keys;

pub use file::FileStore;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// String key/value storage.
pub trait LocalStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str);
}

/// In-memory store, used by tests and anonymous throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
    read_only: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail, simulating exhausted storage.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.read_only.get() {
            return Err(Error::Storage(format!("store is read-only ({})", key)));
        }
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.values.borrow_mut().remove(key);
    }
}

/// Read and decode a JSON value. Missing or undecodable values are `None`.
pub fn read_json<T: DeserializeOwned>(store: &dyn LocalStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring corrupt local value {}: {}", key, e);
            None
        }
    }
}

/// Encode and write a JSON value. Returns whether the write landed.
pub fn write_json<T: Serialize>(store: &dyn LocalStore, key: &str, value: &T) -> bool {
    let result = serde_json::to_string(value)
        .map_err(Error::from)
        .and_then(|raw| store.set(key, &raw));
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!("Local write to {} failed: {}", key, e);
            false
        }
    }
}

/// A value stamped with its save time, for TTL-bounded caches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub value: T,
    pub saved_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, saved_at: DateTime<Utc>) -> Self {
        Self { value, saved_at }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        now.signed_duration_since(self.saved_at) < ttl
    }
}

/// Read a cache entry, treating expired entries as absent.
pub fn read_fresh<T: DeserializeOwned>(
    store: &dyn LocalStore,
    key: &str,
    now: DateTime<Utc>,
    ttl: Duration,
) -> Option<T> {
    let entry: CacheEntry<T> = read_json(store, key)?;
    if entry.is_fresh(now, ttl) {
        Some(entry.value)
    } else {
        debug!("Cache entry {} expired (saved {})", key, entry.saved_at);
        None
    }
}
