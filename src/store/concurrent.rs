//! Chronicle - Concurrent Store Wrapper
//! Thread-safe wrapper around the record store using Arc + RwLock.
//!
//! ## Concurrency Model
//! - **Read operations** (`get`, `history`, `len`, etc.) acquire a
//!   **read lock** (shared)
//! - **Write operations** (`apply_patch`) acquire a **write lock**
//!   (exclusive)
//!
//! The store-wide write lock serializes all mutations, which gives the
//! required property that no two patches to the same id interleave and
//! that a read never observes a half-applied patch. Cross-id write
//! parallelism is traded away for a single lock.

use std::sync::{Arc, RwLock};

use crate::config::Config;
use crate::error::Result;
use crate::types::{HistoryValue, KeyHistory, Patch, Record, RecordId};

use super::metrics::StoreMetrics;
use super::RecordStore;

/// Thread-safe wrapper around the Chronicle record store.
///
/// ## Example
/// ```no_run
/// use chronicle::config::Config;
/// use chronicle::store::concurrent::ConcurrentStore;
/// use chronicle::types::Patch;
/// use std::thread;
///
/// let store = ConcurrentStore::open(Config::default()).unwrap();
///
/// let writer = store.clone();
/// thread::spawn(move || {
///     writer.apply_patch(1, &Patch::new().set("foo", "bar")).unwrap();
/// });
///
/// let result = store.get(1);
/// ```
#[derive(Clone)]
pub struct ConcurrentStore {
    inner: Arc<RwLock<RecordStore>>,
}

impl ConcurrentStore {
    /// Open or create a concurrent Chronicle store.
    pub fn open(config: Config) -> Result<Self> {
        let store = RecordStore::open(config)?;
        Ok(Self {
            inner: Arc::new(RwLock::new(store)),
        })
    }

    /// Get the current record for an id (read lock).
    pub fn get(&self, id: RecordId) -> Result<Record> {
        self.inner.read().unwrap().get(id)
    }

    /// Apply a merge-patch to a record (write lock).
    pub fn apply_patch(&self, id: RecordId, patch: &Patch) -> Result<Record> {
        self.inner.write().unwrap().apply_patch(id, patch)
    }

    /// Query a key's history, newest first (read lock).
    pub fn history(&self, id: RecordId, key: &str) -> Vec<(u64, HistoryValue)> {
        self.inner.read().unwrap().history(id, key)
    }

    /// Wire-shaped history query (read lock).
    pub fn key_history(&self, id: RecordId, key: &str) -> KeyHistory {
        self.inner.read().unwrap().key_history(id, key)
    }

    /// Number of records (read lock).
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    /// Check if the store is empty (read lock).
    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().is_empty()
    }

    /// All known record ids, ascending (read lock).
    pub fn record_ids(&self) -> Vec<RecordId> {
        self.inner.read().unwrap().record_ids()
    }

    /// Run a closure against the store metrics (read lock).
    pub fn with_metrics<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&StoreMetrics) -> R,
    {
        let store = self.inner.read().unwrap();
        f(store.metrics())
    }
}
