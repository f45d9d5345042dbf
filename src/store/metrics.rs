//! Chronicle - Store Metrics & Observability
//! Atomic counters for tracking store operations in a lock-free,
//! thread-safe manner using `AtomicU64`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Atomic operation counters for the Chronicle store.
///
/// All counters use `Ordering::Relaxed` since only eventual consistency
/// matters for observability.
#[derive(Debug)]
pub struct StoreMetrics {
    /// Total number of `get` operations.
    pub gets: AtomicU64,
    /// Total number of `apply_patch` calls.
    pub patches: AtomicU64,
    /// Total number of field sets written.
    pub field_sets: AtomicU64,
    /// Total number of field deletions (tombstones) written.
    pub field_deletes: AtomicU64,
    /// Total number of history queries.
    pub history_queries: AtomicU64,
    /// Total bytes written (keys + values of field sets).
    pub bytes_written: AtomicU64,
    /// Number of journal entries replayed at startup.
    pub replayed_entries: AtomicU64,
    /// Timestamp when the store was opened.
    store_started: Instant,
}

impl StoreMetrics {
    /// Create a new metrics instance with all counters at zero.
    pub fn new() -> Self {
        Self {
            gets: AtomicU64::new(0),
            patches: AtomicU64::new(0),
            field_sets: AtomicU64::new(0),
            field_deletes: AtomicU64::new(0),
            history_queries: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            replayed_entries: AtomicU64::new(0),
            store_started: Instant::now(),
        }
    }

    /// Record a get operation.
    pub fn record_get(&self) {
        self.gets.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a patch application.
    pub fn record_patch(&self) {
        self.patches.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one field set.
    pub fn record_field_set(&self, key_size: usize, value_size: usize) {
        self.field_sets.fetch_add(1, Ordering::Relaxed);
        self.bytes_written
            .fetch_add((key_size + value_size) as u64, Ordering::Relaxed);
    }

    /// Record one field deletion.
    pub fn record_field_delete(&self) {
        self.field_deletes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a history query.
    pub fn record_history_query(&self) {
        self.history_queries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the journal entries replayed at startup.
    pub fn record_replay(&self, entries: usize) {
        self.replayed_entries
            .fetch_add(entries as u64, Ordering::Relaxed);
    }

    /// Get store uptime in seconds.
    pub fn uptime_secs(&self) -> f64 {
        self.store_started.elapsed().as_secs_f64()
    }

    /// Get total number of operations (gets + patches + history queries).
    pub fn total_ops(&self) -> u64 {
        self.gets.load(Ordering::Relaxed)
            + self.patches.load(Ordering::Relaxed)
            + self.history_queries.load(Ordering::Relaxed)
    }

    /// Get operations per second since the store was opened.
    pub fn ops_per_sec(&self) -> f64 {
        let uptime = self.uptime_secs();
        if uptime < 0.001 {
            return 0.0;
        }
        self.total_ops() as f64 / uptime
    }

    /// Format metrics as a human-readable report.
    pub fn report(&self) -> String {
        format!(
            "\n═══ Chronicle Store Metrics ═══\n\
             Operations:\n\
               gets:            {}\n\
               patches:         {}\n\
               history queries: {}\n\
             Fields:\n\
               sets:            {}\n\
               deletes:         {}\n\
               bytes written:   {}\n\
             Recovery:\n\
               replayed:        {} journal entries\n\
             Throughput:\n\
               total ops:       {}\n\
               ops/sec:         {:.2}\n\
             Uptime: {:.2}s",
            self.gets.load(Ordering::Relaxed),
            self.patches.load(Ordering::Relaxed),
            self.history_queries.load(Ordering::Relaxed),
            self.field_sets.load(Ordering::Relaxed),
            self.field_deletes.load(Ordering::Relaxed),
            self.bytes_written.load(Ordering::Relaxed),
            self.replayed_entries.load(Ordering::Relaxed),
            self.total_ops(),
            self.ops_per_sec(),
            self.uptime_secs(),
        )
    }
}

impl Default for StoreMetrics {
    fn default() -> Self {
        Self::new()
    }
}
