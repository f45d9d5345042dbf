//! Chronicle - Per-Key History Log
//! Append-only sequences of past values (and deletion tombstones) for
//! every (record id, key) pair that has ever changed. The log never
//! edits or removes an entry; sequence numbers are positional and
//! assigned at append time.

use std::collections::HashMap;

use crate::types::{HistoryValue, RecordId};

/// Append-only history of field changes, keyed by record id then key.
///
/// The `RecordStore` appends exactly one entry per effective field
/// change in a patch; this type never decides *whether* a change is
/// logged, only stores it.
pub struct HistoryLog {
    logs: HashMap<RecordId, HashMap<String, Vec<HistoryValue>>>,
}

impl HistoryLog {
    /// Create a new, empty history log.
    pub fn new() -> Self {
        Self {
            logs: HashMap::new(),
        }
    }

    /// Append one entry for (id, key), returning its sequence number
    /// (0 for the first change of that key).
    pub fn append(&mut self, id: RecordId, key: &str, value: HistoryValue) -> u64 {
        let entries = self
            .logs
            .entry(id)
            .or_default()
            .entry(key.to_string())
            .or_default();
        entries.push(value);
        (entries.len() - 1) as u64
    }

    /// Number of entries recorded for (id, key).
    pub fn entry_count(&self, id: RecordId, key: &str) -> usize {
        self.logs
            .get(&id)
            .and_then(|keys| keys.get(key))
            .map_or(0, Vec::len)
    }

    /// Query the history for (id, key), newest first, re-indexed from 0
    /// at the most recent entry. A key with no history yields an empty
    /// Vec — that is not an error condition.
    pub fn query(&self, id: RecordId, key: &str) -> Vec<(u64, HistoryValue)> {
        match self.logs.get(&id).and_then(|keys| keys.get(key)) {
            Some(entries) => entries
                .iter()
                .rev()
                .cloned()
                .enumerate()
                .map(|(index, value)| (index as u64, value))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Total number of entries across all logs.
    pub fn total_entries(&self) -> usize {
        self.logs
            .values()
            .flat_map(HashMap::values)
            .map(Vec::len)
            .sum()
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}
