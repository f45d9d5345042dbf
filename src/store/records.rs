//! Chronicle - Record Table (Current State)
//! Holds the current key/value mapping for every record the store has
//! ever accepted a write for. History is kept separately in the
//! `HistoryLog`; this table only reflects the latest state.

use std::collections::{BTreeMap, HashMap};

use crate::types::RecordId;

/// In-memory table mapping record ids to their current data.
///
/// A record exists from the first successful write for its id onward,
/// even if every key has since been deleted — an empty mapping is a
/// valid record, distinct from an id that was never written.
pub struct RecordTable {
    records: HashMap<RecordId, BTreeMap<String, String>>,
}

impl RecordTable {
    /// Create a new, empty table.
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    /// Number of records the table holds (including empty ones).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no record has ever been written.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns true if the id has ever been written.
    pub fn contains(&self, id: RecordId) -> bool {
        self.records.contains_key(&id)
    }

    /// Get the current data for a record, if it exists.
    pub fn get(&self, id: RecordId) -> Option<&BTreeMap<String, String>> {
        self.records.get(&id)
    }

    /// Get the record's data for mutation, creating the record with an
    /// empty mapping on first touch. Check-and-insert races cannot occur
    /// because callers hold the store's write lock.
    pub fn upsert(&mut self, id: RecordId) -> &mut BTreeMap<String, String> {
        self.records.entry(id).or_default()
    }

    /// All known record ids, ascending.
    pub fn ids(&self) -> Vec<RecordId> {
        let mut ids: Vec<RecordId> = self.records.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for RecordTable {
    fn default() -> Self {
        Self::new()
    }
}
