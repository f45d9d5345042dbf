//! Chronicle - Record Store Module
//! Top-level module coordinating the record table, history log, and
//! durability journal.

pub mod concurrent;
pub mod history;
pub mod journal;
pub mod metrics;
pub mod records;

use crate::config::Config;
use crate::error::{ChronicleError, Result};
use crate::types::{HistoryValue, KeyHistory, Patch, Record, RecordId};

use self::history::HistoryLog;
use self::journal::{Journal, JournalEntry};
use self::metrics::StoreMetrics;
use self::records::RecordTable;

/// The core Chronicle record store.
///
/// Coordinates the record table (current state), the history log
/// (append-only past states), and the journal (durability) to provide
/// merge-patch updates with per-field history. The write path is
/// journal (disk) -> history -> record table, so a crash between the
/// journal write and the in-memory update is replayed on next startup.
pub struct RecordStore {
    /// Current key/value mapping per record id.
    records: RecordTable,
    /// Append-only past values per (record id, key).
    history: HistoryLog,
    /// Durability journal of effective field changes.
    journal: Journal,
    /// Operation counters.
    metrics: StoreMetrics,
    /// Store configuration.
    config: Config,
}

impl RecordStore {
    /// Open or create a Chronicle store at the configured path,
    /// replaying any persisted journal to rebuild state.
    pub fn open(config: Config) -> Result<Self> {
        config.ensure_dirs()?;

        let journal_path = config.data_dir.join("chronicle.journal");
        let replayed = Journal::recover(&journal_path)?;

        let mut records = RecordTable::new();
        let mut history = HistoryLog::new();
        for entry in &replayed {
            Self::replay(&mut records, &mut history, entry);
        }

        let journal = Journal::open(journal_path, config.sync_writes)?;
        let metrics = StoreMetrics::new();
        metrics.record_replay(replayed.len());

        log::info!(
            "Chronicle store opened at {:?} ({} journal entries replayed, {} records)",
            config.data_dir,
            replayed.len(),
            records.len()
        );

        Ok(Self {
            records,
            history,
            journal,
            metrics,
            config,
        })
    }

    /// Apply one recovered journal entry to the in-memory state.
    /// Mirrors the effective-change half of `apply_patch`, so replay
    /// rebuilds identical `get` and `history` results.
    fn replay(records: &mut RecordTable, history: &mut HistoryLog, entry: &JournalEntry) {
        match entry {
            JournalEntry::Create { rid } => {
                records.upsert(*rid);
            }
            JournalEntry::Set { rid, key, value } => {
                records.upsert(*rid).insert(key.clone(), value.clone());
                history.append(*rid, key, HistoryValue::Set(value.clone()));
            }
            JournalEntry::Delete { rid, key } => {
                records.upsert(*rid).remove(key);
                history.append(*rid, key, HistoryValue::Tombstone);
            }
        }
    }

    /// Get the current record for `id`.
    /// Fails with `RecordNotFound` only if no write has ever succeeded
    /// for the id; a record whose keys have all been deleted returns an
    /// empty mapping.
    pub fn get(&self, id: RecordId) -> Result<Record> {
        self.metrics.record_get();
        match self.records.get(id) {
            Some(data) => Ok(Record {
                id,
                data: data.clone(),
            }),
            None => Err(ChronicleError::RecordNotFound(id)),
        }
    }

    /// Apply a merge-patch to `id`, creating the record on first write.
    ///
    /// Operations run in the patch's own key order. Every explicit set
    /// is journaled and logged, even when it repeats the current value;
    /// deleting a key that is not currently present changes nothing and
    /// logs nothing. Each effective change hits the journal before the
    /// in-memory state, and a journal failure aborts the write.
    ///
    /// Returns the full record after the patch.
    pub fn apply_patch(&mut self, id: RecordId, patch: &Patch) -> Result<Record> {
        self.metrics.record_patch();

        if !self.records.contains(id) {
            self.journal.append(&JournalEntry::Create { rid: id })?;
            self.records.upsert(id);
        }

        for (key, value) in patch.ops() {
            match value {
                Some(v) => {
                    self.journal.append(&JournalEntry::Set {
                        rid: id,
                        key: key.clone(),
                        value: v.clone(),
                    })?;
                    self.records.upsert(id).insert(key.clone(), v.clone());
                    self.history.append(id, key, HistoryValue::Set(v.clone()));
                    self.metrics.record_field_set(key.len(), v.len());
                }
                None => {
                    let present = self
                        .records
                        .get(id)
                        .is_some_and(|data| data.contains_key(key));
                    if present {
                        self.journal.append(&JournalEntry::Delete {
                            rid: id,
                            key: key.clone(),
                        })?;
                        self.records.upsert(id).remove(key);
                        self.history.append(id, key, HistoryValue::Tombstone);
                        self.metrics.record_field_delete();
                    }
                }
            }
        }

        // The record is guaranteed to exist at this point.
        Ok(Record {
            id,
            data: self.records.upsert(id).clone(),
        })
    }

    /// Query the history of (id, key), newest first, re-indexed from 0.
    /// An untouched key yields an empty Vec, never an error.
    pub fn history(&self, id: RecordId, key: &str) -> Vec<(u64, HistoryValue)> {
        self.metrics.record_history_query();
        self.history.query(id, key)
    }

    /// History query shaped for the wire:
    /// `{"rid":<id>,"key":"<key>","data":{"0":...}}`.
    pub fn key_history(&self, id: RecordId, key: &str) -> KeyHistory {
        KeyHistory {
            rid: id,
            key: key.to_string(),
            entries: self.history(id, key),
        }
    }

    /// Number of records the store holds.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no record has ever been written.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All known record ids, ascending.
    pub fn record_ids(&self) -> Vec<RecordId> {
        self.records.ids()
    }

    /// Access the operation counters.
    pub fn metrics(&self) -> &StoreMetrics {
        &self.metrics
    }

    /// Access the store configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, RecordStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::open(Config::new(dir.path())).unwrap();
        (dir, store)
    }

    #[test]
    fn test_get_unknown_id_fails() {
        let (_dir, store) = temp_store();
        assert!(matches!(
            store.get(1),
            Err(ChronicleError::RecordNotFound(1))
        ));
    }

    #[test]
    fn test_patch_creates_record() {
        let (_dir, mut store) = temp_store();

        let record = store
            .apply_patch(1, &Patch::new().set("foo", "bar"))
            .unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(record.data.get("foo"), Some(&"bar".to_string()));

        assert_eq!(store.get(1).unwrap(), record);
    }

    #[test]
    fn test_empty_patch_creates_empty_record() {
        let (_dir, mut store) = temp_store();

        let record = store.apply_patch(5, &Patch::new()).unwrap();
        assert!(record.data.is_empty());
        assert!(store.get(5).unwrap().data.is_empty());
    }

    #[test]
    fn test_delete_absent_key_is_noop() {
        let (_dir, mut store) = temp_store();
        store.apply_patch(1, &Patch::new().set("foo", "bar")).unwrap();

        let record = store.apply_patch(1, &Patch::new().remove("ghost")).unwrap();
        assert_eq!(record.data.len(), 1);
        assert!(store.history(1, "ghost").is_empty());
    }

    #[test]
    fn test_all_keys_deleted_is_not_missing() {
        let (_dir, mut store) = temp_store();
        store.apply_patch(1, &Patch::new().set("foo", "bar")).unwrap();
        store.apply_patch(1, &Patch::new().remove("foo")).unwrap();

        let record = store.get(1).unwrap();
        assert!(record.data.is_empty());
    }

    #[test]
    fn test_history_logged_in_patch_order() {
        let (_dir, mut store) = temp_store();
        store
            .apply_patch(1, &Patch::new().set("a", "1").set("b", "2"))
            .unwrap();
        store.apply_patch(1, &Patch::new().remove("a")).unwrap();

        assert_eq!(
            store.history(1, "a"),
            vec![
                (0, HistoryValue::Tombstone),
                (1, HistoryValue::Set("1".to_string())),
            ]
        );
        assert_eq!(store.history(1, "b"), vec![(0, HistoryValue::Set("2".to_string()))]);
    }

    #[test]
    fn test_repeated_identical_set_logs_again() {
        let (_dir, mut store) = temp_store();
        store.apply_patch(1, &Patch::new().set("k", "v")).unwrap();
        store.apply_patch(1, &Patch::new().set("k", "v")).unwrap();

        assert_eq!(store.history(1, "k").len(), 2);
    }

    #[test]
    fn test_metrics_move() {
        let (_dir, mut store) = temp_store();
        store.apply_patch(1, &Patch::new().set("k", "v")).unwrap();
        let _ = store.get(1);
        let _ = store.history(1, "k");

        assert!(store.metrics().total_ops() >= 3);
    }
}
