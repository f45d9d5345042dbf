//! Chronicle - Durability Journal
//! Append-only on-disk log of every effective field change. The journal
//! is written before the in-memory state is updated, and replayed at
//! startup to rebuild both the record table and the history log.
//!
//! ## Binary Format (per frame)
//! ```text
//! [payload_len: 4 bytes (LE)][payload: bincode JournalEntry][crc: 4 bytes (LE)]
//! ```
//! The CRC covers the payload only.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ChronicleError, Result};
use crate::types::RecordId;

/// One durable event: either the implicit creation of a record, or an
/// effective change to one field. Entries for a single patch appear in
/// the patch's own key order, so replay rebuilds identical history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JournalEntry {
    /// First write ever seen for this id; the record now exists even if
    /// the triggering patch changed no fields.
    Create { rid: RecordId },
    /// A key was set or overwritten.
    Set {
        rid: RecordId,
        key: String,
        value: String,
    },
    /// A previously-present key was deleted.
    Delete { rid: RecordId, key: String },
}

/// Append-only journal file for crash recovery and durability.
pub struct Journal {
    /// Path to the journal file on disk.
    path: PathBuf,
    /// File handle opened for appending.
    file: File,
    /// Whether appends fsync before returning.
    sync_writes: bool,
}

impl Journal {
    /// Open or create a journal file at the specified path.
    pub fn open(path: PathBuf, sync_writes: bool) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            file,
            sync_writes,
        })
    }

    /// Returns the path to the journal file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Encode one entry into the framed binary format.
    fn encode(entry: &JournalEntry) -> Result<Vec<u8>> {
        let payload = bincode::serialize(entry)
            .map_err(|e| ChronicleError::Serialization(e.to_string()))?;

        let mut buf = Vec::with_capacity(payload.len() + 8);
        buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        buf.extend_from_slice(&payload);
        let crc = crc32fast::hash(&payload);
        buf.extend_from_slice(&crc.to_le_bytes());
        Ok(buf)
    }

    /// Append one entry and (if configured) fsync. The caller must not
    /// touch in-memory state until this returns Ok: a failed append
    /// aborts the write that triggered it.
    pub fn append(&mut self, entry: &JournalEntry) -> Result<()> {
        let encoded = Self::encode(entry)?;
        self.file.write_all(&encoded)?;
        if self.sync_writes {
            self.file.sync_all()?;
        }
        Ok(())
    }

    /// Read back every entry from a journal file.
    ///
    /// A missing file is a clean empty start. A torn frame at the tail
    /// (interrupted final write) is discarded with a warning and the
    /// prior entries are kept; a CRC mismatch anywhere before the tail
    /// is mid-file corruption and fails recovery.
    pub fn recover(path: &Path) -> Result<Vec<JournalEntry>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let data = std::fs::read(path)?;
        let mut entries = Vec::new();
        let mut offset = 0;

        while offset < data.len() {
            if offset + 4 > data.len() {
                log::warn!(
                    "journal: discarding torn frame header at offset {}",
                    offset
                );
                break;
            }
            let payload_len =
                u32::from_le_bytes(data[offset..offset + 4].try_into().unwrap()) as usize;
            let frame_end = offset + 4 + payload_len + 4;
            if frame_end > data.len() {
                log::warn!("journal: discarding torn frame at offset {}", offset);
                break;
            }

            let payload = &data[offset + 4..offset + 4 + payload_len];
            let stored_crc =
                u32::from_le_bytes(data[frame_end - 4..frame_end].try_into().unwrap());
            if crc32fast::hash(payload) != stored_crc {
                if frame_end == data.len() {
                    log::warn!("journal: discarding corrupt tail frame at offset {}", offset);
                    break;
                }
                return Err(ChronicleError::Corruption(format!(
                    "journal CRC mismatch at offset {}",
                    offset
                )));
            }

            let entry: JournalEntry = bincode::deserialize(payload)
                .map_err(|e| ChronicleError::Serialization(e.to_string()))?;
            entries.push(entry);
            offset = frame_end;
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entries() -> Vec<JournalEntry> {
        vec![
            JournalEntry::Create { rid: 1 },
            JournalEntry::Set {
                rid: 1,
                key: "foo".to_string(),
                value: "bar".to_string(),
            },
            JournalEntry::Delete {
                rid: 1,
                key: "foo".to_string(),
            },
        ]
    }

    #[test]
    fn test_append_and_recover() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.journal");

        {
            let mut journal = Journal::open(path.clone(), true).unwrap();
            for entry in sample_entries() {
                journal.append(&entry).unwrap();
            }
        }

        let recovered = Journal::recover(&path).unwrap();
        assert_eq!(recovered, sample_entries());
    }

    #[test]
    fn test_recover_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.journal");
        assert!(Journal::recover(&path).unwrap().is_empty());
    }

    #[test]
    fn test_recover_discards_torn_tail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("torn.journal");

        {
            let mut journal = Journal::open(path.clone(), true).unwrap();
            for entry in sample_entries() {
                journal.append(&entry).unwrap();
            }
        }

        // Chop a few bytes off the last frame to simulate a crash
        // mid-write.
        let len = std::fs::metadata(&path).unwrap().len();
        let file = OpenOptions::new().write(true).open(&path).unwrap();
        file.set_len(len - 3).unwrap();

        let recovered = Journal::recover(&path).unwrap();
        assert_eq!(recovered, sample_entries()[..2].to_vec());
    }

    #[test]
    fn test_recover_rejects_mid_file_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.journal");

        {
            let mut journal = Journal::open(path.clone(), true).unwrap();
            for entry in sample_entries() {
                journal.append(&entry).unwrap();
            }
        }

        // Flip a payload byte inside the first frame.
        let mut data = std::fs::read(&path).unwrap();
        data[5] ^= 0xFF;
        std::fs::write(&path, &data).unwrap();

        assert!(matches!(
            Journal::recover(&path),
            Err(ChronicleError::Corruption(_))
        ));
    }

    #[test]
    fn test_sync_writes_disabled_still_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nosync.journal");

        {
            let mut journal = Journal::open(path.clone(), false).unwrap();
            journal.append(&JournalEntry::Create { rid: 9 }).unwrap();
        }

        let recovered = Journal::recover(&path).unwrap();
        assert_eq!(recovered, vec![JournalEntry::Create { rid: 9 }]);
    }
}
