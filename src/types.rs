//! Chronicle - Core Type Definitions
//! Defines the record, patch, and history types used across the store.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::{ChronicleError, Result};

/// Record identifier. Externally supplied, positive, never generated
/// by the store.
pub type RecordId = u64;

/// A record: an integer id plus its current key/value mapping.
///
/// Serializes as `{"id":<id>,"data":{...}}`, which is exactly the shape
/// the HTTP boundary returns to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub data: BTreeMap<String, String>,
}

impl Record {
    /// Create an empty record for the given id.
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            data: BTreeMap::new(),
        }
    }
}

/// One historical state of a (record, key) pair.
/// `Tombstone` marks a deletion event; it is a tagged variant internally
/// and only renders as an empty string at the query boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryValue {
    Set(String),
    Tombstone,
}

impl HistoryValue {
    /// Returns true if this entry is a deletion marker.
    pub fn is_tombstone(&self) -> bool {
        matches!(self, HistoryValue::Tombstone)
    }

    /// Render the value for clients: tombstones become the empty string.
    pub fn render(&self) -> &str {
        match self {
            HistoryValue::Set(v) => v,
            HistoryValue::Tombstone => "",
        }
    }
}

/// A merge-patch: an ordered batch of field operations.
///
/// `Some(value)` sets or overwrites a key, `None` removes it. Operations
/// are kept in the order the client sent them so that history appends are
/// reproducible; the final record state does not depend on the order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    ops: Vec<(String, Option<String>)>,
}

impl Patch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a set/overwrite operation.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ops.push((key.into(), Some(value.into())));
        self
    }

    /// Append a delete operation.
    pub fn remove(mut self, key: impl Into<String>) -> Self {
        self.ops.push((key.into(), None));
        self
    }

    /// Operations in client order.
    pub fn ops(&self) -> &[(String, Option<String>)] {
        &self.ops
    }

    /// Number of operations in the patch.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true if the patch contains no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Build a patch from a JSON object, preserving the object's own key
    /// order (`serde_json` is configured with `preserve_order`).
    /// Values must be strings or null; anything else is an `InvalidPatch`.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            ChronicleError::InvalidPatch("patch must be a JSON object".to_string())
        })?;

        let mut ops = Vec::with_capacity(obj.len());
        for (key, v) in obj {
            match v {
                serde_json::Value::String(s) => ops.push((key.clone(), Some(s.clone()))),
                serde_json::Value::Null => ops.push((key.clone(), None)),
                other => {
                    return Err(ChronicleError::InvalidPatch(format!(
                        "value for key '{}' must be a string or null, got {}",
                        key, other
                    )))
                }
            }
        }
        Ok(Self { ops })
    }
}

/// The answer to a history query, shaped for the wire:
/// `{"rid":<id>,"key":"<key>","data":{"0":"<newest>", ...}}`.
///
/// Entries are newest first, re-indexed from 0 at the most recent change.
/// Serialization is hand-written so the `data` object keeps that order
/// (string keys like "10" would sort before "2" in a plain map).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyHistory {
    pub rid: RecordId,
    pub key: String,
    pub entries: Vec<(u64, HistoryValue)>,
}

impl Serialize for KeyHistory {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        struct Entries<'a>(&'a [(u64, HistoryValue)]);

        impl Serialize for Entries<'_> {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (index, value) in self.0 {
                    map.serialize_entry(&index.to_string(), value.render())?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("rid", &self.rid)?;
        map.serialize_entry("key", &self.key)?;
        map.serialize_entry("data", &Entries(&self.entries))?;
        map.end()
    }
}
