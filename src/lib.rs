//! Chronicle - Durable Record Store with Per-Field History
//!
//! A crash-recoverable record store: each record is an integer id
//! holding a string key/value mapping, mutated through merge-patches
//! (string value = set/overwrite, null = delete). Every effective field
//! change is retained in an append-only per-key history, queryable
//! newest first.
//!
//! ## Features
//! - **Merge-patch updates**: partial updates applied atomically as one batch
//! - **Per-key history**: append-only past values with deletion tombstones
//! - **Journal**: durable append-only log with CRC32 integrity checks,
//!   replayed at startup
//! - **Concurrency**: thread-safe Arc + RwLock wrapper
//! - **Metrics**: lock-free atomic counters for observability
//!
//! ## Example
//! ```no_run
//! use chronicle::{config::Config, store::RecordStore, types::Patch};
//!
//! let config = Config::default();
//! let mut store = RecordStore::open(config).unwrap();
//!
//! store.apply_patch(1, &Patch::new().set("foo", "bar")).unwrap();
//! assert_eq!(store.get(1).unwrap().data.get("foo"), Some(&"bar".to_string()));
//! ```

pub mod config;
pub mod error;
pub mod store;
pub mod types;
