//! Chronicle - Store Configuration
//! Defines tunable parameters for the record store.

use std::path::PathBuf;

/// Configuration for the Chronicle record store.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory for the journal file.
    pub data_dir: PathBuf,

    /// Whether to sync journal writes to disk immediately (fsync).
    /// Disabling widens the durability window to whatever the OS
    /// buffers; restarts may then lose the tail of recent writes.
    pub sync_writes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            sync_writes: true,
        }
    }
}

impl Config {
    /// Create a new Config with a custom data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Set whether journal writes fsync before returning.
    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    /// Ensure the data directory exists.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}
