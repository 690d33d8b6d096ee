//! Storage layer for Budget Saver
//!
//! The ledger and the settings are loaded and saved as one snapshot through
//! the [`LedgerStore`] trait. A save either lands completely or fails with
//! [`SaverError::Persistence`]; callers never see a half-written store.

pub mod encoded;
pub mod file_io;
pub mod json_store;
pub mod memory;

pub use encoded::EncodedFileStore;
pub use file_io::{read_json, write_json_atomic};
pub use json_store::JsonFileStore;
pub use memory::MemoryStore;

use crate::config::{SaverPaths, Settings, StorageFormat};
use crate::error::SaverError;
use crate::models::Ledger;

/// Everything that is persisted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub ledger: Ledger,
    pub settings: Settings,
}

/// A place the snapshot lives between runs
pub trait LedgerStore {
    /// Load the full snapshot; an empty store yields defaults
    fn load_all(&self) -> Result<Snapshot, SaverError>;

    /// Persist the full snapshot, replacing what was stored
    fn save_all(&mut self, snapshot: &Snapshot) -> Result<(), SaverError>;

    /// Human-readable location, for `saver config`
    fn describe(&self) -> String;
}

/// Open the file store matching the configured format
pub fn open_store(paths: SaverPaths, format: StorageFormat) -> Box<dyn LedgerStore> {
    match format {
        StorageFormat::Json => Box::new(JsonFileStore::new(paths)),
        StorageFormat::Encoded => Box::new(EncodedFileStore::new(paths)),
    }
}
