//! In-memory store
//!
//! Holds the last saved snapshot without touching the disk. Used by tests,
//! and by embedders that persist the ledger somewhere else.

use crate::error::SaverError;

use super::{LedgerStore, Snapshot};

#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Option<Snapshot>,
    fail_writes: bool,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts out holding `snapshot`
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            saved: Some(snapshot),
            ..Self::default()
        }
    }

    /// A store whose every save fails, as an unreachable disk would
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl LedgerStore for MemoryStore {
    fn load_all(&self) -> Result<Snapshot, SaverError> {
        Ok(self.saved.clone().unwrap_or_default())
    }

    fn save_all(&mut self, snapshot: &Snapshot) -> Result<(), SaverError> {
        if self.fail_writes {
            return Err(SaverError::Persistence("store is unavailable".into()));
        }
        self.saved = Some(snapshot.clone());
        self.saves += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}
