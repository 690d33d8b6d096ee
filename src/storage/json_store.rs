//! Plain JSON file store
//!
//! Settings go to `config.json`, categories and transactions to
//! `data/ledger.json`. Both are written atomically.

use crate::config::{SaverPaths, Settings};
use crate::error::SaverError;
use crate::models::Ledger;

use super::file_io::{read_json, write_json_atomic};
use super::{LedgerStore, Snapshot};

pub struct JsonFileStore {
    paths: SaverPaths,
}

impl JsonFileStore {
    pub fn new(paths: SaverPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &SaverPaths {
        &self.paths
    }
}

impl LedgerStore for JsonFileStore {
    fn load_all(&self) -> Result<Snapshot, SaverError> {
        let settings = Settings::load_or_create(&self.paths)?;
        let ledger: Ledger = read_json(self.paths.ledger_file())?;
        Ok(Snapshot { ledger, settings })
    }

    fn save_all(&mut self, snapshot: &Snapshot) -> Result<(), SaverError> {
        write_json_atomic(self.paths.ledger_file(), &snapshot.ledger)?;
        write_json_atomic(self.paths.settings_file(), &snapshot.settings)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.paths.ledger_file().display().to_string()
    }
}
