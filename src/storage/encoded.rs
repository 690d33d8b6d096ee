//! Base64-encoded ledger store
//!
//! The ledger JSON is Base64-encoded before it is written, so the file is not
//! readable at a glance. This is obfuscation, not encryption. A ledger file
//! holding plain JSON (an older install, or a hand edit) is still accepted on
//! load and is rewritten encoded on the next save.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::config::{SaverPaths, Settings};
use crate::error::SaverError;
use crate::models::Ledger;

use super::file_io::{read_text, write_bytes_atomic, write_json_atomic};
use super::{LedgerStore, Snapshot};

pub struct EncodedFileStore {
    paths: SaverPaths,
}

impl EncodedFileStore {
    pub fn new(paths: SaverPaths) -> Self {
        Self { paths }
    }
}

/// Encode a ledger as Base64 of its JSON form
pub fn encode_ledger(ledger: &Ledger) -> Result<String, SaverError> {
    let json = serde_json::to_vec(ledger)
        .map_err(|e| SaverError::Persistence(format!("Failed to serialize ledger: {}", e)))?;
    Ok(STANDARD.encode(json))
}

/// Decode a stored ledger, accepting either Base64 or plain JSON
pub fn decode_ledger(contents: &str) -> Result<Ledger, SaverError> {
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        return Ok(Ledger::default());
    }

    if let Ok(bytes) = STANDARD.decode(trimmed) {
        if let Ok(ledger) = serde_json::from_slice(&bytes) {
            return Ok(ledger);
        }
    }

    serde_json::from_str(trimmed).map_err(|e| {
        SaverError::Persistence(format!(
            "Ledger file is neither encoded nor plain JSON: {}",
            e
        ))
    })
}

impl LedgerStore for EncodedFileStore {
    fn load_all(&self) -> Result<Snapshot, SaverError> {
        let settings = Settings::load_or_create(&self.paths)?;
        let ledger = match read_text(self.paths.encoded_ledger_file())? {
            Some(contents) => decode_ledger(&contents)?,
            None => Ledger::default(),
        };
        Ok(Snapshot { ledger, settings })
    }

    fn save_all(&mut self, snapshot: &Snapshot) -> Result<(), SaverError> {
        let encoded = encode_ledger(&snapshot.ledger)?;
        write_bytes_atomic(self.paths.encoded_ledger_file(), encoded.as_bytes())?;
        write_json_atomic(self.paths.settings_file(), &snapshot.settings)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.paths.encoded_ledger_file().display().to_string()
    }
}
