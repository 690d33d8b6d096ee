//! User settings for Budget Saver
//!
//! Manages the base currency and exchange rates, the income default and
//! quick-entry amounts, preset notes per category, the overdraft policy and
//! where the ledger is stored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::paths::SaverPaths;
use crate::error::SaverError;
use crate::models::{CategoryId, Currency, ExchangePool, Money};
use crate::storage::file_io::{read_text, write_json_atomic};

/// Whether a category balance may ever drop below zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverdraftPolicy {
    /// No category may go negative (default)
    #[default]
    Forbid,
    /// A transfer may take its source category negative; expenses never may
    AllowTransfers,
}

impl OverdraftPolicy {
    /// Whether a transfer out of a category may leave it negative
    pub fn allows_transfer_overdraft(&self) -> bool {
        matches!(self, Self::AllowTransfers)
    }
}

/// How the ledger file is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageFormat {
    /// Pretty-printed JSON (default)
    #[default]
    Json,
    /// Base64-encoded JSON, so the file is not readable at a glance
    Encoded,
}

/// User settings for Budget Saver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Base currency and the rates of every other currency against it
    #[serde(default)]
    pub exchange_rates: ExchangePool,

    /// Amount suggested when recording a salary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_default: Option<Money>,

    /// Quick-entry amounts offered by front-ends
    #[serde(default = "default_preset_amounts")]
    pub preset_amounts: Vec<Money>,

    /// Reusable notes, per category
    #[serde(default)]
    pub preset_notes: BTreeMap<CategoryId, Vec<String>>,

    /// Negative balance rule
    #[serde(default)]
    pub overdraft_policy: OverdraftPolicy,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Ledger file format
    #[serde(default)]
    pub storage_format: StorageFormat,
}

fn default_schema_version() -> u32 {
    1
}

fn default_preset_amounts() -> Vec<Money> {
    [1000, 2000, 3000, 5000]
        .into_iter()
        .map(|units| Money::from_units_cents(units, 0))
        .collect()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            exchange_rates: ExchangePool::default(),
            income_default: None,
            preset_amounts: default_preset_amounts(),
            preset_notes: BTreeMap::new(),
            overdraft_policy: OverdraftPolicy::default(),
            date_format: default_date_format(),
            storage_format: StorageFormat::default(),
        }
    }
}

impl Settings {
    /// The currency all totals are reported in
    pub fn base_currency(&self) -> &Currency {
        self.exchange_rates.base()
    }

    /// Preset notes for a category (empty if none)
    pub fn preset_notes_for(&self, category: CategoryId) -> &[String] {
        self.preset_notes
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Settings from `config.json`, or defaults when there is none yet.
    /// Nothing is written here.
    pub fn load_or_create(paths: &SaverPaths) -> Result<Self, SaverError> {
        let path = paths.settings_file();
        match read_text(&path)? {
            Some(contents) => serde_json::from_str(&contents).map_err(|e| {
                SaverError::Config(format!("Cannot parse {}: {}", path.display(), e))
            }),
            None => Ok(Settings::default()),
        }
    }

    pub fn save(&self, paths: &SaverPaths) -> Result<(), SaverError> {
        write_json_atomic(paths.settings_file(), self)
    }
}
