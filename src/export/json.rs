//! JSON export
//!
//! Full dump of categories, transactions, rates and totals with schema
//! versioning.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{SaverError, SaverResult};
use crate::models::{Category, Currency, ExchangePool, Transaction};
use crate::reports::Totals;

use super::{ReportExporter, ReportSnapshot};

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full export structure
#[derive(Debug, Clone, Serialize)]
pub struct FullExport<'a> {
    /// Schema version for compatibility checking
    pub schema_version: &'static str,

    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: &'static str,

    pub base_currency: &'a Currency,

    pub exchange_rates: &'a ExchangePool,

    pub categories: &'a [Category],

    /// Chronological
    pub transactions: Vec<&'a Transaction>,

    pub totals: &'a Totals,

    pub metadata: ExportMetadata,
}

/// Export metadata for reference
#[derive(Debug, Clone, Serialize)]
pub struct ExportMetadata {
    pub transaction_count: usize,
    pub category_count: usize,
    pub earliest_transaction: Option<String>,
    pub latest_transaction: Option<String>,
}

impl<'a> FullExport<'a> {
    pub fn from_snapshot(snapshot: &'a ReportSnapshot) -> Self {
        let transactions = snapshot.ledger.chronological();

        let metadata = ExportMetadata {
            transaction_count: transactions.len(),
            category_count: snapshot.ledger.categories.len(),
            earliest_transaction: transactions.first().map(|t| t.date.to_string()),
            latest_transaction: transactions.last().map(|t| t.date.to_string()),
        };

        Self {
            schema_version: EXPORT_SCHEMA_VERSION,
            exported_at: snapshot.exported_at,
            app_version: env!("CARGO_PKG_VERSION"),
            base_currency: snapshot.settings.base_currency(),
            exchange_rates: &snapshot.settings.exchange_rates,
            categories: &snapshot.ledger.categories,
            transactions,
            totals: &snapshot.totals,
            metadata,
        }
    }
}

pub struct JsonExporter {
    pub pretty: bool,
}

impl ReportExporter for JsonExporter {
    fn export(&self, snapshot: &ReportSnapshot) -> SaverResult<Vec<u8>> {
        let export = FullExport::from_snapshot(snapshot);
        if self.pretty {
            serde_json::to_vec_pretty(&export)
        } else {
            serde_json::to_vec(&export)
        }
        .map_err(|e| SaverError::Export(e.to_string()))
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}
