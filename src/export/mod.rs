//! Export module for Budget Saver
//!
//! Turns the ledger and its totals into bytes:
//! - CSV: a spreadsheet with every transaction and a per-category summary
//! - JSON: machine-readable full dump with schema version and metadata
//! - YAML: the same dump, human-readable

pub mod csv;
pub mod json;
pub mod yaml;

use chrono::{DateTime, Utc};

use crate::config::Settings;
use crate::error::SaverResult;
use crate::models::Ledger;
use crate::reports::Totals;
use crate::session::Session;

pub use self::csv::CsvExporter;
pub use self::json::{FullExport, JsonExporter, EXPORT_SCHEMA_VERSION};
pub use self::yaml::YamlExporter;

/// Everything an exporter sees, captured at one instant
#[derive(Debug, Clone)]
pub struct ReportSnapshot {
    pub ledger: Ledger,
    pub settings: Settings,
    pub totals: Totals,
    pub exported_at: DateTime<Utc>,
}

impl ReportSnapshot {
    /// Capture the session's current state
    pub fn capture(session: &mut Session) -> SaverResult<Self> {
        let totals = session.totals()?.clone();
        Ok(Self {
            ledger: session.ledger().clone(),
            settings: session.settings().clone(),
            totals,
            exported_at: Utc::now(),
        })
    }

    /// Category name for an id, or a placeholder for the pool
    pub(crate) fn category_name(&self, id: Option<crate::models::CategoryId>) -> String {
        match id {
            None => "Pool".to_string(),
            Some(id) => self
                .ledger
                .category(id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| id.to_string()),
        }
    }
}

/// Serializes a snapshot into one file format
pub trait ReportExporter {
    fn export(&self, snapshot: &ReportSnapshot) -> SaverResult<Vec<u8>>;

    /// File extension, without the dot
    fn extension(&self) -> &'static str;
}

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Yaml,
}

impl ExportFormat {
    pub fn exporter(self) -> Box<dyn ReportExporter> {
        match self {
            Self::Csv => Box::new(CsvExporter),
            Self::Json => Box::new(JsonExporter { pretty: true }),
            Self::Yaml => Box::new(YamlExporter),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("Unknown export format: {}", other)),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::services::{CategoryService, NewTransaction, TransactionService};
    use crate::models::{Money, TransactionKind};
    use chrono::NaiveDate;

    /// A small ledger: pool income, one allocation, one expense with a note
    pub fn sample_snapshot() -> ReportSnapshot {
        let mut session = Session::in_memory();
        let travel = CategoryService::new(&mut session)
            .create("Travel", None)
            .unwrap();

        let mut service = TransactionService::new(&mut session);
        let date = |day| NaiveDate::from_ymd_opt(2025, 2, day).unwrap();
        service
            .add(NewTransaction {
                date: date(1),
                kind: TransactionKind::Income { category: None },
                amount: Money::from_cents(250000),
                currency: None,
                note: Some("Salary".to_string()),
            })
            .unwrap();
        service
            .add(NewTransaction {
                date: date(2),
                kind: TransactionKind::Allocation { category: travel.id },
                amount: Money::from_cents(40000),
                currency: None,
                note: None,
            })
            .unwrap();
        service
            .add(NewTransaction {
                date: date(3),
                kind: TransactionKind::Expense { category: Some(travel.id) },
                amount: Money::from_cents(12050),
                currency: None,
                note: Some("Train, return".to_string()),
            })
            .unwrap();

        ReportSnapshot::capture(&mut session).unwrap()
    }
}
