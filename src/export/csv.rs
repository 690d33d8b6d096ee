//! CSV export
//!
//! Two sections in one sheet: every transaction in date order, then a
//! summary row per category followed by the pool and the grand total.
//! Amounts are plain decimals so spreadsheets read them as numbers.

use crate::error::{SaverError, SaverResult};
use crate::models::{Money, Transaction, TransactionKind};

use super::{ReportExporter, ReportSnapshot};

pub struct CsvExporter;

fn csv_error(e: impl std::fmt::Display) -> SaverError {
    SaverError::Export(e.to_string())
}

/// Source and destination columns of a transaction; empty means outside the ledger
fn endpoints(snapshot: &ReportSnapshot, txn: &Transaction) -> (String, String) {
    match txn.kind {
        TransactionKind::Income { category } => (String::new(), snapshot.category_name(category)),
        TransactionKind::Expense { category } => (snapshot.category_name(category), String::new()),
        TransactionKind::Allocation { category } => {
            (snapshot.category_name(None), snapshot.category_name(Some(category)))
        }
        TransactionKind::Transfer { from, to } => {
            (snapshot.category_name(Some(from)), snapshot.category_name(to))
        }
    }
}

fn amount(money: Money) -> String {
    money.to_string()
}

impl ReportExporter for CsvExporter {
    fn export(&self, snapshot: &ReportSnapshot) -> SaverResult<Vec<u8>> {
        let rates = &snapshot.settings.exchange_rates;
        let base = snapshot.settings.base_currency().to_string();

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());

        writer.write_record(["All Transactions"]).map_err(csv_error)?;
        writer
            .write_record([
                "Date".to_string(),
                "Type".to_string(),
                "From".to_string(),
                "To".to_string(),
                "Amount".to_string(),
                "Currency".to_string(),
                format!("Amount ({})", base),
                "Note".to_string(),
                "ID".to_string(),
            ])
            .map_err(csv_error)?;

        for txn in snapshot.ledger.chronological() {
            let (from, to) = endpoints(snapshot, txn);
            let in_base = rates.to_base(txn.amount, &txn.currency)?;
            writer
                .write_record([
                    txn.date.to_string(),
                    txn.kind.label().to_string(),
                    from,
                    to,
                    amount(txn.amount),
                    txn.currency.to_string(),
                    amount(in_base),
                    txn.note.clone().unwrap_or_default(),
                    txn.id.as_uuid().to_string(),
                ])
                .map_err(csv_error)?;
        }

        writer.write_record([""]).map_err(csv_error)?;
        writer.write_record(["Summary"]).map_err(csv_error)?;
        writer
            .write_record([
                "Category".to_string(),
                "Currency".to_string(),
                "Added".to_string(),
                "Spent".to_string(),
                "Balance".to_string(),
                format!("Balance ({})", base),
            ])
            .map_err(csv_error)?;

        let totals = &snapshot.totals;
        for category in &totals.categories {
            writer
                .write_record([
                    category.name.clone(),
                    category.currency.to_string(),
                    amount(category.added),
                    amount(category.spent),
                    amount(category.balance),
                    amount(category.balance_in_base),
                ])
                .map_err(csv_error)?;
        }

        writer
            .write_record([
                "Pool".to_string(),
                base.clone(),
                String::new(),
                String::new(),
                amount(totals.pool),
                amount(totals.pool),
            ])
            .map_err(csv_error)?;
        writer
            .write_record([
                "TOTAL".to_string(),
                base,
                amount(totals.total_income),
                amount(totals.total_expenses),
                String::new(),
                amount(totals.grand_total),
            ])
            .map_err(csv_error)?;

        writer.into_inner().map_err(csv_error)
    }

    fn extension(&self) -> &'static str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::test_support::sample_snapshot;

    fn export_text() -> String {
        let bytes = CsvExporter.export(&sample_snapshot()).unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_transaction_section() {
        let text = export_text();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "All Transactions");
        assert!(lines[1].starts_with("Date,Type,From,To,Amount,Currency,Amount (EUR)"));
        assert!(lines[2].starts_with("2025-02-01,income,,Pool,2500.00,EUR,2500.00,Salary,"));
        assert!(lines[3].starts_with("2025-02-02,allocation,Pool,Travel,400.00,EUR,400.00,,"));
        // Notes with commas are quoted
        assert!(lines[4].contains("\"Train, return\""));
    }

    #[test]
    fn test_summary_section() {
        let text = export_text();

        assert!(text.contains("Summary"));
        assert!(text.contains("Travel,EUR,400.00,120.50,279.50,279.50"));
        assert!(text.contains("Pool,EUR,,,2100.00,2100.00"));
        assert!(text.contains("TOTAL,EUR,2500.00,120.50,,2379.50"));
    }
}
