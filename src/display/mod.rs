//! Display formatting for terminal output
//!
//! Tables for categories, transactions, rates and the totals report.
//! Amounts are always shown with their currency.

pub mod category;
pub mod report;
pub mod transaction;

pub use category::{format_category_details, format_category_table};
pub use report::{format_rates_table, format_totals_report};
pub use transaction::{format_transaction_details, format_transaction_table};

use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Render rows as a table in the shared style
pub(crate) fn render_table<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::modern());
    table.to_string()
}
