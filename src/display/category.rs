//! Category display formatting

use tabled::Tabled;

use crate::models::{Category, CategoryKind, Transaction};
use crate::reports::CategoryTotal;

use super::render_table;

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Currency")]
    currency: String,
    #[tabled(rename = "Added")]
    added: String,
    #[tabled(rename = "Spent")]
    spent: String,
    #[tabled(rename = "Balance")]
    balance: String,
}

impl From<&CategoryTotal> for CategoryRow {
    fn from(total: &CategoryTotal) -> Self {
        Self {
            id: total.id.to_string(),
            name: total.name.clone(),
            kind: total.kind.to_string(),
            currency: total.currency.to_string(),
            added: total.currency.format(total.added),
            spent: total.currency.format(total.spent),
            balance: if total.kind == CategoryKind::Expense {
                "-".to_string()
            } else {
                total.currency.format(total.balance)
            },
        }
    }
}

/// Format category totals as a table
pub fn format_category_table(categories: &[CategoryTotal]) -> String {
    if categories.is_empty() {
        return "No categories found.\n\nRun 'saver init' to create the default categories.\n"
            .to_string();
    }

    let rows: Vec<CategoryRow> = categories.iter().map(CategoryRow::from).collect();
    format!("{}\n", render_table(rows))
}

/// Format one category with its preset notes and recent activity
pub fn format_category_details(
    category: &Category,
    total: Option<&CategoryTotal>,
    notes: &[String],
    recent: &[Transaction],
    date_format: &str,
) -> String {
    let currency = &category.currency;
    let mut output = String::new();

    output.push_str(&format!("Category: {}\n", category.name));
    output.push_str(&format!("  ID:       {}\n", category.id));
    output.push_str(&format!("  Kind:     {}\n", category.kind));
    output.push_str(&format!("  Currency: {}\n", currency));
    if !category.is_expense() {
        output.push_str(&format!("  Balance:  {}\n", currency.format(category.balance)));
    }

    if let Some(total) = total {
        output.push_str(&format!("  Added:    {}\n", currency.format(total.added)));
        output.push_str(&format!("  Spent:    {}\n", currency.format(total.spent)));
    }

    output.push_str(&format!(
        "  Created:  {}\n",
        category.created_at.format(date_format)
    ));

    if !notes.is_empty() {
        output.push_str("\nPreset notes:\n");
        for note in notes {
            output.push_str(&format!("  - {}\n", note));
        }
    }

    if !recent.is_empty() {
        output.push_str("\nRecent transactions:\n");
        for txn in recent {
            output.push_str(&format!(
                "  {} {:<10} {:>14}  {}\n",
                txn.date.format(date_format),
                txn.kind.label(),
                txn.currency.format(txn.amount),
                txn.note.as_deref().unwrap_or("")
            ));
        }
    }

    output
}
