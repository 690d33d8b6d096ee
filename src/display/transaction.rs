//! Transaction display formatting

use tabled::Tabled;

use crate::models::{CategoryId, Ledger, Transaction, TransactionKind};

use super::render_table;

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    kind: &'static str,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Note")]
    note: String,
}

fn account_name(ledger: &Ledger, id: Option<CategoryId>) -> String {
    match id {
        None => "Pool".to_string(),
        Some(id) => ledger
            .category(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.to_string()),
    }
}

/// Where the money came from and went to; `-` is outside the ledger
fn endpoints(ledger: &Ledger, kind: &TransactionKind) -> (String, String) {
    match *kind {
        TransactionKind::Income { category } => ("-".to_string(), account_name(ledger, category)),
        TransactionKind::Expense { category } => (account_name(ledger, category), "-".to_string()),
        TransactionKind::Allocation { category } => {
            (account_name(ledger, None), account_name(ledger, Some(category)))
        }
        TransactionKind::Transfer { from, to } => {
            (account_name(ledger, Some(from)), account_name(ledger, to))
        }
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format transactions as a table, in the order given
pub fn format_transaction_table(
    transactions: &[Transaction],
    ledger: &Ledger,
    date_format: &str,
) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let rows: Vec<TransactionRow> = transactions
        .iter()
        .map(|txn| {
            let (from, to) = endpoints(ledger, &txn.kind);
            TransactionRow {
                date: txn.date.format(date_format).to_string(),
                id: txn.id.to_string(),
                kind: txn.kind.label(),
                from,
                to,
                amount: txn.currency.format(txn.amount),
                note: truncate(txn.note.as_deref().unwrap_or(""), 30),
            }
        })
        .collect();

    format!("{}\n", render_table(rows))
}

/// Format transaction details for display
pub fn format_transaction_details(txn: &Transaction, ledger: &Ledger, date_format: &str) -> String {
    let (from, to) = endpoints(ledger, &txn.kind);
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!("Date:        {}\n", txn.date.format(date_format)));
    output.push_str(&format!("Type:        {}\n", txn.kind));
    output.push_str(&format!("From:        {}\n", from));
    output.push_str(&format!("To:          {}\n", to));
    output.push_str(&format!("Amount:      {}\n", txn.currency.format(txn.amount)));

    if let Some(note) = &txn.note {
        output.push_str(&format!("Note:        {}\n", note));
    }

    output
}
