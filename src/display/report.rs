//! Report formatting for terminal output

use tabled::Tabled;

use crate::models::ExchangePool;
use crate::reports::Totals;

use super::render_table;

/// Format a separator line
pub fn separator(width: usize) -> String {
    "─".repeat(width)
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Category")]
    name: String,
    #[tabled(rename = "Balance")]
    balance: String,
    #[tabled(rename = "In base")]
    in_base: String,
}

#[derive(Tabled)]
struct FlowRow {
    #[tabled(rename = "Currency")]
    currency: String,
    #[tabled(rename = "Added")]
    added: String,
    #[tabled(rename = "Spent")]
    spent: String,
}

/// The full totals report: categories, pool, income, expenses, grand total
pub fn format_totals_report(totals: &Totals) -> String {
    let base = &totals.base_currency;
    let mut output = String::new();

    output.push_str(&format!("Savings report (base currency {})\n", base));
    output.push_str(&separator(40));
    output.push('\n');

    if !totals.categories.is_empty() {
        let rows: Vec<SummaryRow> = totals
            .categories
            .iter()
            .map(|c| SummaryRow {
                name: c.name.clone(),
                balance: c.currency.format(c.balance),
                in_base: base.format(c.balance_in_base),
            })
            .collect();
        output.push_str(&render_table(rows));
        output.push('\n');
    }

    output.push_str(&format!("Pool:           {}\n", base.format(totals.pool)));
    output.push_str(&format!("Allocated:      {}\n", base.format(totals.allocated())));
    output.push_str(&format!("Total income:   {}\n", base.format(totals.total_income)));
    output.push_str(&format!("Total expenses: {}\n", base.format(totals.total_expenses)));
    output.push_str(&separator(40));
    output.push('\n');
    output.push_str(&format!("Grand total:    {}\n", base.format(totals.grand_total)));

    // Only worth a table when something was entered in another currency
    if totals.by_currency.iter().any(|f| &f.currency != base) {
        let rows: Vec<FlowRow> = totals
            .by_currency
            .iter()
            .map(|f| FlowRow {
                currency: f.currency.to_string(),
                added: f.currency.format(f.added),
                spent: f.currency.format(f.spent),
            })
            .collect();
        output.push_str("\nBy currency:\n");
        output.push_str(&render_table(rows));
        output.push('\n');
    }

    output.push_str(&format!("\n{} transactions\n", totals.transaction_count));
    output
}

#[derive(Tabled)]
struct RateRow {
    #[tabled(rename = "Currency")]
    currency: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "")]
    marker: &'static str,
}

/// Exchange rates, one unit of the base buying `rate` of each currency
pub fn format_rates_table(rates: &ExchangePool) -> String {
    let rows: Vec<RateRow> = rates
        .rates()
        .iter()
        .map(|(currency, rate)| RateRow {
            currency: currency.to_string(),
            rate: rate.normalize().to_string(),
            marker: if currency == rates.base() { "base" } else { "" },
        })
        .collect();

    format!(
        "1 {} buys:\n{}\n",
        rates.base(),
        render_table(rows)
    )
}
