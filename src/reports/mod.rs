//! Reports for Budget Saver
//!
//! Everything shown or exported as a total is derived here from one fold
//! over the ledger.

pub mod totals;

pub use totals::{
    compute_totals, find_overdrafts, Account, CategoryTotal, CurrencyFlow, Overdraft, Totals,
};
