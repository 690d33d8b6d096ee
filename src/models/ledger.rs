//! The ledger: every category and every transaction of one user
//!
//! This is plain data. Validation and balance rules live in the services;
//! the fold lives in `reports::totals`.

use serde::{Deserialize, Serialize};

use super::category::Category;
use super::ids::{CategoryId, TransactionId};
use super::transaction::Transaction;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub categories: Vec<Category>,

    /// Kept in insertion order; use [`Ledger::chronological`] for the fold
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn category_mut(&mut self, id: CategoryId) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.id == id)
    }

    /// Find a category by name (case-insensitive)
    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.has_name(name))
    }

    pub fn transaction(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn transaction_mut(&mut self, id: TransactionId) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|t| t.id == id)
    }

    /// Sequence number for the next added transaction
    pub fn next_seq(&self) -> u64 {
        self.transactions
            .iter()
            .map(|t| t.seq)
            .max()
            .map_or(1, |max| max + 1)
    }

    /// Transactions ordered by date, ties broken by insertion order
    pub fn chronological(&self) -> Vec<&Transaction> {
        let mut ordered: Vec<&Transaction> = self.transactions.iter().collect();
        ordered.sort_by_key(|t| t.sort_key());
        ordered
    }
}
