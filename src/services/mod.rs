//! Service layer for Budget Saver
//!
//! The service layer provides the bookkeeping rules on top of the session:
//! validation, replay of the ledger, and the audit trail of every change.

pub mod category;
pub mod settings;
pub mod transaction;

pub use category::{
    CategoryService, Reassign, DEFAULT_CATEGORIES, DEFAULT_EXPENSE_CATEGORIES,
};
pub use settings::SettingsService;
pub use transaction::{NewTransaction, TransactionFilter, TransactionPatch, TransactionService};
