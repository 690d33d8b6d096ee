//! Core data models for Budget Saver
//!
//! This module contains the data structures of the savings domain:
//! categories, transactions, money, currencies and exchange rates.

pub mod category;
pub mod currency;
pub mod exchange;
pub mod ids;
pub mod ledger;
pub mod money;
pub mod transaction;

pub use category::{Category, CategoryKind};
pub use currency::Currency;
pub use exchange::ExchangePool;
pub use ids::{CategoryId, TransactionId};
pub use ledger::Ledger;
pub use money::Money;
pub use transaction::{Transaction, TransactionKind, TransactionType};
