//! Budget Saver - personal savings tracker
//!
//! This library keeps one user's ledger of income, expenses, allocations and
//! transfers. Money arrives in an unallocated pool, is allocated to savings
//! categories, and every balance is derived by folding the full history in
//! date order. Amounts in other currencies are converted through
//! user-configured exchange rates.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path resolution and user settings
//! - `error`: Custom error types
//! - `models`: Money, currencies, categories, transactions and the ledger
//! - `reports`: The balance fold and overdraft detection
//! - `session`: Owns the state; validates, persists and commits changes
//! - `services`: Category, transaction and settings operations
//! - `storage`: JSON, Base64-encoded and in-memory stores
//! - `audit`: Append-only audit log
//! - `export`: CSV, JSON and YAML exports
//! - `display`, `cli`: Terminal front-end
//!
//! # Example
//!
//! ```rust,ignore
//! use budget_saver::config::SaverPaths;
//! use budget_saver::services::CategoryService;
//! use budget_saver::Session;
//!
//! let paths = SaverPaths::new()?;
//! let mut session = Session::open_at(&paths)?;
//! CategoryService::new(&mut session).create("Travel", None)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod session;
pub mod storage;

pub use error::{SaverError, SaverResult};
pub use session::Session;
