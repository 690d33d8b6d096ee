//! Error type shared by every layer of the crate
//!
//! A failed mutation never leaves partial state behind: the session only
//! adopts a candidate ledger after it has validated and been saved.

use thiserror::Error;

use crate::models::Money;

#[derive(Error, Debug)]
pub enum SaverError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),

    /// Rejected input: bad amount, bad name, missing category and so on
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Deleting a category that still has a balance, with nowhere to put it
    #[error("Category '{category}' still holds {balance}; reassign its funds before deleting")]
    NotEmpty { category: String, balance: Money },

    #[error("Insufficient funds in pool: need {needed}, have {available}")]
    InsufficientPool { needed: Money, available: Money },

    #[error("Insufficient funds in category '{category}': need {needed}, have {available}")]
    InsufficientFunds {
        category: String,
        needed: Money,
        available: Money,
    },

    /// No exchange rate is known for this code
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// The ledger store could not be read or written
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Export error: {0}")]
    Export(String),
}

impl SaverError {
    fn not_found(entity_type: &'static str, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            identifier: identifier.into(),
        }
    }

    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::not_found("Category", identifier)
    }

    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::not_found("Transaction", identifier)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for SaverError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SaverError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

pub type SaverResult<T> = Result<T, SaverError>;
