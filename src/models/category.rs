//! Category model
//!
//! A savings category is a named bucket with a balance of its own. An
//! expense category is only a label: money spent under it comes straight
//! out of the pool, and it never holds a balance.
//!
//! Balances are derived from the transaction ledger and refreshed after
//! every mutation; the stored value is a snapshot for display and export,
//! never an input to the fold.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::currency::Currency;
use super::ids::CategoryId;
use super::money::Money;

/// Maximum length of a category name
pub const MAX_NAME_LEN: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Holds allocated money
    #[default]
    Savings,
    /// Tags spending from the pool
    Expense,
}

impl CategoryKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Savings => "savings",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,

    /// Category name (unique, case-insensitive)
    pub name: String,

    /// Currency the balance is kept in
    pub currency: Currency,

    #[serde(default)]
    pub kind: CategoryKind,

    /// Balance as of the last recompute
    #[serde(default)]
    pub balance: Money,

    /// When the category was created
    pub created_at: DateTime<Utc>,

    /// When the category was last modified
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// A new savings category with a zero balance
    pub fn new(name: impl Into<String>, currency: Currency) -> Self {
        Self::with_kind(name, currency, CategoryKind::Savings)
    }

    pub fn with_kind(name: impl Into<String>, currency: Currency, kind: CategoryKind) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            name: name.into(),
            currency,
            kind,
            balance: Money::zero(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rename the category
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.updated_at = Utc::now();
    }

    pub fn is_expense(&self) -> bool {
        self.kind == CategoryKind::Expense
    }

    /// Case-insensitive name comparison
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }

    /// Validate the category
    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        validate_name(&self.name)
    }
}

/// Check a category name without constructing a category
pub fn validate_name(name: &str) -> Result<(), CategoryValidationError> {
    if name.trim().is_empty() {
        return Err(CategoryValidationError::EmptyName);
    }

    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(CategoryValidationError::NameTooLong(len));
    }

    Ok(())
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(
                    f,
                    "Category name too long ({} chars, max {})",
                    len, MAX_NAME_LEN
                )
            }
        }
    }
}

impl std::error::Error for CategoryValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn eur() -> Currency {
        Currency::new("EUR").unwrap()
    }

    #[test]
    fn test_new_category() {
        let category = Category::new("Travel", eur());

        assert_eq!(category.name, "Travel");
        assert_eq!(category.currency, eur());
        assert!(category.balance.is_zero());
        assert_eq!(category.kind, CategoryKind::Savings);
    }

    #[test]
    fn test_expense_kind() {
        let loans = Category::with_kind("Loans", eur(), CategoryKind::Expense);
        assert!(loans.is_expense());
        assert_eq!(serde_json::to_value(&loans).unwrap()["kind"], "expense");
    }

    #[test]
    fn test_has_name_ignores_case() {
        let category = Category::new("Travel", eur());
        assert!(category.has_name("travel"));
        assert!(category.has_name(" TRAVEL "));
        assert!(!category.has_name("Transport"));
    }

    #[test]
    fn test_validation() {
        let mut category = Category::new("Valid", eur());
        assert!(category.validate().is_ok());

        category.name = "   ".to_string();
        assert_eq!(
            category.validate(),
            Err(CategoryValidationError::EmptyName)
        );

        category.name = "a".repeat(51);
        assert!(matches!(
            category.validate(),
            Err(CategoryValidationError::NameTooLong(51))
        ));
    }

    #[test]
    fn test_rename_touches_timestamp() {
        let mut category = Category::new("Old", eur());
        let created = category.updated_at;
        category.rename("New");
        assert_eq!(category.name, "New");
        assert!(category.updated_at >= created);
    }

    #[test]
    fn test_balance_defaults_when_missing() {
        let category = Category::new("Savings", eur());
        let mut json = serde_json::to_value(&category).unwrap();
        json.as_object_mut().unwrap().remove("balance");
        json.as_object_mut().unwrap().remove("kind");

        let loaded: Category = serde_json::from_value(json).unwrap();
        assert!(loaded.balance.is_zero());
        assert_eq!(loaded.kind, CategoryKind::Savings);
        assert_eq!(loaded.id, category.id);
    }
}
