//! Transaction model
//!
//! A transaction is a dated, positive amount in some currency plus a tagged
//! kind that says which balances it moves. Signs are implied by the kind,
//! never stored on the amount.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::currency::Currency;
use super::ids::{CategoryId, TransactionId};
use super::money::Money;

/// Maximum length of a transaction note
pub const MAX_NOTE_LEN: usize = 200;

/// Largest amount a single transaction may carry (one trillion units)
pub const MAX_AMOUNT: Money = Money::from_cents(100_000_000_000_000);

/// What a transaction does to the balances
///
/// `None` in a category slot means the pool (the unallocated, expense side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in, to the pool or straight into a category
    Income {
        #[serde(default)]
        category: Option<CategoryId>,
    },
    /// Money going out, from the pool or from a category
    Expense {
        #[serde(default)]
        category: Option<CategoryId>,
    },
    /// Pool to category
    Allocation { category: CategoryId },
    /// Category to pool, or category to category
    Transfer {
        from: CategoryId,
        #[serde(default)]
        to: Option<CategoryId>,
    },
}

impl TransactionKind {
    /// Short lower-case label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Income { .. } => "income",
            Self::Expense { .. } => "expense",
            Self::Allocation { .. } => "allocation",
            Self::Transfer { .. } => "transfer",
        }
    }

    /// Every category this kind touches
    pub fn categories(&self) -> Vec<CategoryId> {
        match *self {
            Self::Income { category } | Self::Expense { category } => {
                category.into_iter().collect()
            }
            Self::Allocation { category } => vec![category],
            Self::Transfer { from, to } => std::iter::once(from).chain(to).collect(),
        }
    }

    pub fn references(&self, category: CategoryId) -> bool {
        self.categories().contains(&category)
    }

    /// Re-point every reference to `removed` at `target` (`None` = pool)
    ///
    /// Returns `None` when the rewritten kind would move money from an
    /// account to itself, which only happens for allocations re-pointed at
    /// the pool and for transfers whose two ends collapse into one.
    pub fn reassign(&self, removed: CategoryId, target: Option<CategoryId>) -> Option<Self> {
        let swap = |c: CategoryId| if c == removed { target } else { Some(c) };

        match *self {
            Self::Income { category } => Some(Self::Income {
                category: category.and_then(swap),
            }),
            Self::Expense { category } => Some(Self::Expense {
                category: category.and_then(swap),
            }),
            Self::Allocation { category } => {
                swap(category).map(|category| Self::Allocation { category })
            }
            Self::Transfer { from, to } => {
                let new_to = to.and_then(swap);
                match swap(from) {
                    Some(new_from) if Some(new_from) == new_to => None,
                    Some(new_from) => Some(Self::Transfer {
                        from: new_from,
                        to: new_to,
                    }),
                    // Pool to somewhere: an allocation, or nothing at all
                    None => new_to.map(|category| Self::Allocation { category }),
                }
            }
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The kind of a transaction without its categories, for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Allocation,
    Transfer,
}

impl TransactionKind {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Self::Income { .. } => TransactionType::Income,
            Self::Expense { .. } => TransactionType::Expense,
            Self::Allocation { .. } => TransactionType::Allocation,
            Self::Transfer { .. } => TransactionType::Transfer,
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "add" => Ok(Self::Income),
            "expense" | "spend" => Ok(Self::Expense),
            "allocation" | "allocate" => Ok(Self::Allocation),
            "transfer" => Ok(Self::Transfer),
            other => Err(format!("Unknown transaction type: {}", other)),
        }
    }
}

/// A ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// Insertion order; breaks ties between transactions on the same date
    pub seq: u64,

    /// Transaction date
    pub date: NaiveDate,

    /// Which balances move
    pub kind: TransactionKind,

    /// Amount, always positive
    pub amount: Money,

    /// Currency the amount was entered in
    pub currency: Currency,

    /// Preset or free-text note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// When the transaction was created
    pub created_at: DateTime<Utc>,

    /// When the transaction was last modified
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction; the ledger assigns `seq` when it is added
    pub fn new(date: NaiveDate, kind: TransactionKind, amount: Money, currency: Currency) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            seq: 0,
            date,
            kind,
            amount,
            currency,
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Chronological ordering key
    pub fn sort_key(&self) -> (NaiveDate, u64) {
        (self.date, self.seq)
    }

    /// Check if this transaction touches a category
    pub fn references(&self, category: CategoryId) -> bool {
        self.kind.references(category)
    }

    /// Validate the transaction on its own, without looking at the ledger
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if !self.amount.is_positive() {
            return Err(TransactionValidationError::NonPositiveAmount(self.amount));
        }
        if self.amount > MAX_AMOUNT {
            return Err(TransactionValidationError::AmountTooLarge(self.amount));
        }

        if let TransactionKind::Transfer { from, to: Some(to) } = self.kind {
            if from == to {
                return Err(TransactionValidationError::SelfTransfer);
            }
        }

        if let Some(note) = &self.note {
            let len = note.chars().count();
            if len > MAX_NOTE_LEN {
                return Err(TransactionValidationError::NoteTooLong(len));
            }
        }

        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.kind,
            self.currency.format(self.amount)
        )
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    NonPositiveAmount(Money),
    AmountTooLarge(Money),
    SelfTransfer,
    NoteTooLong(usize),
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Amount must be greater than zero, got {}", amount)
            }
            Self::AmountTooLarge(amount) => {
                write!(f, "Amount {} exceeds the maximum of {}", amount, MAX_AMOUNT)
            }
            Self::SelfTransfer => write!(f, "Cannot transfer a category to itself"),
            Self::NoteTooLong(len) => {
                write!(f, "Note too long ({} chars, max {})", len, MAX_NOTE_LEN)
            }
        }
    }
}

impl std::error::Error for TransactionValidationError {}
