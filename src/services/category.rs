//! Category service
//!
//! Creating, renaming and deleting savings and expense categories,
//! allocating pool money to savings categories, and the preset notes
//! attached to each.

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::audit::{AuditEntry, EntityType};
use crate::error::{SaverError, SaverResult};
use crate::models::category::validate_name;
use crate::models::transaction::MAX_NOTE_LEN;
use crate::models::{
    Category, CategoryId, CategoryKind, Currency, Money, Transaction, TransactionKind,
};
use crate::session::Session;

use super::transaction::{NewTransaction, TransactionService};

/// Savings categories created by `saver init`
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Transport",
    "Travel",
    "Entertainment",
    "Investment",
    "Savings",
    "Others",
];

/// Expense categories created by `saver init`; names already taken by a
/// savings category are skipped
pub const DEFAULT_EXPENSE_CATEGORIES: &[&str] = &[
    "Loans",
    "Housing",
    "Transport",
    "Healthcare",
    "Shopping",
    "Entertainment",
    "Others",
];

/// Where a deleted category's money and history go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reassign {
    /// Back to the pool
    Pool,
    /// Into another category
    Category(CategoryId),
}

impl Reassign {
    fn target(self) -> Option<CategoryId> {
        match self {
            Self::Pool => None,
            Self::Category(id) => Some(id),
        }
    }
}

/// Service for category management
pub struct CategoryService<'a> {
    session: &'a mut Session,
}

impl<'a> CategoryService<'a> {
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    /// Create a new savings category
    ///
    /// The currency defaults to the base currency and must have a rate.
    pub fn create(&mut self, name: &str, currency: Option<Currency>) -> SaverResult<Category> {
        self.create_with_kind(name, currency, CategoryKind::Savings)
    }

    pub fn create_with_kind(
        &mut self,
        name: &str,
        currency: Option<Currency>,
        kind: CategoryKind,
    ) -> SaverResult<Category> {
        let name = name.trim();
        validate_name(name).map_err(|e| SaverError::Validation(e.to_string()))?;

        if self.session.ledger().category_by_name(name).is_some() {
            return Err(SaverError::Duplicate {
                entity_type: "Category",
                identifier: name.to_string(),
            });
        }

        let currency = currency.unwrap_or_else(|| self.session.settings().base_currency().clone());
        if !self.session.settings().exchange_rates.contains(&currency) {
            return Err(SaverError::UnknownCurrency(currency.to_string()));
        }

        let category = Category::with_kind(name, currency, kind);
        let mut ledger = self.session.ledger().clone();
        ledger.categories.push(category.clone());

        let entry = AuditEntry::created(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &category,
        );
        self.session.commit_ledger(ledger, vec![entry])?;

        info!(
            category = %category.name,
            currency = %category.currency,
            kind = category.kind.label(),
            "created category"
        );
        Ok(category)
    }

    /// Create the default categories whose names are still free
    pub fn create_defaults(&mut self) -> SaverResult<Vec<Category>> {
        let defaults = DEFAULT_CATEGORIES
            .iter()
            .map(|name| (*name, CategoryKind::Savings))
            .chain(
                DEFAULT_EXPENSE_CATEGORIES
                    .iter()
                    .map(|name| (*name, CategoryKind::Expense)),
            );

        let mut created = Vec::new();
        for (name, kind) in defaults {
            if self.session.ledger().category_by_name(name).is_none() {
                created.push(self.create_with_kind(name, None, kind)?);
            }
        }
        Ok(created)
    }

    /// Get a category by ID
    pub fn get(&self, id: CategoryId) -> SaverResult<Category> {
        self.session
            .ledger()
            .category(id)
            .cloned()
            .ok_or_else(|| SaverError::category_not_found(id.to_string()))
    }

    /// Find a category by name, full UUID, or short display id (`cat-1a2b3c4d`)
    pub fn find(&self, identifier: &str) -> Option<Category> {
        let ledger = self.session.ledger();
        if let Some(category) = ledger.category_by_name(identifier) {
            return Some(category.clone());
        }

        let identifier = identifier.trim();
        if let Ok(id) = identifier.parse::<CategoryId>() {
            return ledger.category(id).cloned();
        }

        ledger
            .categories
            .iter()
            .find(|c| c.id.to_string() == identifier)
            .cloned()
    }

    /// Find a category, or `NotFound`
    pub fn resolve(&self, identifier: &str) -> SaverResult<Category> {
        self.find(identifier)
            .ok_or_else(|| SaverError::category_not_found(identifier))
    }

    /// All categories with fresh balances, in creation order
    pub fn list(&mut self) -> SaverResult<Vec<Category>> {
        // Folding refreshes the stored balances
        self.session.totals()?;
        Ok(self.session.ledger().categories.clone())
    }

    /// Rename a category
    ///
    /// Renaming a category to its own name (in any case) is allowed.
    pub fn rename(&mut self, id: CategoryId, name: &str) -> SaverResult<Category> {
        let name = name.trim();
        validate_name(name).map_err(|e| SaverError::Validation(e.to_string()))?;

        if let Some(existing) = self.session.ledger().category_by_name(name) {
            if existing.id != id {
                return Err(SaverError::Duplicate {
                    entity_type: "Category",
                    identifier: name.to_string(),
                });
            }
        }

        let mut ledger = self.session.ledger().clone();
        let category = ledger
            .category_mut(id)
            .ok_or_else(|| SaverError::category_not_found(id.to_string()))?;
        let before = category.clone();
        category.rename(name);
        let after = category.clone();

        let entry = AuditEntry::updated(
            EntityType::Category,
            id.to_string(),
            Some(after.name.clone()),
            &before,
            &after,
        );
        self.session.commit_ledger(ledger, vec![entry])?;

        info!(from = %before.name, to = %after.name, "renamed category");
        Ok(after)
    }

    /// Delete a category
    ///
    /// A category holding money can only be deleted with a [`Reassign`]
    /// target. Every transaction touching the category is re-pointed at the
    /// target (the pool without one), so the money and the expense history
    /// survive. Transactions that would become self-transfers are dropped.
    pub fn delete(&mut self, id: CategoryId, reassign: Option<Reassign>) -> SaverResult<Category> {
        let category = self.get(id)?;
        let balance = self
            .session
            .totals()?
            .category(id)
            .map(|t| t.balance)
            .unwrap_or_default();

        if !balance.is_zero() && reassign.is_none() {
            return Err(SaverError::NotEmpty {
                category: category.name.clone(),
                balance,
            });
        }

        let target = reassign.and_then(Reassign::target);
        if let Some(target) = target {
            if target == id {
                return Err(SaverError::Validation(
                    "Cannot reassign a category's funds to itself".into(),
                ));
            }
            let heir = self.get(target)?;
            if heir.kind != category.kind {
                return Err(SaverError::Validation(format!(
                    "Cannot reassign {} category '{}' to {} category '{}'",
                    category.kind, category.name, heir.kind, heir.name
                )));
            }
        }

        let mut ledger = self.session.ledger().clone();
        ledger.categories.retain(|c| c.id != id);

        let now = Utc::now();
        let mut entries = Vec::new();
        let mut dropped = 0usize;
        ledger.transactions.retain_mut(|txn| {
            if !txn.references(id) {
                return true;
            }
            let before = txn.clone();
            match txn.kind.reassign(id, target) {
                Some(kind) => {
                    txn.kind = kind;
                    txn.updated_at = now;
                    entries.push(AuditEntry::updated(
                        EntityType::Transaction,
                        txn.id.to_string(),
                        None,
                        &before,
                        &*txn,
                    ));
                    true
                }
                None => {
                    dropped += 1;
                    entries.push(AuditEntry::deleted(
                        EntityType::Transaction,
                        txn.id.to_string(),
                        None,
                        &before,
                    ));
                    false
                }
            }
        });

        let mut settings = self.session.settings().clone();
        settings.preset_notes.remove(&id);

        entries.push(AuditEntry::deleted(
            EntityType::Category,
            id.to_string(),
            Some(category.name.clone()),
            &category,
        ));
        let repointed = entries.len() - 1 - dropped;
        self.session.commit(ledger, settings, entries)?;

        info!(
            category = %category.name,
            repointed,
            dropped,
            "deleted category"
        );
        Ok(category)
    }

    /// Move money from the pool into a savings category
    ///
    /// `currency` defaults to the category's currency. Fails with
    /// `InsufficientPool` when the pool holds less than the amount, and
    /// `Validation` for an expense category.
    pub fn allocate(
        &mut self,
        id: CategoryId,
        amount: Money,
        currency: Option<Currency>,
        date: NaiveDate,
    ) -> SaverResult<Transaction> {
        let category = self.get(id)?;
        if category.is_expense() {
            return Err(SaverError::Validation(format!(
                "'{}' is an expense category; only savings categories take allocations",
                category.name
            )));
        }
        let draft = NewTransaction {
            date,
            kind: TransactionKind::Allocation { category: id },
            amount,
            currency: Some(currency.unwrap_or(category.currency)),
            note: None,
        };
        TransactionService::new(self.session).add(draft)
    }

    // === Preset notes ===

    /// Preset notes of a category
    pub fn preset_notes(&self, id: CategoryId) -> SaverResult<Vec<String>> {
        self.get(id)?;
        Ok(self.session.settings().preset_notes_for(id).to_vec())
    }

    /// Add a preset note; duplicates are rejected
    pub fn add_preset_note(&mut self, id: CategoryId, note: &str) -> SaverResult<()> {
        let category = self.get(id)?;
        let note = note.trim();
        if note.is_empty() {
            return Err(SaverError::Validation("Preset note cannot be empty".into()));
        }
        if note.chars().count() > MAX_NOTE_LEN {
            return Err(SaverError::Validation(format!(
                "Preset note too long (max {} characters)",
                MAX_NOTE_LEN
            )));
        }

        let before = self.session.settings().clone();
        let mut settings = before.clone();
        let notes = settings.preset_notes.entry(id).or_default();
        if notes.iter().any(|n| n == note) {
            return Err(SaverError::Duplicate {
                entity_type: "Preset note",
                identifier: note.to_string(),
            });
        }
        notes.push(note.to_string());

        let entry = AuditEntry::updated(
            EntityType::Settings,
            "settings",
            Some(format!("preset notes for {}", category.name)),
            &before,
            &settings,
        );
        self.session.commit_settings(settings, vec![entry])
    }

    /// Remove a preset note
    pub fn remove_preset_note(&mut self, id: CategoryId, note: &str) -> SaverResult<()> {
        let category = self.get(id)?;
        let note = note.trim();

        let before = self.session.settings().clone();
        let mut settings = before.clone();
        let notes = settings.preset_notes.entry(id).or_default();
        let position = notes
            .iter()
            .position(|n| n == note)
            .ok_or_else(|| SaverError::NotFound {
                entity_type: "Preset note",
                identifier: note.to_string(),
            })?;
        notes.remove(position);
        if notes.is_empty() {
            settings.preset_notes.remove(&id);
        }

        let entry = AuditEntry::updated(
            EntityType::Settings,
            "settings",
            Some(format!("preset notes for {}", category.name)),
            &before,
            &settings,
        );
        self.session.commit_settings(settings, vec![entry])
    }
}
