//! The session: one user's ledger, settings, store and audit log
//!
//! Services borrow a `Session` mutably and never touch the store directly.
//! Every change goes through [`Session::commit_ledger`] or
//! [`Session::commit_settings`]: the candidate state is validated, saved,
//! and only then replaces the current state. A failure at any point leaves
//! the session exactly as it was.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::{SaverPaths, Settings};
use crate::error::SaverResult;
use crate::models::{Ledger, Money, TransactionId};
use crate::reports::totals::{compute_totals, find_overdrafts, Account, Overdraft, Totals};
use crate::storage::{open_store, LedgerStore, MemoryStore, Snapshot};

pub struct Session {
    ledger: Ledger,
    settings: Settings,
    store: Box<dyn LedgerStore>,
    audit: Option<AuditLogger>,
    /// `None` when the ledger or rates changed since the last fold
    totals: Option<Totals>,
}

impl Session {
    /// Load a session from a store
    pub fn open(store: Box<dyn LedgerStore>, audit: Option<AuditLogger>) -> SaverResult<Self> {
        let Snapshot { ledger, settings } = store.load_all()?;
        debug!(
            categories = ledger.categories.len(),
            transactions = ledger.transactions.len(),
            store = %store.describe(),
            "loaded ledger"
        );

        let mut session = Self {
            ledger,
            settings,
            store,
            audit,
            totals: None,
        };

        // Stored balances are only a snapshot; refresh them from the fold
        match compute_totals(&session.ledger, &session.settings.exchange_rates) {
            Ok(totals) => {
                apply_balances(&mut session.ledger, &totals);
                session.totals = Some(totals);
            }
            Err(e) => warn!(error = %e, "stored ledger does not fold cleanly"),
        }

        Ok(session)
    }

    /// Open the on-disk session described by `paths`
    ///
    /// The storage format is read from the settings file before the ledger.
    pub fn open_at(paths: &SaverPaths) -> SaverResult<Self> {
        let format = Settings::load_or_create(paths)?.storage_format;
        let store = open_store(paths.clone(), format);
        let audit = AuditLogger::new(paths.audit_log());
        Self::open(store, Some(audit))
    }

    /// A fresh session backed by memory, without an audit log
    pub fn in_memory() -> Self {
        Self {
            ledger: Ledger::default(),
            settings: Settings::default(),
            store: Box::new(MemoryStore::new()),
            audit: None,
            totals: None,
        }
    }

    /// Session over an arbitrary store, starting from the given state
    pub fn with_state(store: Box<dyn LedgerStore>, ledger: Ledger, settings: Settings) -> Self {
        Self {
            ledger,
            settings,
            store,
            audit: None,
            totals: None,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &dyn LedgerStore {
        self.store.as_ref()
    }

    pub fn audit(&self) -> Option<&AuditLogger> {
        self.audit.as_ref()
    }

    /// Current totals, folding the ledger again only if it changed
    pub fn totals(&mut self) -> SaverResult<&Totals> {
        let totals = match self.totals.take() {
            Some(totals) => totals,
            None => {
                let totals = compute_totals(&self.ledger, &self.settings.exchange_rates)?;
                apply_balances(&mut self.ledger, &totals);
                totals
            }
        };
        Ok(self.totals.insert(totals))
    }

    /// Validate, persist and adopt a new ledger and settings together
    ///
    /// Fails with `InsufficientPool` / `InsufficientFunds` when the replay of
    /// the candidate overdraws a balance in a way the current ledger, folded
    /// under the same rates and policy, does not. An overdraft the current
    /// ledger already has is tolerated only while the transaction causing
    /// it is unchanged and the shortfall does not grow. Fails with
    /// `Persistence` when the store rejects the write.
    pub fn commit(
        &mut self,
        mut ledger: Ledger,
        settings: Settings,
        audit_entries: Vec<AuditEntry>,
    ) -> SaverResult<()> {
        let rates = &settings.exchange_rates;
        let totals = compute_totals(&ledger, rates)?;

        let policy = settings.overdraft_policy;
        let existing: HashMap<(TransactionId, Account), Money> =
            find_overdrafts(&self.ledger, rates, policy)
                .unwrap_or_default()
                .into_iter()
                .map(|o| ((o.transaction, o.account), o.shortfall()))
                .collect();
        let tolerated = |o: &Overdraft| {
            let unchanged =
                self.ledger.transaction(o.transaction) == ledger.transaction(o.transaction);
            unchanged
                && existing
                    .get(&(o.transaction, o.account))
                    .is_some_and(|&shortfall| o.shortfall() <= shortfall)
        };
        if let Some(overdraft) = find_overdrafts(&ledger, rates, policy)?
            .into_iter()
            .find(|o| !tolerated(o))
        {
            return Err(overdraft.into_error(&ledger));
        }

        apply_balances(&mut ledger, &totals);
        let snapshot = Snapshot { ledger, settings };
        self.store.save_all(&snapshot)?;
        debug!(
            transactions = snapshot.ledger.transactions.len(),
            "committed ledger"
        );

        self.ledger = snapshot.ledger;
        self.settings = snapshot.settings;
        self.totals = Some(totals);
        self.record(&audit_entries);
        Ok(())
    }

    /// [`Session::commit`] with the current settings
    pub fn commit_ledger(
        &mut self,
        ledger: Ledger,
        audit_entries: Vec<AuditEntry>,
    ) -> SaverResult<()> {
        let settings = self.settings.clone();
        self.commit(ledger, settings, audit_entries)
    }

    /// [`Session::commit`] with the current ledger
    ///
    /// The ledger must still fold under the new rates, so removing the rate
    /// of a currency in use fails with `UnknownCurrency`.
    pub fn commit_settings(
        &mut self,
        settings: Settings,
        audit_entries: Vec<AuditEntry>,
    ) -> SaverResult<()> {
        let ledger = self.ledger.clone();
        self.commit(ledger, settings, audit_entries)
    }

    /// Move to another store, writing the current ledger and `settings` to it
    ///
    /// The old store is left untouched.
    pub fn replace_store(
        &mut self,
        mut store: Box<dyn LedgerStore>,
        settings: Settings,
    ) -> SaverResult<()> {
        let snapshot = Snapshot {
            ledger: self.ledger.clone(),
            settings,
        };
        store.save_all(&snapshot)?;

        let entry = AuditEntry::updated(
            EntityType::Settings,
            "settings",
            Some("storage".to_string()),
            &self.settings,
            &snapshot.settings,
        );
        debug!(store = %store.describe(), "switched store");
        self.store = store;
        self.settings = snapshot.settings;
        self.record(&[entry]);
        Ok(())
    }

    /// Write the current state to the store as is
    pub fn save(&mut self) -> SaverResult<()> {
        let snapshot = Snapshot {
            ledger: self.ledger.clone(),
            settings: self.settings.clone(),
        };
        self.store.save_all(&snapshot)
    }

    fn record(&self, entries: &[AuditEntry]) {
        if let Some(audit) = &self.audit {
            // The change is already saved; a lost audit line is not fatal
            if let Err(e) = audit.log_batch(entries) {
                warn!(error = %e, "failed to write audit log");
            }
        }
    }
}

/// Copy folded balances onto the categories
fn apply_balances(ledger: &mut Ledger, totals: &Totals) {
    for category in &mut ledger.categories {
        if let Some(total) = totals.category(category.id) {
            category.balance = total.balance;
        }
    }
}
