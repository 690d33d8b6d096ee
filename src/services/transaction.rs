//! Transaction service
//!
//! Adds, edits and deletes ledger entries. Every mutation is checked on a
//! copy of the ledger and replayed in full before it is committed, so a
//! rejected change never touches the session.

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::audit::{AuditEntry, EntityType};
use crate::error::{SaverError, SaverResult};
use crate::models::{
    CategoryId, Currency, Ledger, Money, Transaction, TransactionId, TransactionKind,
    TransactionType,
};
use crate::session::Session;

/// Service for transaction management
pub struct TransactionService<'a> {
    session: &'a mut Session,
}

/// Options for filtering transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Only transactions touching this category
    pub category: Option<CategoryId>,
    pub kind: Option<TransactionType>,
    /// Inclusive date range start
    pub start_date: Option<NaiveDate>,
    /// Inclusive date range end
    pub end_date: Option<NaiveDate>,
    /// Keep only the most recent N
    pub limit: Option<usize>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    pub fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, txn: &Transaction) -> bool {
        self.category.map_or(true, |c| txn.references(c))
            && self.kind.map_or(true, |k| txn.kind.transaction_type() == k)
            && self.start_date.map_or(true, |start| txn.date >= start)
            && self.end_date.map_or(true, |end| txn.date <= end)
    }
}

/// Input for adding a transaction
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub amount: Money,
    /// Defaults to the base currency
    pub currency: Option<Currency>,
    pub note: Option<String>,
}

/// Fields to change on an existing transaction; `None` keeps the old value
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub date: Option<NaiveDate>,
    pub kind: Option<TransactionKind>,
    pub amount: Option<Money>,
    pub currency: Option<Currency>,
    /// `Some(None)` clears the note
    pub note: Option<Option<String>>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.kind.is_none()
            && self.amount.is_none()
            && self.currency.is_none()
            && self.note.is_none()
    }
}

fn clean_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

impl<'a> TransactionService<'a> {
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    /// Check a transaction against the ledger it is about to join
    fn check(&self, ledger: &Ledger, txn: &Transaction) -> SaverResult<()> {
        txn.validate()
            .map_err(|e| SaverError::Validation(e.to_string()))?;

        for id in txn.kind.categories() {
            if ledger.category(id).is_none() {
                return Err(SaverError::Validation(format!(
                    "Category {} does not exist",
                    id
                )));
            }
        }

        if !self.session.settings().exchange_rates.contains(&txn.currency) {
            return Err(SaverError::UnknownCurrency(txn.currency.to_string()));
        }

        Ok(())
    }

    /// Add a transaction
    pub fn add(&mut self, draft: NewTransaction) -> SaverResult<Transaction> {
        let currency = draft
            .currency
            .unwrap_or_else(|| self.session.settings().base_currency().clone());

        let mut ledger = self.session.ledger().clone();
        let mut txn = Transaction::new(draft.date, draft.kind, draft.amount, currency);
        txn.note = clean_note(draft.note);
        txn.seq = ledger.next_seq();
        self.check(&ledger, &txn)?;

        ledger.transactions.push(txn.clone());
        let entry = AuditEntry::created(
            EntityType::Transaction,
            txn.id.to_string(),
            txn.note.clone(),
            &txn,
        );
        self.session.commit_ledger(ledger, vec![entry])?;

        info!(
            id = %txn.id,
            kind = txn.kind.label(),
            amount = %txn.amount,
            currency = %txn.currency,
            "added transaction"
        );
        Ok(txn)
    }

    /// Get a transaction by ID
    pub fn get(&self, id: TransactionId) -> SaverResult<Transaction> {
        self.session
            .ledger()
            .transaction(id)
            .cloned()
            .ok_or_else(|| SaverError::transaction_not_found(id.to_string()))
    }

    /// Find a transaction by full UUID or short display id (`txn-1a2b3c4d`)
    pub fn find(&self, identifier: &str) -> Option<Transaction> {
        let ledger = self.session.ledger();
        let identifier = identifier.trim();
        if let Ok(id) = identifier.parse::<TransactionId>() {
            return ledger.transaction(id).cloned();
        }
        ledger
            .transactions
            .iter()
            .find(|t| t.id.to_string() == identifier)
            .cloned()
    }

    /// Find a transaction, or `NotFound`
    pub fn resolve(&self, identifier: &str) -> SaverResult<Transaction> {
        self.find(identifier)
            .ok_or_else(|| SaverError::transaction_not_found(identifier))
    }

    /// Matching transactions in chronological order
    ///
    /// With a limit, the most recent matches are kept.
    pub fn list(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        let mut transactions: Vec<Transaction> = self
            .session
            .ledger()
            .chronological()
            .into_iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();

        if let Some(limit) = filter.limit {
            let start = transactions.len().saturating_sub(limit);
            transactions.drain(..start);
        }

        transactions
    }

    /// Change fields of a transaction and replay the ledger
    ///
    /// Reducing income that has already been allocated fails with
    /// `InsufficientPool`, like any other edit that would overdraw.
    pub fn edit(&mut self, id: TransactionId, patch: TransactionPatch) -> SaverResult<Transaction> {
        let mut ledger = self.session.ledger().clone();
        let txn = ledger
            .transaction_mut(id)
            .ok_or_else(|| SaverError::transaction_not_found(id.to_string()))?;
        let before = txn.clone();

        if patch.is_empty() {
            return Ok(before);
        }

        if let Some(date) = patch.date {
            txn.date = date;
        }
        if let Some(kind) = patch.kind {
            txn.kind = kind;
        }
        if let Some(amount) = patch.amount {
            txn.amount = amount;
        }
        if let Some(currency) = patch.currency {
            txn.currency = currency;
        }
        if let Some(note) = patch.note {
            txn.note = clean_note(note);
        }
        txn.updated_at = Utc::now();
        let after = txn.clone();

        self.check(&ledger, &after)?;
        let entry = AuditEntry::updated(
            EntityType::Transaction,
            id.to_string(),
            after.note.clone(),
            &before,
            &after,
        );
        self.session.commit_ledger(ledger, vec![entry])?;

        info!(id = %id, "edited transaction");
        Ok(after)
    }

    /// Delete a transaction and replay the ledger
    pub fn delete(&mut self, id: TransactionId) -> SaverResult<Transaction> {
        let txn = self.get(id)?;
        let mut ledger = self.session.ledger().clone();
        ledger.transactions.retain(|t| t.id != id);

        let entry = AuditEntry::deleted(
            EntityType::Transaction,
            id.to_string(),
            txn.note.clone(),
            &txn,
        );
        self.session.commit_ledger(ledger, vec![entry])?;

        info!(id = %id, "deleted transaction");
        Ok(txn)
    }

    /// Delete every transaction touching a category; returns how many
    pub fn clear_category(&mut self, category: CategoryId) -> SaverResult<usize> {
        let name = self
            .session
            .ledger()
            .category(category)
            .map(|c| c.name.clone())
            .ok_or_else(|| SaverError::category_not_found(category.to_string()))?;

        let count = self.remove_where(|t| t.references(category))?;
        info!(category = %name, count, "cleared category history");
        Ok(count)
    }

    /// Delete every transaction; categories are kept
    pub fn clear_all(&mut self) -> SaverResult<usize> {
        let count = self.remove_where(|_| true)?;
        info!(count, "cleared all transactions");
        Ok(count)
    }

    fn remove_where(&mut self, remove: impl Fn(&Transaction) -> bool) -> SaverResult<usize> {
        let mut ledger = self.session.ledger().clone();
        let (removed, kept): (Vec<_>, Vec<_>) =
            ledger.transactions.into_iter().partition(|t| remove(t));
        ledger.transactions = kept;

        if removed.is_empty() {
            return Ok(0);
        }

        let entries = removed
            .iter()
            .map(|t| {
                AuditEntry::deleted(EntityType::Transaction, t.id.to_string(), t.note.clone(), t)
            })
            .collect();
        self.session.commit_ledger(ledger, entries)?;
        Ok(removed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverdraftPolicy;
    use crate::reports::totals::compute_totals;
    use crate::services::CategoryService;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn draft(day: u32, kind: TransactionKind, cents: i64) -> NewTransaction {
        NewTransaction {
            date: date(day),
            kind,
            amount: Money::from_cents(cents),
            currency: None,
            note: None,
        }
    }

    fn pool_income(day: u32, cents: i64) -> NewTransaction {
        draft(day, TransactionKind::Income { category: None }, cents)
    }

    fn session_with_category(name: &str) -> (Session, CategoryId) {
        let mut session = Session::in_memory();
        let id = CategoryService::new(&mut session)
            .create(name, None)
            .unwrap()
            .id;
        (session, id)
    }

    #[test]
    fn test_add_income_and_expense() {
        let mut session = Session::in_memory();
        let mut service = TransactionService::new(&mut session);

        service.add(pool_income(1, 20000)).unwrap();
        let before = session.totals().unwrap().pool;

        TransactionService::new(&mut session)
            .add(draft(2, TransactionKind::Expense { category: None }, 5000))
            .unwrap();
        assert_eq!(before - session.totals().unwrap().pool, Money::from_cents(5000));

        TransactionService::new(&mut session)
            .add(pool_income(3, 20000))
            .unwrap();
        assert_eq!(session.totals().unwrap().pool, Money::from_cents(35000));
    }

    #[test]
    fn test_add_assigns_sequence_and_default_currency() {
        let mut session = Session::in_memory();
        let mut service = TransactionService::new(&mut session);

        let first = service.add(pool_income(1, 100)).unwrap();
        let second = service.add(pool_income(1, 100)).unwrap();
        assert_eq!(first.seq, 1);
        assert_eq!(second.seq, 2);
        assert_eq!(first.currency, Currency::default());
    }

    #[test]
    fn test_add_rejects_invalid_input() {
        let mut session = Session::in_memory();
        let mut service = TransactionService::new(&mut session);

        let err = service.add(pool_income(1, 0)).unwrap_err();
        assert!(err.is_validation());

        let err = service
            .add(draft(1, TransactionKind::Expense { category: Some(CategoryId::new()) }, 100))
            .unwrap_err();
        assert!(err.is_validation());

        let mut foreign = pool_income(1, 100);
        foreign.currency = Some(Currency::new("JPY").unwrap());
        let err = service.add(foreign).unwrap_err();
        assert!(matches!(err, SaverError::UnknownCurrency(_)));

        assert!(session.ledger().transactions.is_empty());
    }

    #[test]
    fn test_expense_cannot_overdraw_category() {
        let (mut session, travel) = session_with_category("Travel");
        let mut service = TransactionService::new(&mut session);
        service
            .add(draft(1, TransactionKind::Income { category: Some(travel) }, 1000))
            .unwrap();

        let err = service
            .add(draft(2, TransactionKind::Expense { category: Some(travel) }, 1500))
            .unwrap_err();
        assert!(matches!(err, SaverError::InsufficientFunds { .. }));
    }

    #[test]
    fn test_transfer_overdraft_follows_policy() {
        let (mut session, travel) = session_with_category("Travel");
        let mut service = TransactionService::new(&mut session);
        service
            .add(draft(1, TransactionKind::Income { category: Some(travel) }, 1000))
            .unwrap();
        let transfer = draft(2, TransactionKind::Transfer { from: travel, to: None }, 1500);

        assert!(service.add(transfer.clone()).is_err());

        let mut settings = session.settings().clone();
        settings.overdraft_policy = OverdraftPolicy::AllowTransfers;
        session.commit_settings(settings, Vec::new()).unwrap();

        TransactionService::new(&mut session).add(transfer).unwrap();
        let totals = session.totals().unwrap();
        assert_eq!(totals.category(travel).unwrap().balance, Money::from_cents(-500));
        assert_eq!(totals.pool, Money::from_cents(1500));
    }

    #[test]
    fn test_add_then_delete_restores_totals() {
        let (mut session, travel) = session_with_category("Travel");
        TransactionService::new(&mut session)
            .add(pool_income(1, 50000))
            .unwrap();
        let before = session.totals().unwrap().clone();

        let txn = TransactionService::new(&mut session)
            .add(draft(2, TransactionKind::Allocation { category: travel }, 12345))
            .unwrap();
        TransactionService::new(&mut session).delete(txn.id).unwrap();

        assert_eq!(session.totals().unwrap(), &before);
    }

    #[test]
    fn test_edit_replays_ledger() {
        let (mut session, travel) = session_with_category("Travel");
        let mut service = TransactionService::new(&mut session);
        let income = service.add(pool_income(1, 50000)).unwrap();
        let expense = service
            .add(draft(2, TransactionKind::Expense { category: None }, 1000))
            .unwrap();

        service
            .edit(
                expense.id,
                TransactionPatch {
                    amount: Some(Money::from_cents(2500)),
                    note: Some(Some(" Groceries ".to_string())),
                    ..TransactionPatch::default()
                },
            )
            .unwrap();
        service
            .edit(
                income.id,
                TransactionPatch {
                    kind: Some(TransactionKind::Income { category: Some(travel) }),
                    ..TransactionPatch::default()
                },
            )
            .unwrap_err();

        let edited = service.get(expense.id).unwrap();
        assert_eq!(edited.note.as_deref(), Some("Groceries"));

        let totals = session.totals().unwrap();
        assert_eq!(totals.pool, Money::from_cents(47500));
        let fresh = compute_totals(session.ledger(), &session.settings().exchange_rates).unwrap();
        assert_eq!(&fresh, session.totals().unwrap());
    }

    #[test]
    fn test_reducing_allocated_income_fails() {
        let (mut session, travel) = session_with_category("Travel");
        let mut service = TransactionService::new(&mut session);
        let income = service.add(pool_income(1, 10000)).unwrap();
        service
            .add(draft(2, TransactionKind::Allocation { category: travel }, 8000))
            .unwrap();

        let err = service
            .edit(
                income.id,
                TransactionPatch {
                    amount: Some(Money::from_cents(5000)),
                    ..TransactionPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, SaverError::InsufficientPool { .. }));

        let err = service.delete(income.id).unwrap_err();
        assert!(matches!(err, SaverError::InsufficientPool { .. }));
        assert_eq!(service.get(income.id).unwrap().amount, Money::from_cents(10000));
    }

    /// EUR base; Trip kept in USD, funded with 100 EUR (108 USD at the
    /// default rate) and spent down to zero
    fn spent_foreign_trip() -> (Session, CategoryId, Transaction, Transaction) {
        let mut session = Session::in_memory();
        let trip = CategoryService::new(&mut session)
            .create("Trip", Some(Currency::new("USD").unwrap()))
            .unwrap()
            .id;
        let mut service = TransactionService::new(&mut session);
        service.add(pool_income(1, 10000)).unwrap();
        let allocation = service
            .add(draft(2, TransactionKind::Allocation { category: trip }, 10000))
            .unwrap();
        let mut expense = draft(3, TransactionKind::Expense { category: Some(trip) }, 10800);
        expense.currency = Some(Currency::new("USD").unwrap());
        let expense = service.add(expense).unwrap();
        (session, trip, allocation, expense)
    }

    fn usd_at_par(session: &mut Session) {
        crate::services::SettingsService::new(session)
            .set_rate(Currency::new("USD").unwrap(), rust_decimal::Decimal::ONE)
            .unwrap();
    }

    #[test]
    fn test_edit_cannot_deepen_existing_overdraft() {
        let (mut session, trip, _, expense) = spent_foreign_trip();
        assert_eq!(session.totals().unwrap().category(trip).unwrap().balance, Money::zero());

        // Repricing leaves the old expense 8 USD short; that alone is accepted
        usd_at_par(&mut session);
        assert_eq!(
            session.totals().unwrap().category(trip).unwrap().balance,
            Money::from_cents(-800)
        );

        let err = TransactionService::new(&mut session)
            .edit(
                expense.id,
                TransactionPatch {
                    amount: Some(Money::from_cents(50000)),
                    ..TransactionPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, SaverError::InsufficientFunds { .. }));
        assert_eq!(
            session.totals().unwrap().category(trip).unwrap().balance,
            Money::from_cents(-800)
        );

        // Changing the note still touches the overdrawing transaction
        let err = TransactionService::new(&mut session)
            .edit(
                expense.id,
                TransactionPatch {
                    note: Some(Some("Hotel".to_string())),
                    ..TransactionPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, SaverError::InsufficientFunds { .. }));
    }

    #[test]
    fn test_shrinking_funding_cannot_deepen_existing_overdraft() {
        let (mut session, trip, allocation, _) = spent_foreign_trip();
        usd_at_par(&mut session);

        let err = TransactionService::new(&mut session)
            .edit(
                allocation.id,
                TransactionPatch {
                    amount: Some(Money::from_cents(9000)),
                    ..TransactionPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, SaverError::InsufficientFunds { .. }));

        // Topping the category up before the expense shrinks the shortfall
        TransactionService::new(&mut session)
            .add(pool_income(1, 1000))
            .unwrap();
        TransactionService::new(&mut session)
            .add(draft(2, TransactionKind::Allocation { category: trip }, 500))
            .unwrap();
        assert_eq!(
            session.totals().unwrap().category(trip).unwrap().balance,
            Money::from_cents(-300)
        );
    }

    #[test]
    fn test_foreign_category_edit_and_delete_keep_invariant() {
        let (mut session, trip, _, expense) = spent_foreign_trip();
        let mut service = TransactionService::new(&mut session);

        service
            .edit(
                expense.id,
                TransactionPatch {
                    amount: Some(Money::from_cents(5399)),
                    ..TransactionPatch::default()
                },
            )
            .unwrap();
        let totals = session.totals().unwrap().clone();
        assert_eq!(totals.category(trip).unwrap().balance, Money::from_cents(5401));
        assert_eq!(totals.allocated() + totals.pool, totals.total_income - totals.total_expenses);

        let err = TransactionService::new(&mut session)
            .edit(
                expense.id,
                TransactionPatch {
                    amount: Some(Money::from_cents(10801)),
                    ..TransactionPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, SaverError::InsufficientFunds { .. }));

        TransactionService::new(&mut session).delete(expense.id).unwrap();
        let totals = session.totals().unwrap();
        assert_eq!(totals.category(trip).unwrap().balance, Money::from_cents(10800));
        assert_eq!(totals.allocated() + totals.pool, totals.total_income - totals.total_expenses);
    }

    #[test]
    fn test_oversized_amounts_rejected() {
        let mut session = Session::in_memory();
        let mut service = TransactionService::new(&mut session);

        let err = service
            .add(pool_income(1, 50_000_000_000_000_000))
            .unwrap_err();
        assert!(err.is_validation());

        service.add(pool_income(1, 100_000_000_000_000)).unwrap();
        assert_eq!(
            session.totals().unwrap().pool,
            Money::from_cents(100_000_000_000_000)
        );
    }

    #[test]
    fn test_missing_ids_are_not_found() {
        let mut session = Session::in_memory();
        let mut service = TransactionService::new(&mut session);
        let id = TransactionId::new();

        assert!(service.delete(id).unwrap_err().is_not_found());
        assert!(service
            .edit(id, TransactionPatch::default())
            .unwrap_err()
            .is_not_found());
        assert!(service.resolve("txn-00000000").unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_filters() {
        let (mut session, travel) = session_with_category("Travel");
        let mut service = TransactionService::new(&mut session);
        service.add(pool_income(1, 10000)).unwrap();
        service
            .add(draft(5, TransactionKind::Allocation { category: travel }, 2000))
            .unwrap();
        service
            .add(draft(9, TransactionKind::Expense { category: Some(travel) }, 500))
            .unwrap();

        assert_eq!(service.list(&TransactionFilter::new()).len(), 3);
        assert_eq!(service.list(&TransactionFilter::new().category(travel)).len(), 2);
        assert_eq!(
            service
                .list(&TransactionFilter::new().kind(TransactionType::Expense))
                .len(),
            1
        );
        assert_eq!(
            service
                .list(&TransactionFilter::new().date_range(date(2), date(8)))
                .len(),
            1
        );

        let recent = service.list(&TransactionFilter::new().limit(2));
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[1].date, date(9));
    }

    #[test]
    fn test_find_by_short_id() {
        let mut session = Session::in_memory();
        let mut service = TransactionService::new(&mut session);
        let txn = service.add(pool_income(1, 100)).unwrap();

        assert_eq!(service.find(&txn.id.to_string()).map(|t| t.id), Some(txn.id));
    }

    #[test]
    fn test_clear_category_and_all() {
        let (mut session, travel) = session_with_category("Travel");
        let mut service = TransactionService::new(&mut session);
        service.add(pool_income(1, 10000)).unwrap();
        service
            .add(draft(2, TransactionKind::Income { category: Some(travel) }, 2000))
            .unwrap();
        service
            .add(draft(3, TransactionKind::Expense { category: Some(travel) }, 500))
            .unwrap();

        assert_eq!(service.clear_category(travel).unwrap(), 2);
        assert_eq!(service.list(&TransactionFilter::new()).len(), 1);

        assert_eq!(service.clear_all().unwrap(), 1);
        assert_eq!(service.clear_all().unwrap(), 0);
        assert_eq!(session.ledger().categories.len(), 1);
        assert_eq!(session.totals().unwrap().pool, Money::zero());
    }
}
