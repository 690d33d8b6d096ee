//! Balance aggregation
//!
//! Derives the pool, per-category balances and the grand total by folding
//! the ledger in chronological order. Nothing here keeps state between
//! calls: the same ledger and rates always give the same totals.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::OverdraftPolicy;
use crate::error::{SaverError, SaverResult};
use crate::models::{
    Category, CategoryId, CategoryKind, Currency, ExchangePool, Ledger, Money, Transaction,
    TransactionId, TransactionKind,
};

/// Totals for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub id: CategoryId,
    pub name: String,
    pub kind: CategoryKind,
    /// Currency the category is kept in
    pub currency: Currency,
    /// Current balance, in the category's currency; always zero for
    /// expense categories
    pub balance: Money,
    /// The base-currency amounts that moved `balance`, summed. Each
    /// transaction is converted once, so these add up exactly with the pool
    /// to income minus expenses.
    pub balance_in_base: Money,
    /// Everything that came in: income, allocations, transfers in
    pub added: Money,
    /// Everything that went out: expenses, transfers out
    pub spent: Money,
}

/// Income and expenses entered in one currency, before conversion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyFlow {
    pub currency: Currency,
    pub added: Money,
    pub spent: Money,
}

/// Everything derived from one pass over the ledger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    /// Currency of `pool`, the income/expense totals and `grand_total`
    pub base_currency: Currency,
    /// Per category, in ledger order
    pub categories: Vec<CategoryTotal>,
    /// Unallocated money
    pub pool: Money,
    pub total_income: Money,
    pub total_expenses: Money,
    /// Pool plus every category, in the base currency
    pub grand_total: Money,
    /// Income and expenses grouped by the currency they were entered in
    pub by_currency: Vec<CurrencyFlow>,
    /// Number of transactions folded
    pub transaction_count: usize,
}

impl Totals {
    pub fn category(&self, id: CategoryId) -> Option<&CategoryTotal> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Sum of every category balance in the base currency
    pub fn allocated(&self) -> Money {
        self.grand_total - self.pool
    }
}

/// A balance a fold can move
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Account {
    Pool,
    Category(CategoryId),
}

/// A step of the fold that left a balance below zero
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overdraft {
    pub transaction: TransactionId,
    pub account: Account,
    /// Amount the step took out
    pub needed: Money,
    /// Balance just before the step
    pub available: Money,
}

impl Overdraft {
    /// How far below zero the step took the balance
    pub fn shortfall(&self) -> Money {
        self.needed
            .checked_sub(self.available)
            .unwrap_or(Money::from_cents(i64::MAX))
    }

    /// The user-facing error for this overdraft
    pub fn into_error(self, ledger: &Ledger) -> SaverError {
        match self.account {
            Account::Pool => SaverError::InsufficientPool {
                needed: self.needed,
                available: self.available,
            },
            Account::Category(id) => SaverError::InsufficientFunds {
                category: ledger
                    .category(id)
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| id.to_string()),
                needed: self.needed,
                available: self.available,
            },
        }
    }
}

fn overflow() -> SaverError {
    SaverError::Validation("Totals exceed the representable range".into())
}

fn plus(a: Money, b: Money) -> SaverResult<Money> {
    a.checked_add(b).ok_or_else(overflow)
}

fn minus(a: Money, b: Money) -> SaverResult<Money> {
    a.checked_sub(b).ok_or_else(overflow)
}

#[derive(Debug, Clone, Default)]
struct CategoryState {
    balance: Money,
    balance_in_base: Money,
    added: Money,
    spent: Money,
}

/// Running balances of one fold
struct Fold<'a> {
    ledger: &'a Ledger,
    rates: &'a ExchangePool,
    categories: BTreeMap<CategoryId, CategoryState>,
    pool: Money,
    total_income: Money,
    total_expenses: Money,
    flows: BTreeMap<Currency, (Money, Money)>,
}

impl<'a> Fold<'a> {
    fn new(ledger: &'a Ledger, rates: &'a ExchangePool) -> Self {
        Self {
            ledger,
            rates,
            categories: ledger
                .categories
                .iter()
                .map(|c| (c.id, CategoryState::default()))
                .collect(),
            pool: Money::zero(),
            total_income: Money::zero(),
            total_expenses: Money::zero(),
            flows: BTreeMap::new(),
        }
    }

    fn lookup(&self, id: CategoryId) -> SaverResult<&'a Category> {
        self.ledger
            .category(id)
            .ok_or_else(|| SaverError::category_not_found(id.to_string()))
    }

    /// A category that can hold money; expense categories cannot
    fn savings(&self, id: CategoryId) -> SaverResult<&'a Category> {
        let category = self.lookup(id)?;
        if category.is_expense() {
            return Err(SaverError::Validation(format!(
                "'{}' is an expense category and cannot hold a balance",
                category.name
            )));
        }
        Ok(category)
    }

    /// The transaction's amount expressed in a category's currency
    fn in_currency_of(&self, txn: &Transaction, category: &Category) -> SaverResult<Money> {
        self.rates
            .convert(txn.amount, &txn.currency, &category.currency)
    }

    fn state(&mut self, id: CategoryId) -> SaverResult<&mut CategoryState> {
        self.categories
            .get_mut(&id)
            .ok_or_else(|| SaverError::category_not_found(id.to_string()))
    }

    fn credit(&mut self, txn: &Transaction, id: CategoryId, base: Money) -> SaverResult<()> {
        let category = self.savings(id)?;
        let amount = self.in_currency_of(txn, category)?;
        let state = self.state(id)?;
        state.balance = plus(state.balance, amount)?;
        state.balance_in_base = plus(state.balance_in_base, base)?;
        state.added = plus(state.added, amount)?;
        Ok(())
    }

    /// Take money out of a category; returns (amount taken, balance before)
    fn debit(
        &mut self,
        txn: &Transaction,
        id: CategoryId,
        base: Money,
    ) -> SaverResult<(Money, Money)> {
        let category = self.savings(id)?;
        let amount = self.in_currency_of(txn, category)?;
        let state = self.state(id)?;
        let before = state.balance;
        state.balance = minus(state.balance, amount)?;
        state.balance_in_base = minus(state.balance_in_base, base)?;
        state.spent = plus(state.spent, amount)?;
        Ok((amount, before))
    }

    /// Tally income or spending under an expense category, which only
    /// records the flow; the money itself moves through the pool
    fn tag(&mut self, txn: &Transaction, id: CategoryId, incoming: bool) -> SaverResult<()> {
        let category = self.lookup(id)?;
        let amount = self.in_currency_of(txn, category)?;
        let state = self.state(id)?;
        if incoming {
            state.added = plus(state.added, amount)?;
        } else {
            state.spent = plus(state.spent, amount)?;
        }
        Ok(())
    }

    fn is_expense_category(&self, category: Option<CategoryId>) -> SaverResult<bool> {
        match category {
            Some(id) => Ok(self.lookup(id)?.is_expense()),
            None => Ok(false),
        }
    }

    fn flow(&mut self, currency: &Currency, incoming: bool, amount: Money) -> SaverResult<()> {
        let flow = self.flows.entry(currency.clone()).or_default();
        if incoming {
            flow.0 = plus(flow.0, amount)?;
        } else {
            flow.1 = plus(flow.1, amount)?;
        }
        Ok(())
    }

    /// Apply one transaction; returns every balance it decreased below zero
    fn apply(&mut self, txn: &Transaction) -> SaverResult<Vec<Overdraft>> {
        let base = self.rates.to_base(txn.amount, &txn.currency)?;
        let mut overdrafts = Vec::new();
        let mut check = |account: Account, needed: Money, before: Money| {
            if needed > before {
                overdrafts.push(Overdraft {
                    transaction: txn.id,
                    account,
                    needed,
                    available: before,
                });
            }
        };

        match txn.kind {
            TransactionKind::Income { category } => {
                self.total_income = plus(self.total_income, base)?;
                self.flow(&txn.currency, true, txn.amount)?;
                match category {
                    Some(id) if self.is_expense_category(category)? => {
                        self.tag(txn, id, true)?;
                        self.pool = plus(self.pool, base)?;
                    }
                    Some(id) => self.credit(txn, id, base)?,
                    None => self.pool = plus(self.pool, base)?,
                }
            }
            TransactionKind::Expense { category } => {
                self.total_expenses = plus(self.total_expenses, base)?;
                self.flow(&txn.currency, false, txn.amount)?;
                match category {
                    Some(id) if !self.is_expense_category(category)? => {
                        let (amount, before) = self.debit(txn, id, base)?;
                        check(Account::Category(id), amount, before);
                    }
                    tagged => {
                        if let Some(id) = tagged {
                            self.tag(txn, id, false)?;
                        }
                        let before = self.pool;
                        self.pool = minus(self.pool, base)?;
                        check(Account::Pool, base, before);
                    }
                }
            }
            TransactionKind::Allocation { category } => {
                let before = self.pool;
                self.pool = minus(self.pool, base)?;
                check(Account::Pool, base, before);
                self.credit(txn, category, base)?;
            }
            TransactionKind::Transfer { from, to } => {
                let (amount, before) = self.debit(txn, from, base)?;
                check(Account::Category(from), amount, before);
                match to {
                    Some(to) => self.credit(txn, to, base)?,
                    None => self.pool = plus(self.pool, base)?,
                }
            }
        }

        Ok(overdrafts)
    }

    fn finish(self) -> SaverResult<Totals> {
        let mut categories = Vec::with_capacity(self.ledger.categories.len());
        let mut grand_total = self.pool;
        for category in &self.ledger.categories {
            let state = self
                .categories
                .get(&category.id)
                .cloned()
                .unwrap_or_default();
            grand_total = plus(grand_total, state.balance_in_base)?;
            categories.push(CategoryTotal {
                id: category.id,
                name: category.name.clone(),
                kind: category.kind,
                currency: category.currency.clone(),
                balance: state.balance,
                balance_in_base: state.balance_in_base,
                added: state.added,
                spent: state.spent,
            });
        }

        Ok(Totals {
            base_currency: self.rates.base().clone(),
            categories,
            pool: self.pool,
            total_income: self.total_income,
            total_expenses: self.total_expenses,
            grand_total,
            by_currency: self
                .flows
                .into_iter()
                .map(|(currency, (added, spent))| CurrencyFlow {
                    currency,
                    added,
                    spent,
                })
                .collect(),
            transaction_count: self.ledger.transactions.len(),
        })
    }
}

fn fold(ledger: &Ledger, rates: &ExchangePool) -> SaverResult<(Totals, Vec<Overdraft>)> {
    let mut state = Fold::new(ledger, rates);
    let mut overdrafts = Vec::new();
    for txn in ledger.chronological() {
        overdrafts.extend(state.apply(txn)?);
    }
    Ok((state.finish()?, overdrafts))
}

/// Fold the whole ledger into totals
///
/// Fails with `UnknownCurrency` when a transaction or category uses a
/// currency without a rate, `NotFound` when a transaction references a
/// category the ledger doesn't have, and `Validation` when money is moved
/// into or out of an expense category or a running total overflows.
pub fn compute_totals(ledger: &Ledger, rates: &ExchangePool) -> SaverResult<Totals> {
    fold(ledger, rates).map(|(totals, _)| totals)
}

/// Every step of the fold that the overdraft policy forbids
///
/// The pool may never go negative. A category may only go negative through
/// a transfer, and only under [`OverdraftPolicy::AllowTransfers`].
pub fn find_overdrafts(
    ledger: &Ledger,
    rates: &ExchangePool,
    policy: OverdraftPolicy,
) -> SaverResult<Vec<Overdraft>> {
    let (_, overdrafts) = fold(ledger, rates)?;
    Ok(overdrafts
        .into_iter()
        .filter(|o| match o.account {
            Account::Pool => true,
            Account::Category(_) => {
                let by_transfer = ledger
                    .transaction(o.transaction)
                    .is_some_and(|t| matches!(t.kind, TransactionKind::Transfer { .. }));
                !(by_transfer && policy.allows_transfer_overdraft())
            }
        })
        .collect())
}
