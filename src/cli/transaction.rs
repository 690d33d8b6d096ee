//! Transaction CLI commands
//!
//! Implements CLI commands for adding, listing, editing and clearing
//! transactions.

use clap::Subcommand;

use crate::display::transaction::{format_transaction_details, format_transaction_table};
use crate::error::{SaverError, SaverResult};
use crate::models::{CategoryId, TransactionKind, TransactionType};
use crate::services::{
    CategoryService, NewTransaction, TransactionFilter, TransactionPatch, TransactionService,
};
use crate::session::Session;

use super::{parse_currency, parse_date, parse_money};

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Add a new transaction
    Add {
        /// income, expense, allocation or transfer
        kind: TransactionType,
        /// Amount; income falls back to the configured default
        amount: Option<String>,
        /// Category for income, expenses and allocations (pool when omitted)
        #[arg(short, long)]
        category: Option<String>,
        /// Source category of a transfer
        #[arg(long)]
        from: Option<String>,
        /// Destination category of a transfer (pool when omitted)
        #[arg(long)]
        to: Option<String>,
        /// Currency code (defaults to the base currency)
        #[arg(long)]
        currency: Option<String>,
        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Free-text note
        #[arg(short, long, conflicts_with = "preset")]
        note: Option<String>,
        /// Use the Nth preset note of the category
        #[arg(short, long)]
        preset: Option<usize>,
    },

    /// List transactions
    List {
        /// Only transactions touching this category
        #[arg(short, long)]
        category: Option<String>,
        /// Only this kind
        #[arg(short, long)]
        kind: Option<TransactionType>,
        /// From date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<String>,
        /// Until date (YYYY-MM-DD)
        #[arg(long)]
        until: Option<String>,
        /// Number of transactions to show (most recent)
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show transaction details
    Show {
        /// Transaction ID
        id: String,
    },

    /// Edit a transaction
    Edit {
        /// Transaction ID
        id: String,
        /// New kind
        #[arg(short, long)]
        kind: Option<TransactionType>,
        /// New amount
        #[arg(short, long)]
        amount: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
        /// New transfer source
        #[arg(long)]
        from: Option<String>,
        /// New transfer destination
        #[arg(long)]
        to: Option<String>,
        /// New currency
        #[arg(long)]
        currency: Option<String>,
        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
        /// New note
        #[arg(short, long, conflicts_with = "clear_note")]
        note: Option<String>,
        /// Remove the note
        #[arg(long)]
        clear_note: bool,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: String,
    },

    /// Delete many transactions at once
    Clear {
        /// Every transaction touching this category
        #[arg(short, long, conflicts_with = "all")]
        category: Option<String>,
        /// Every transaction in the ledger
        #[arg(long)]
        all: bool,
    },
}

fn resolve_category(session: &mut Session, identifier: Option<&str>) -> SaverResult<Option<CategoryId>> {
    identifier
        .map(|i| CategoryService::new(session).resolve(i).map(|c| c.id))
        .transpose()
}

/// Category slots of a kind: (category, from, to)
fn kind_parts(kind: &TransactionKind) -> (Option<CategoryId>, Option<CategoryId>, Option<CategoryId>) {
    match *kind {
        TransactionKind::Income { category } | TransactionKind::Expense { category } => {
            (category, None, None)
        }
        TransactionKind::Allocation { category } => (Some(category), None, None),
        TransactionKind::Transfer { from, to } => (None, Some(from), to),
    }
}

fn build_kind(
    kind: TransactionType,
    category: Option<CategoryId>,
    from: Option<CategoryId>,
    to: Option<CategoryId>,
) -> SaverResult<TransactionKind> {
    match kind {
        TransactionType::Income => Ok(TransactionKind::Income { category }),
        TransactionType::Expense => Ok(TransactionKind::Expense { category }),
        TransactionType::Allocation => category
            .or(to)
            .map(|category| TransactionKind::Allocation { category })
            .ok_or_else(|| SaverError::Validation("An allocation needs a --category".into())),
        TransactionType::Transfer => from
            .or(category)
            .map(|from| TransactionKind::Transfer { from, to })
            .ok_or_else(|| SaverError::Validation("A transfer needs a --from category".into())),
    }
}

/// Handle a transaction command
pub fn handle_transaction_command(
    session: &mut Session,
    cmd: TransactionCommands,
) -> SaverResult<()> {
    match cmd {
        TransactionCommands::Add {
            kind,
            amount,
            category,
            from,
            to,
            currency,
            date,
            note,
            preset,
        } => {
            let amount = match (amount, kind) {
                (Some(amount), _) => parse_money(&amount)?,
                (None, TransactionType::Income) => session
                    .settings()
                    .income_default
                    .ok_or_else(|| {
                        SaverError::Validation(
                            "No amount given and no income default configured".into(),
                        )
                    })?,
                (None, _) => return Err(SaverError::Validation("An amount is required".into())),
            };

            let category = resolve_category(session, category.as_deref())?;
            let from = resolve_category(session, from.as_deref())?;
            let to = resolve_category(session, to.as_deref())?;
            let kind = build_kind(kind, category, from, to)?;

            let note = match preset {
                Some(n) => {
                    let owner = kind.categories().first().copied().ok_or_else(|| {
                        SaverError::Validation("Preset notes need a category".into())
                    })?;
                    let notes = CategoryService::new(session).preset_notes(owner)?;
                    let picked = n
                        .checked_sub(1)
                        .and_then(|i| notes.get(i))
                        .cloned()
                        .ok_or_else(|| SaverError::NotFound {
                            entity_type: "Preset note",
                            identifier: n.to_string(),
                        })?;
                    Some(picked)
                }
                None => note,
            };

            let draft = NewTransaction {
                date: parse_date(date.as_deref())?,
                kind,
                amount,
                currency: currency.as_deref().map(parse_currency).transpose()?,
                note,
            };
            let txn = TransactionService::new(session).add(draft)?;
            println!(
                "Added {} of {} [{}]",
                txn.kind,
                txn.currency.format(txn.amount),
                txn.id
            );
        }

        TransactionCommands::List {
            category,
            kind,
            since,
            until,
            limit,
        } => {
            let mut filter = TransactionFilter::new().limit(limit);
            if let Some(category) = resolve_category(session, category.as_deref())? {
                filter = filter.category(category);
            }
            if let Some(kind) = kind {
                filter = filter.kind(kind);
            }
            if since.is_some() || until.is_some() {
                let start = since
                    .as_deref()
                    .map(|s| parse_date(Some(s)))
                    .transpose()?
                    .unwrap_or(chrono::NaiveDate::MIN);
                let end = until
                    .as_deref()
                    .map(|s| parse_date(Some(s)))
                    .transpose()?
                    .unwrap_or(chrono::NaiveDate::MAX);
                filter = filter.date_range(start, end);
            }

            let transactions = TransactionService::new(session).list(&filter);
            print!(
                "{}",
                format_transaction_table(
                    &transactions,
                    session.ledger(),
                    &session.settings().date_format
                )
            );
        }

        TransactionCommands::Show { id } => {
            let txn = TransactionService::new(session).resolve(&id)?;
            print!(
                "{}",
                format_transaction_details(&txn, session.ledger(), &session.settings().date_format)
            );
        }

        TransactionCommands::Edit {
            id,
            kind,
            amount,
            category,
            from,
            to,
            currency,
            date,
            note,
            clear_note,
        } => {
            let existing = TransactionService::new(session).resolve(&id)?;

            let new_kind = if kind.is_some() || category.is_some() || from.is_some() || to.is_some()
            {
                let (old_category, old_from, old_to) = kind_parts(&existing.kind);
                let category = resolve_category(session, category.as_deref())?.or(old_category);
                let from = resolve_category(session, from.as_deref())?.or(old_from);
                let to = resolve_category(session, to.as_deref())?.or(old_to);
                let kind = kind.unwrap_or_else(|| existing.kind.transaction_type());
                Some(build_kind(kind, category, from, to)?)
            } else {
                None
            };

            let patch = TransactionPatch {
                date: date.as_deref().map(|d| parse_date(Some(d))).transpose()?,
                kind: new_kind,
                amount: amount.as_deref().map(parse_money).transpose()?,
                currency: currency.as_deref().map(parse_currency).transpose()?,
                note: if clear_note { Some(None) } else { note.map(Some) },
            };

            if patch.is_empty() {
                println!("Nothing to change.");
                return Ok(());
            }

            let txn = TransactionService::new(session).edit(existing.id, patch)?;
            println!("Updated transaction {}", txn.id);
        }

        TransactionCommands::Delete { id } => {
            let mut service = TransactionService::new(session);
            let txn = service.resolve(&id)?;
            service.delete(txn.id)?;
            println!(
                "Deleted {} of {} [{}]",
                txn.kind,
                txn.currency.format(txn.amount),
                txn.id
            );
        }

        TransactionCommands::Clear { category, all } => {
            let removed = match (category, all) {
                (Some(category), _) => {
                    let category = CategoryService::new(session).resolve(&category)?;
                    TransactionService::new(session).clear_category(category.id)?
                }
                (None, true) => TransactionService::new(session).clear_all()?,
                (None, false) => {
                    return Err(SaverError::Validation(
                        "Specify --category <name> or --all".into(),
                    ))
                }
            };
            println!("Removed {} transactions", removed);
        }
    }

    Ok(())
}
