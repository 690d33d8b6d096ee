//! Category CLI commands
//!
//! Implements CLI commands for categories and their preset notes.

use clap::Subcommand;

use crate::display::category::{format_category_details, format_category_table};
use crate::error::{SaverError, SaverResult};
use crate::models::CategoryKind;
use crate::services::{CategoryService, Reassign, TransactionFilter, TransactionService};
use crate::session::Session;

use super::{parse_currency, parse_date, parse_money};

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List all categories with their balances
    List,

    /// Create a new category
    Create {
        /// Category name
        name: String,
        /// Currency code (defaults to the base currency)
        #[arg(short, long)]
        currency: Option<String>,
        /// Create an expense category, which tags spending from the pool
        /// instead of holding a balance
        #[arg(long)]
        expense: bool,
    },

    /// Show category details
    Show {
        /// Category name or ID
        category: String,
    },

    /// Rename a category
    Rename {
        /// Category name or ID
        category: String,
        /// New name
        name: String,
    },

    /// Delete a category
    Delete {
        /// Category name or ID
        category: String,
        /// Move the remaining balance and history back to the pool
        #[arg(long, conflicts_with = "to")]
        to_pool: bool,
        /// Move the remaining balance and history into another category
        #[arg(long)]
        to: Option<String>,
    },

    /// Move money from the pool into a category
    Allocate {
        /// Category name or ID
        category: String,
        /// Amount (e.g., "300" or "300.00")
        amount: String,
        /// Currency of the amount (defaults to the category's)
        #[arg(short, long)]
        currency: Option<String>,
        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
}

/// Preset note subcommands
#[derive(Subcommand)]
pub enum NotesCommands {
    /// List the preset notes of a category
    List {
        /// Category name or ID
        category: String,
    },

    /// Add a preset note
    Add {
        /// Category name or ID
        category: String,
        /// Note text
        note: String,
    },

    /// Remove a preset note
    Remove {
        /// Category name or ID
        category: String,
        /// Note text
        note: String,
    },
}

/// Handle a category command
pub fn handle_category_command(session: &mut Session, cmd: CategoryCommands) -> SaverResult<()> {
    match cmd {
        CategoryCommands::List => {
            let totals = session.totals()?;
            print!("{}", format_category_table(&totals.categories));
        }

        CategoryCommands::Create {
            name,
            currency,
            expense,
        } => {
            let currency = currency.as_deref().map(parse_currency).transpose()?;
            let kind = if expense {
                CategoryKind::Expense
            } else {
                CategoryKind::Savings
            };
            let category = CategoryService::new(session).create_with_kind(&name, currency, kind)?;
            println!(
                "Created {} category: {} ({}) [{}]",
                category.kind, category.name, category.currency, category.id
            );
        }

        CategoryCommands::Show { category } => {
            let category = CategoryService::new(session).resolve(&category)?;
            let notes = CategoryService::new(session).preset_notes(category.id)?;
            let recent = TransactionService::new(session)
                .list(&TransactionFilter::new().category(category.id).limit(5));

            let total = session.totals()?.category(category.id).cloned();
            // The fold refreshed the balance on the ledger's copy
            let category = session
                .ledger()
                .category(category.id)
                .cloned()
                .unwrap_or(category);
            print!(
                "{}",
                format_category_details(
                    &category,
                    total.as_ref(),
                    &notes,
                    &recent,
                    &session.settings().date_format
                )
            );
        }

        CategoryCommands::Rename { category, name } => {
            let mut service = CategoryService::new(session);
            let category = service.resolve(&category)?;
            let renamed = service.rename(category.id, &name)?;
            println!("Renamed category: {} -> {}", category.name, renamed.name);
        }

        CategoryCommands::Delete {
            category,
            to_pool,
            to,
        } => {
            let mut service = CategoryService::new(session);
            let category = service.resolve(&category)?;

            let reassign = match (to_pool, to) {
                (_, Some(target)) => {
                    let target = service.resolve(&target)?;
                    if target.id == category.id {
                        return Err(SaverError::Validation(
                            "Cannot reassign a category to itself".into(),
                        ));
                    }
                    Some(Reassign::Category(target.id))
                }
                (true, None) => Some(Reassign::Pool),
                (false, None) => None,
            };

            let deleted = service.delete(category.id, reassign)?;
            println!("Deleted category: {}", deleted.name);
        }

        CategoryCommands::Allocate {
            category,
            amount,
            currency,
            date,
        } => {
            let amount = parse_money(&amount)?;
            let currency = currency.as_deref().map(parse_currency).transpose()?;
            let date = parse_date(date.as_deref())?;

            let mut service = CategoryService::new(session);
            let category = service.resolve(&category)?;
            let txn = service.allocate(category.id, amount, currency, date)?;
            println!(
                "Allocated {} to {} [{}]",
                txn.currency.format(txn.amount),
                category.name,
                txn.id
            );

            let pool = session.totals()?.pool;
            let base = session.settings().base_currency();
            println!("Pool: {}", base.format(pool));
        }
    }

    Ok(())
}

/// Handle a preset note command
pub fn handle_notes_command(session: &mut Session, cmd: NotesCommands) -> SaverResult<()> {
    let mut service = CategoryService::new(session);

    match cmd {
        NotesCommands::List { category } => {
            let category = service.resolve(&category)?;
            let notes = service.preset_notes(category.id)?;
            if notes.is_empty() {
                println!("No preset notes for {}.", category.name);
            } else {
                println!("Preset notes for {}:", category.name);
                for (i, note) in notes.iter().enumerate() {
                    println!("  {}. {}", i + 1, note);
                }
            }
        }

        NotesCommands::Add { category, note } => {
            let category = service.resolve(&category)?;
            service.add_preset_note(category.id, &note)?;
            println!("Added preset note to {}: {}", category.name, note.trim());
        }

        NotesCommands::Remove { category, note } => {
            let category = service.resolve(&category)?;
            service.remove_preset_note(category.id, &note)?;
            println!("Removed preset note from {}: {}", category.name, note.trim());
        }
    }

    Ok(())
}
