use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use budget_saver::cli::{
    handle_audit_command, handle_category_command, handle_config_command,
    handle_currency_command, handle_export_command, handle_init_command, handle_notes_command,
    handle_rates_command, handle_report_command, handle_transaction_command, CategoryCommands,
    ConfigArgs, NotesCommands, RatesCommands, TransactionCommands,
};
use budget_saver::config::SaverPaths;
use budget_saver::export::ExportFormat;
use budget_saver::Session;

#[derive(Parser)]
#[command(
    name = "saver",
    author = "Kaylee Beyene",
    version,
    about = "Personal savings tracker with category buckets and multi-currency totals",
    long_about = "Budget Saver keeps a ledger of income, expenses, allocations and \
                  transfers. Money lands in a pool, gets allocated to savings \
                  categories, and every total is folded from the full history."
)]
struct Cli {
    /// Log diagnostics to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and the default categories
    Init,

    /// Show or change the configuration
    Config(ConfigArgs),

    /// Category management commands
    #[command(subcommand, alias = "cat")]
    Category(CategoryCommands),

    /// Preset notes of a category
    #[command(subcommand)]
    Notes(NotesCommands),

    /// Transaction management commands
    #[command(subcommand, alias = "transaction")]
    Txn(TransactionCommands),

    /// Exchange rate commands
    #[command(subcommand)]
    Rates(RatesCommands),

    /// Change the base currency
    Currency {
        /// Currency code (must already have a rate)
        code: String,
    },

    /// Show the totals report
    Report,

    /// Export the ledger and totals
    Export {
        /// csv, json or yaml
        format: ExportFormat,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logger(if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    });

    let paths = SaverPaths::new()?;
    let mut session = Session::open_at(&paths)?;

    match cli.command {
        Some(Commands::Init) => handle_init_command(&mut session, &paths)?,
        Some(Commands::Config(args)) => handle_config_command(&mut session, &paths, args)?,
        Some(Commands::Category(cmd)) => handle_category_command(&mut session, cmd)?,
        Some(Commands::Notes(cmd)) => handle_notes_command(&mut session, cmd)?,
        Some(Commands::Txn(cmd)) => handle_transaction_command(&mut session, cmd)?,
        Some(Commands::Rates(cmd)) => handle_rates_command(&mut session, cmd)?,
        Some(Commands::Currency { code }) => handle_currency_command(&mut session, &code)?,
        Some(Commands::Report) => handle_report_command(&mut session)?,
        Some(Commands::Export { format, output }) => {
            handle_export_command(&mut session, format, output.as_deref())?
        }
        Some(Commands::Audit { limit }) => handle_audit_command(&session, limit)?,
        None => {
            println!("Budget Saver - savings categories and multi-currency totals");
            println!();
            println!("Run 'saver --help' for usage information.");
            println!("Run 'saver init' to get started.");
        }
    }

    Ok(())
}

/// Initializes the tracing subscriber.
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        // Only this crate's events by default
        None => EnvFilter::new(format!(
            "budget_saver={},{}={}",
            level,
            env!("CARGO_CRATE_NAME"),
            level
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
