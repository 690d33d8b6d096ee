//! Init and configuration CLI commands

use clap::{Args, ValueEnum};

use crate::config::{OverdraftPolicy, SaverPaths, StorageFormat};
use crate::error::SaverResult;
use crate::services::{CategoryService, SettingsService};
use crate::session::Session;
use crate::storage::open_store;

use super::parse_money;

/// Overdraft policy options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    /// No category may go below zero
    Forbid,
    /// Transfers may take a category below zero
    AllowTransfers,
}

impl From<PolicyArg> for OverdraftPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Forbid => OverdraftPolicy::Forbid,
            PolicyArg::AllowTransfers => OverdraftPolicy::AllowTransfers,
        }
    }
}

/// Storage format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    /// Pretty JSON
    Json,
    /// Base64-encoded JSON
    Encoded,
}

impl From<FormatArg> for StorageFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => StorageFormat::Json,
            FormatArg::Encoded => StorageFormat::Encoded,
        }
    }
}

/// Options of `saver config`; without any, the current configuration is shown
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Default amount for income added without one
    #[arg(long, conflicts_with = "clear_income_default")]
    pub income_default: Option<String>,

    /// Remove the default income amount
    #[arg(long)]
    pub clear_income_default: bool,

    /// Whether transfers may overdraw a category
    #[arg(long, value_enum)]
    pub overdraft_policy: Option<PolicyArg>,

    /// Date format for display (strftime syntax, e.g. "%d/%m/%Y")
    #[arg(long)]
    pub date_format: Option<String>,

    /// How the ledger is written to disk
    #[arg(long, value_enum)]
    pub storage_format: Option<FormatArg>,
}

impl ConfigArgs {
    fn is_empty(&self) -> bool {
        self.income_default.is_none()
            && !self.clear_income_default
            && self.overdraft_policy.is_none()
            && self.date_format.is_none()
            && self.storage_format.is_none()
    }
}

/// Create the data directory, write the initial files and default categories
pub fn handle_init_command(session: &mut Session, paths: &SaverPaths) -> SaverResult<()> {
    println!("Initializing Budget Saver at: {}", paths.base_dir().display());
    paths.ensure_directories()?;
    session.save()?;

    let created = CategoryService::new(session).create_defaults()?;
    println!("Initialization complete!");

    if created.is_empty() {
        println!("All default categories already exist.");
    } else {
        println!();
        println!("Default categories have been created:");
        for category in &created {
            println!("  - {} ({})", category.name, category.kind);
        }
    }

    println!();
    println!("Run 'saver category list' to see all categories.");
    Ok(())
}

/// Show or change the configuration
pub fn handle_config_command(
    session: &mut Session,
    paths: &SaverPaths,
    args: ConfigArgs,
) -> SaverResult<()> {
    if args.is_empty() {
        print_config(session, paths);
        return Ok(());
    }

    let mut service = SettingsService::new(session);

    if let Some(amount) = args.income_default.as_deref() {
        service.set_income_default(Some(parse_money(amount)?))?;
    } else if args.clear_income_default {
        service.set_income_default(None)?;
    }

    if let Some(policy) = args.overdraft_policy {
        service.set_overdraft_policy(policy.into())?;
    }

    if let Some(format) = args.date_format.as_deref() {
        service.set_date_format(format)?;
    }

    if let Some(format) = args.storage_format {
        let format = StorageFormat::from(format);
        service.set_storage_format(format, open_store(paths.clone(), format))?;
    }

    println!("Configuration updated.");
    Ok(())
}

fn print_config(session: &Session, paths: &SaverPaths) {
    let settings = session.settings();
    let base = settings.base_currency();

    println!("Budget Saver Configuration");
    println!("==========================");
    println!("Base directory: {}", paths.base_dir().display());
    println!("Ledger store:   {}", session.store().describe());
    println!("Audit log:      {}", paths.audit_log().display());
    println!();
    println!("Settings:");
    println!("  Base currency:    {}", base);
    println!(
        "  Income default:   {}",
        settings
            .income_default
            .map(|amount| base.format(amount))
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!("  Overdraft policy: {:?}", settings.overdraft_policy);
    println!("  Date format:      {}", settings.date_format);
    println!("  Storage format:   {:?}", settings.storage_format);
}
