//! Exchange rate CLI commands

use clap::Subcommand;

use crate::display::report::format_rates_table;
use crate::error::SaverResult;
use crate::services::SettingsService;
use crate::session::Session;

use super::{parse_currency, parse_money, parse_rate};

/// Exchange rate subcommands
#[derive(Subcommand)]
pub enum RatesCommands {
    /// List all exchange rates
    List,

    /// Set how many units of a currency one unit of the base buys
    Set {
        /// Currency code
        currency: String,
        /// Rate (e.g., "1.08")
        rate: String,
    },

    /// Remove an exchange rate
    Remove {
        /// Currency code
        currency: String,
    },

    /// Convert an amount between two currencies
    Convert {
        /// Amount to convert
        amount: String,
        /// Source currency code
        from: String,
        /// Target currency code
        to: String,
    },
}

/// Handle an exchange rate command
pub fn handle_rates_command(session: &mut Session, cmd: RatesCommands) -> SaverResult<()> {
    match cmd {
        RatesCommands::List => {
            print!("{}", format_rates_table(&session.settings().exchange_rates));
        }

        RatesCommands::Set { currency, rate } => {
            let currency = parse_currency(&currency)?;
            let rate = parse_rate(&rate)?;
            SettingsService::new(session).set_rate(currency.clone(), rate)?;
            println!("Set rate: 1 {} = {} {}", session.settings().base_currency(), rate, currency);
        }

        RatesCommands::Remove { currency } => {
            let currency = parse_currency(&currency)?;
            SettingsService::new(session).remove_rate(&currency)?;
            println!("Removed rate for {}", currency);
        }

        RatesCommands::Convert { amount, from, to } => {
            let amount = parse_money(&amount)?;
            let from = parse_currency(&from)?;
            let to = parse_currency(&to)?;
            let converted = SettingsService::new(session).convert(amount, &from, &to)?;
            println!("{} = {}", from.format(amount), to.format(converted));
        }
    }

    Ok(())
}

/// Change the base currency, re-expressing every rate against it
pub fn handle_currency_command(session: &mut Session, code: &str) -> SaverResult<()> {
    let currency = parse_currency(code)?;
    SettingsService::new(session).set_base_currency(&currency)?;
    println!("Base currency is now {}", currency);
    print!("{}", format_rates_table(&session.settings().exchange_rates));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Currency;

    #[test]
    fn test_set_then_remove_rate() {
        let mut session = Session::in_memory();
        handle_rates_command(
            &mut session,
            RatesCommands::Set {
                currency: "gbp".into(),
                rate: "0.85".into(),
            },
        )
        .unwrap();
        let gbp = Currency::new("GBP").unwrap();
        assert!(session.settings().exchange_rates.contains(&gbp));

        handle_rates_command(
            &mut session,
            RatesCommands::Remove {
                currency: "GBP".into(),
            },
        )
        .unwrap();
        assert!(!session.settings().exchange_rates.contains(&gbp));
    }

    #[test]
    fn test_currency_command_rebases() {
        let mut session = Session::in_memory();
        handle_currency_command(&mut session, "USD").unwrap();
        assert_eq!(session.settings().base_currency().code(), "USD");
    }
}
