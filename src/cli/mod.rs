//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod category;
pub mod config;
pub mod export;
pub mod rates;
pub mod report;
pub mod transaction;

pub use category::{handle_category_command, handle_notes_command, CategoryCommands, NotesCommands};
pub use config::{handle_config_command, handle_init_command, ConfigArgs};
pub use export::handle_export_command;
pub use rates::{handle_currency_command, handle_rates_command, RatesCommands};
pub use report::{handle_audit_command, handle_report_command};
pub use transaction::{handle_transaction_command, TransactionCommands};

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;

use crate::error::{SaverError, SaverResult};
use crate::models::{Currency, Money};

/// Parse an amount such as `10.50`, `$10.50` or `1,200`
pub(crate) fn parse_money(input: &str) -> SaverResult<Money> {
    Money::parse(input).map_err(|e| SaverError::Validation(e.to_string()))
}

pub(crate) fn parse_currency(input: &str) -> SaverResult<Currency> {
    Currency::new(input).map_err(|e| SaverError::Validation(e.to_string()))
}

/// Parse a `YYYY-MM-DD` date, defaulting to today
pub(crate) fn parse_date(input: Option<&str>) -> SaverResult<NaiveDate> {
    match input {
        None => Ok(Local::now().date_naive()),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            SaverError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", s))
        }),
    }
}

pub(crate) fn parse_rate(input: &str) -> SaverResult<Decimal> {
    input
        .trim()
        .parse::<Decimal>()
        .map_err(|_| SaverError::Validation(format!("Invalid exchange rate: {}", input)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_money("12.50").unwrap(), Money::from_cents(1250));
        assert!(parse_money("twelve").unwrap_err().is_validation());

        assert_eq!(parse_currency("usd").unwrap().code(), "USD");
        assert!(parse_currency("dollars").is_err());

        assert_eq!(
            parse_date(Some("2025-06-30")).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
        );
        assert!(parse_date(Some("30/06/2025")).is_err());

        assert_eq!(parse_rate("1.08").unwrap(), Decimal::new(108, 2));
        assert!(parse_rate("abc").is_err());
    }
}
