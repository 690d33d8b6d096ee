//! Settings service
//!
//! Exchange rates, the base currency and the other user preferences. Changes
//! are validated against the ledger: a rate still needed by a category or a
//! transaction cannot be removed.

use chrono::format::{Item, StrftimeItems};
use rust_decimal::Decimal;
use tracing::info;

use crate::audit::{AuditEntry, EntityType};
use crate::config::{OverdraftPolicy, Settings, StorageFormat};
use crate::error::{SaverError, SaverResult};
use crate::models::transaction::MAX_AMOUNT;
use crate::models::{Currency, Money};
use crate::session::Session;
use crate::storage::LedgerStore;

pub struct SettingsService<'a> {
    session: &'a mut Session,
}

impl<'a> SettingsService<'a> {
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    fn update(
        &mut self,
        label: &str,
        change: impl FnOnce(&mut Settings) -> SaverResult<()>,
    ) -> SaverResult<()> {
        let before = self.session.settings().clone();
        let mut settings = before.clone();
        change(&mut settings)?;

        if settings == before {
            return Ok(());
        }

        let entry = AuditEntry::updated(
            EntityType::Settings,
            "settings",
            Some(label.to_string()),
            &before,
            &settings,
        );
        self.session.commit_settings(settings, vec![entry])
    }

    /// Set how many units of `currency` one unit of the base currency buys
    pub fn set_rate(&mut self, currency: Currency, rate: Decimal) -> SaverResult<()> {
        let label = format!("rate {}", currency);
        self.update(&label, |s| s.exchange_rates.set_rate(currency.clone(), rate))?;
        info!(%currency, %rate, "set exchange rate");
        Ok(())
    }

    /// Remove a rate
    ///
    /// Fails with `UnknownCurrency` when a category or a transaction still
    /// uses the currency.
    pub fn remove_rate(&mut self, currency: &Currency) -> SaverResult<()> {
        let label = format!("rate {}", currency);
        self.update(&label, |s| s.exchange_rates.remove_rate(currency).map(|_| ()))?;
        info!(%currency, "removed exchange rate");
        Ok(())
    }

    /// Make another known currency the base; every rate is re-expressed
    pub fn set_base_currency(&mut self, currency: &Currency) -> SaverResult<()> {
        self.update("base currency", |s| s.exchange_rates.rebase(currency))?;
        info!(%currency, "changed base currency");
        Ok(())
    }

    /// Convert an amount with the current rates
    pub fn convert(&self, amount: Money, from: &Currency, to: &Currency) -> SaverResult<Money> {
        self.session
            .settings()
            .exchange_rates
            .convert(amount, from, to)
    }

    pub fn set_income_default(&mut self, amount: Option<Money>) -> SaverResult<()> {
        if let Some(amount) = amount {
            if !amount.is_positive() || amount > MAX_AMOUNT {
                return Err(SaverError::Validation(format!(
                    "Income default must be between 0.01 and {}, got {}",
                    MAX_AMOUNT, amount
                )));
            }
        }
        self.update("income default", |s| {
            s.income_default = amount;
            Ok(())
        })
    }

    pub fn set_overdraft_policy(&mut self, policy: OverdraftPolicy) -> SaverResult<()> {
        self.update("overdraft policy", |s| {
            s.overdraft_policy = policy;
            Ok(())
        })
    }

    /// Set the date format used for display (strftime syntax)
    pub fn set_date_format(&mut self, format: &str) -> SaverResult<()> {
        let format = format.trim();
        if format.is_empty() {
            return Err(SaverError::Validation("Date format cannot be empty".into()));
        }
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(SaverError::Validation(format!(
                "Invalid date format: {}",
                format
            )));
        }
        self.update("date format", |s| {
            s.date_format = format.to_string();
            Ok(())
        })
    }

    /// Move the ledger into a store of another format
    ///
    /// The caller provides the new store; the full snapshot is written to it
    /// before the session switches over.
    pub fn set_storage_format(
        &mut self,
        format: StorageFormat,
        store: Box<dyn LedgerStore>,
    ) -> SaverResult<()> {
        if self.session.settings().storage_format == format {
            return Ok(());
        }
        let mut settings = self.session.settings().clone();
        settings.storage_format = format;
        self.session.replace_store(store, settings)?;
        info!(?format, "changed storage format");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionKind;
    use crate::services::{CategoryService, NewTransaction, TransactionService};
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;

    fn usd() -> Currency {
        Currency::new("USD").unwrap()
    }

    fn eur() -> Currency {
        Currency::new("EUR").unwrap()
    }

    #[test]
    fn test_default_rates_convert() {
        let mut session = Session::in_memory();
        let service = SettingsService::new(&mut session);

        // 1 EUR = 1.08 USD
        let usd_amount = service
            .convert(Money::from_cents(10000), &eur(), &usd())
            .unwrap();
        assert_eq!(usd_amount, Money::from_cents(10800));
    }

    #[test]
    fn test_usd_base_round_trip() {
        let mut session = Session::in_memory();
        let mut service = SettingsService::new(&mut session);
        service.set_base_currency(&usd()).unwrap();
        service.set_rate(eur(), Decimal::new(9, 1)).unwrap();

        let eur_amount = service
            .convert(Money::from_cents(10000), &usd(), &eur())
            .unwrap();
        assert_eq!(eur_amount, Money::from_cents(9000));
        let back = service.convert(eur_amount, &eur(), &usd()).unwrap();
        assert_eq!(back, Money::from_cents(10000));
    }

    #[test]
    fn test_remove_rate_in_use_fails() {
        let mut session = Session::in_memory();
        CategoryService::new(&mut session)
            .create("Dollars", Some(usd()))
            .unwrap();

        let err = SettingsService::new(&mut session)
            .remove_rate(&usd())
            .unwrap_err();
        assert!(matches!(err, SaverError::UnknownCurrency(_)));
        assert!(session.settings().exchange_rates.contains(&usd()));
    }

    #[test]
    fn test_remove_unused_rate() {
        let mut session = Session::in_memory();
        let sek = Currency::new("SEK").unwrap();
        SettingsService::new(&mut session).remove_rate(&sek).unwrap();
        assert!(!session.settings().exchange_rates.contains(&sek));
    }

    #[test]
    fn test_rebase_keeps_grand_total_in_new_base() {
        let mut session = Session::in_memory();
        TransactionService::new(&mut session)
            .add(NewTransaction {
                date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                kind: TransactionKind::Income { category: None },
                amount: Money::from_cents(10000),
                currency: None,
                note: None,
            })
            .unwrap();

        SettingsService::new(&mut session)
            .set_base_currency(&usd())
            .unwrap();

        let totals = session.totals().unwrap();
        assert_eq!(totals.base_currency, usd());
        assert_eq!(totals.grand_total, Money::from_cents(10800));
    }

    #[test]
    fn test_date_format_validation() {
        let mut session = Session::in_memory();
        let mut service = SettingsService::new(&mut session);

        service.set_date_format("%d/%m/%Y").unwrap();
        assert!(service.set_date_format("%Y %!").unwrap_err().is_validation());
        assert_eq!(session.settings().date_format, "%d/%m/%Y");
    }

    #[test]
    fn test_income_default_and_policy() {
        let mut session = Session::in_memory();
        let mut service = SettingsService::new(&mut session);

        assert!(service
            .set_income_default(Some(Money::zero()))
            .unwrap_err()
            .is_validation());
        assert!(service
            .set_income_default(Some(Money::from_cents(i64::MAX)))
            .unwrap_err()
            .is_validation());
        service
            .set_income_default(Some(Money::from_cents(300000)))
            .unwrap();
        service
            .set_overdraft_policy(OverdraftPolicy::AllowTransfers)
            .unwrap();

        assert_eq!(
            session.settings().income_default,
            Some(Money::from_cents(300000))
        );
        assert_eq!(
            session.settings().overdraft_policy,
            OverdraftPolicy::AllowTransfers
        );
    }

    #[test]
    fn test_switch_storage_format() {
        let mut session = Session::in_memory();
        CategoryService::new(&mut session)
            .create("Travel", None)
            .unwrap();

        SettingsService::new(&mut session)
            .set_storage_format(StorageFormat::Encoded, Box::new(MemoryStore::new()))
            .unwrap();

        let stored = session.store().load_all().unwrap();
        assert_eq!(stored.settings.storage_format, StorageFormat::Encoded);
        assert_eq!(stored.ledger.categories.len(), 1);
    }
}
