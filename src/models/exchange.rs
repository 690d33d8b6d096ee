//! Exchange rates and currency conversion
//!
//! Rates are user-maintained scalars: each entry says how many units of a
//! currency one unit of the base currency buys. The base therefore always
//! has rate 1. Nothing is fetched live.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::currency::Currency;
use super::money::Money;
use crate::error::{SaverError, SaverResult};

/// Mapping from currency code to its rate relative to the base currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangePool {
    base: Currency,
    rates: BTreeMap<Currency, Decimal>,
}

impl ExchangePool {
    /// Create a pool containing only the base currency
    pub fn new(base: Currency) -> Self {
        let mut rates = BTreeMap::new();
        rates.insert(base.clone(), Decimal::ONE);
        Self { base, rates }
    }

    /// The currency every rate is relative to
    pub fn base(&self) -> &Currency {
        &self.base
    }

    /// All rates, ordered by currency code
    pub fn rates(&self) -> &BTreeMap<Currency, Decimal> {
        &self.rates
    }

    pub fn contains(&self, currency: &Currency) -> bool {
        self.rates.contains_key(currency)
    }

    /// Rate for a currency, or `UnknownCurrency`
    pub fn rate(&self, currency: &Currency) -> SaverResult<Decimal> {
        self.rates
            .get(currency)
            .copied()
            .ok_or_else(|| SaverError::UnknownCurrency(currency.to_string()))
    }

    /// Set or replace a rate
    ///
    /// Rates must be positive. The base currency's rate is fixed at 1; use
    /// [`ExchangePool::rebase`] to change the base.
    pub fn set_rate(&mut self, currency: Currency, rate: Decimal) -> SaverResult<()> {
        if rate <= Decimal::ZERO {
            return Err(SaverError::Validation(format!(
                "Exchange rate for {} must be positive, got {}",
                currency, rate
            )));
        }
        if currency == self.base && rate != Decimal::ONE {
            return Err(SaverError::Validation(format!(
                "{} is the base currency; its rate is always 1",
                currency
            )));
        }
        self.rates.insert(currency, rate);
        Ok(())
    }

    /// Remove a rate. The base currency cannot be removed.
    pub fn remove_rate(&mut self, currency: &Currency) -> SaverResult<Decimal> {
        if *currency == self.base {
            return Err(SaverError::Validation(format!(
                "Cannot remove the base currency {}",
                currency
            )));
        }
        self.rates
            .remove(currency)
            .ok_or_else(|| SaverError::UnknownCurrency(currency.to_string()))
    }

    /// Re-express every rate relative to a new base currency
    pub fn rebase(&mut self, new_base: &Currency) -> SaverResult<()> {
        let pivot = self.rate(new_base)?;
        for rate in self.rates.values_mut() {
            *rate /= pivot;
        }
        self.rates.insert(new_base.clone(), Decimal::ONE);
        self.base = new_base.clone();
        Ok(())
    }

    /// Convert an amount between two currencies
    ///
    /// `amount / rate(from) * rate(to)`, rounded to the nearest cent.
    pub fn convert(&self, amount: Money, from: &Currency, to: &Currency) -> SaverResult<Money> {
        let from_rate = self.rate(from)?;
        let to_rate = self.rate(to)?;
        if from == to {
            return Ok(amount);
        }

        let converted = amount.to_decimal() / from_rate * to_rate;
        Money::from_decimal(converted).ok_or_else(|| {
            SaverError::Validation(format!(
                "Converted amount {} {} is out of range",
                converted, to
            ))
        })
    }

    /// Convert an amount into the base currency
    pub fn to_base(&self, amount: Money, from: &Currency) -> SaverResult<Money> {
        self.convert(amount, from, &self.base)
    }
}

impl Default for ExchangePool {
    /// EUR base with the rates the app ships with
    fn default() -> Self {
        let mut pool = Self::new(Currency::default());
        for (code, rate) in [("USD", Decimal::new(108, 2)), ("SEK", Decimal::new(115, 1))] {
            if let Ok(currency) = Currency::new(code) {
                pool.rates.insert(currency, rate);
            }
        }
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn cur(code: &str) -> Currency {
        Currency::new(code).unwrap()
    }

    fn usd_eur() -> ExchangePool {
        let mut pool = ExchangePool::new(cur("USD"));
        pool.set_rate(cur("EUR"), Decimal::from_str("0.9").unwrap())
            .unwrap();
        pool
    }

    #[test]
    fn test_convert_examples() {
        let pool = usd_eur();
        let to_eur = pool
            .convert(Money::from_cents(10000), &cur("USD"), &cur("EUR"))
            .unwrap();
        assert_eq!(to_eur, Money::from_cents(9000));

        let back = pool.convert(to_eur, &cur("EUR"), &cur("USD")).unwrap();
        assert_eq!(back, Money::from_cents(10000));
    }

    #[test]
    fn test_round_trip_within_a_cent() {
        let mut pool = ExchangePool::new(cur("EUR"));
        pool.set_rate(cur("SEK"), Decimal::from_str("11.5").unwrap())
            .unwrap();
        pool.set_rate(cur("USD"), Decimal::from_str("1.08").unwrap())
            .unwrap();

        for cents in [1, 99, 1234, 98765, 1_000_001] {
            let x = Money::from_cents(cents);
            let there = pool.convert(x, &cur("USD"), &cur("SEK")).unwrap();
            let back = pool.convert(there, &cur("SEK"), &cur("USD")).unwrap();
            assert!((back - x).abs() <= Money::from_cents(1), "{} -> {}", x, back);
        }
    }

    #[test]
    fn test_unknown_currency() {
        let pool = usd_eur();
        let err = pool
            .convert(Money::from_cents(100), &cur("USD"), &cur("JPY"))
            .unwrap_err();
        assert!(matches!(err, SaverError::UnknownCurrency(code) if code == "JPY"));

        // Even the identity conversion needs a known code
        assert!(pool
            .convert(Money::from_cents(100), &cur("JPY"), &cur("JPY"))
            .is_err());
    }

    #[test]
    fn test_rates_must_be_positive() {
        let mut pool = usd_eur();
        assert!(pool.set_rate(cur("SEK"), Decimal::ZERO).is_err());
        assert!(pool.set_rate(cur("SEK"), Decimal::from(-3)).is_err());
        assert!(pool.set_rate(cur("USD"), Decimal::from(2)).is_err());
    }

    #[test]
    fn test_remove_rate() {
        let mut pool = usd_eur();
        assert!(pool.remove_rate(&cur("USD")).is_err());
        pool.remove_rate(&cur("EUR")).unwrap();
        assert!(!pool.contains(&cur("EUR")));
    }

    #[test]
    fn test_rebase_preserves_conversions() {
        let mut pool = ExchangePool::default();
        let before = pool
            .convert(Money::from_cents(5000), &cur("SEK"), &cur("USD"))
            .unwrap();

        pool.rebase(&cur("USD")).unwrap();
        assert_eq!(pool.base(), &cur("USD"));
        assert_eq!(pool.rate(&cur("USD")).unwrap(), Decimal::ONE);

        let after = pool
            .convert(Money::from_cents(5000), &cur("SEK"), &cur("USD"))
            .unwrap();
        assert!((after - before).abs() <= Money::from_cents(1));
    }

    #[test]
    fn test_default_pool() {
        let pool = ExchangePool::default();
        assert_eq!(pool.base().code(), "EUR");
        assert_eq!(pool.rate(&cur("SEK")).unwrap(), Decimal::from_str("11.5").unwrap());
    }
}
