//! Currency codes and their display conventions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::money::Money;

/// Display conventions for currencies the app knows by name
const KNOWN_CURRENCIES: &[(&str, &str, bool)] = &[
    // (code, symbol, symbol goes after the amount)
    ("EUR", "€", false),
    ("USD", "$", false),
    ("GBP", "£", false),
    ("SEK", "kr", true),
    ("NOK", "kr", true),
    ("DKK", "kr", true),
    ("CHF", "CHF", true),
    ("JPY", "¥", false),
];

/// A three-letter, upper-case currency code such as `EUR`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Parse and normalize a currency code
    ///
    /// Codes are trimmed and upper-cased; anything other than three ASCII
    /// letters is rejected.
    pub fn new(code: &str) -> Result<Self, CurrencyCodeError> {
        let code = code.trim().to_ascii_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CurrencyCodeError(code));
        }
        Ok(Self(code))
    }

    /// The ISO-style code
    pub fn code(&self) -> &str {
        &self.0
    }

    /// The display symbol, falling back to the code itself
    pub fn symbol(&self) -> &str {
        KNOWN_CURRENCIES
            .iter()
            .find(|(code, _, _)| *code == self.0)
            .map(|(_, symbol, _)| *symbol)
            .unwrap_or(self.0.as_str())
    }

    fn symbol_is_suffix(&self) -> bool {
        KNOWN_CURRENCIES
            .iter()
            .find(|(code, _, _)| *code == self.0)
            .map(|(_, _, suffix)| *suffix)
            .unwrap_or(true)
    }

    /// Format an amount in this currency, e.g. `€10.50` or `10.50 kr`
    pub fn format(&self, amount: Money) -> String {
        if self.symbol_is_suffix() {
            amount.format_with_suffix(self.symbol())
        } else {
            amount.format_with_symbol(self.symbol())
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self("EUR".to_string())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Currency {
    type Err = CurrencyCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = CurrencyCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

/// Error for malformed currency codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyCodeError(pub String);

impl fmt::Display for CurrencyCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid currency code '{}': expected three letters", self.0)
    }
}

impl std::error::Error for CurrencyCodeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_code() {
        let c = Currency::new(" usd ").unwrap();
        assert_eq!(c.code(), "USD");
    }

    #[test]
    fn test_rejects_bad_codes() {
        assert!(Currency::new("US").is_err());
        assert!(Currency::new("EURO").is_err());
        assert!(Currency::new("U5D").is_err());
    }

    #[test]
    fn test_format() {
        let amount = Money::from_cents(123456);
        assert_eq!(Currency::new("EUR").unwrap().format(amount), "€1234.56");
        assert_eq!(Currency::new("SEK").unwrap().format(amount), "1234.56 kr");
        assert_eq!(Currency::new("XYZ").unwrap().format(amount), "1234.56 XYZ");
    }

    #[test]
    fn test_serde_validates() {
        let c: Currency = serde_json::from_str("\"sek\"").unwrap();
        assert_eq!(c.code(), "SEK");
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"SEK\"");
        assert!(serde_json::from_str::<Currency>("\"kronor\"").is_err());
    }
}
