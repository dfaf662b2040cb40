//! Product identifiers: the `BASE-QUOTE` currency pairs traded on the feed.
//!
//! The canonical string form is the only representation that crosses the
//! wire, so parsing is always "split on `-`, validate both symbols".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FeedError;

/// Separator between base and quote currency in the canonical form.
pub const PRODUCT_DELIMITER: char = '-';

/// Longest currency symbol accepted by [`ProductId::from_str`].
pub const MAX_SYMBOL_LEN: usize = 16;

/// A tradeable market: base currency priced in quote currency.
///
/// Symbols are normalised to upper case on construction, so derived equality
/// and hashing agree with comparison of the canonical strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId {
    base: String,
    quote: String,
}

impl ProductId {
    /// Build a product id from two currency symbols.
    pub fn new(base: &str, quote: &str) -> Result<Self, FeedError> {
        match (normalize_symbol(base), normalize_symbol(quote)) {
            (Some(base), Some(quote)) => Ok(Self { base, quote }),
            _ => Err(FeedError::InvalidProductId(format!("{base}{PRODUCT_DELIMITER}{quote}"))),
        }
    }

    /// Base currency symbol (e.g. `ETH` in `ETH-USD`).
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Quote currency symbol (e.g. `USD` in `ETH-USD`).
    pub fn quote(&self) -> &str {
        &self.quote
    }
}

fn normalize_symbol(symbol: &str) -> Option<String> {
    let valid = !symbol.is_empty()
        && symbol.len() <= MAX_SYMBOL_LEN
        && symbol.bytes().all(|b| b.is_ascii_alphanumeric());
    valid.then(|| symbol.to_ascii_uppercase())
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{PRODUCT_DELIMITER}{}", self.base, self.quote)
    }
}

impl FromStr for ProductId {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, quote) =
            s.split_once(PRODUCT_DELIMITER).ok_or_else(|| FeedError::InvalidProductId(s.to_string()))?;
        Self::new(base, quote).map_err(|_| FeedError::InvalidProductId(s.to_string()))
    }
}

impl Serialize for ProductId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_canonical() {
        let id: ProductId = "ETH-USD".parse().unwrap();
        assert_eq!(id.base(), "ETH");
        assert_eq!(id.quote(), "USD");
        assert_eq!(id.to_string(), "ETH-USD");
    }

    #[test]
    fn parse_normalizes_case() {
        let lower: ProductId = "btc-usdc".parse().unwrap();
        assert_eq!(lower, ProductId::new("BTC", "USDC").unwrap());
        assert_eq!(lower.to_string(), "BTC-USDC");
    }

    #[test]
    fn numeric_leading_symbol() {
        let id: ProductId = "1INCH-USD".parse().unwrap();
        assert_eq!(id.base(), "1INCH");
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["ETHUSD", "-USD", "ETH-", "ETH-US-D", "ET H-USD", ""] {
            assert!(bad.parse::<ProductId>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn serde_uses_canonical_string() {
        let id = ProductId::new("eth", "usd").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""ETH-USD""#);
        let back: ProductId = serde_json::from_str(r#""ETH-USD""#).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<ProductId>(r#""ETHUSD""#).is_err());
    }
}
