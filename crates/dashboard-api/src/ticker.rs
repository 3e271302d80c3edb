//! Normalized ticker symbols

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

const MAX_TICKER_LEN: usize = 15;

/// Ticker validation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickerError {
    #[error("ticker is empty")]
    Empty,

    #[error("ticker is {len} characters, at most {max} allowed")]
    TooLong { len: usize, max: usize },

    #[error("ticker must start with a letter, found '{ch}'")]
    InvalidStart { ch: char },

    #[error("ticker contains '{ch}' at position {index}")]
    InvalidChar { ch: char, index: usize },
}

/// Stock ticker, trimmed and uppercased.
///
/// Used as the routing key and list key everywhere in the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Parse and normalize a ticker
    pub fn parse(input: &str) -> Result<Self, TickerError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(TickerError::Empty);
        }

        let normalized = trimmed.to_ascii_uppercase();
        let len = normalized.chars().count();
        if len > MAX_TICKER_LEN {
            return Err(TickerError::TooLong {
                len,
                max: MAX_TICKER_LEN,
            });
        }

        if let Some(first) = normalized.chars().next() {
            if !first.is_ascii_alphabetic() {
                return Err(TickerError::InvalidStart { ch: first });
            }
        }

        for (index, ch) in normalized.chars().enumerate() {
            let valid = ch.is_ascii_alphanumeric() || ch == '.' || ch == '-';
            if !valid {
                return Err(TickerError::InvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Ticker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Ticker {
    type Error = TickerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Ticker {
    type Error = TickerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl std::str::FromStr for Ticker {
    type Err = TickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Ticker> for String {
    fn from(value: Ticker) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_and_normalizes() {
        let ticker = Ticker::parse(" aapl ").unwrap();
        assert_eq!(ticker.as_str(), "AAPL");
        assert_eq!(Ticker::parse("brk-b").unwrap().as_str(), "BRK-B");
        assert_eq!(Ticker::parse("BRK.B").unwrap().as_str(), "BRK.B");
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(Ticker::parse("   "), Err(TickerError::Empty));
    }

    #[test]
    fn test_rejects_invalid_start() {
        let err = Ticker::parse("1AAPL").unwrap_err();
        assert!(matches!(err, TickerError::InvalidStart { ch: '1' }));
    }

    #[test]
    fn test_rejects_invalid_chars() {
        let err = Ticker::parse("AAPL/../x").unwrap_err();
        assert!(matches!(err, TickerError::InvalidChar { ch: '/', index: 4 }));
    }

    #[test]
    fn test_rejects_too_long() {
        let err = Ticker::parse("ABCDEFGHIJKLMNOP").unwrap_err();
        assert!(matches!(err, TickerError::TooLong { len: 16, max: 15 }));
    }

    #[test]
    fn test_serde_normalizes() {
        let ticker: Ticker = serde_json::from_str("\"msft\"").unwrap();
        assert_eq!(ticker.as_str(), "MSFT");
        assert!(serde_json::from_str::<Ticker>("\"\"").is_err());
    }
}
