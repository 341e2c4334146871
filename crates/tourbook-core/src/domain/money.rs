//! Exact currency amounts.
//!
//! Amounts live as integer minor units (cents). Major units only appear at
//! the edges: JSON payloads and display strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Amount must be a finite, non-negative number")]
    NotRepresentable,
    #[error("Amount has more than two decimal places: {0}")]
    TooPrecise(String),
    #[error("Invalid amount: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    pub fn from_major(major: f64) -> Result<Self, MoneyError> {
        if !major.is_finite() || major < 0.0 {
            return Err(MoneyError::NotRepresentable);
        }
        Self::from_rounded_minor((major * 100.0).round())
    }

    /// `i64::MAX as f64` is 2^63, one past the largest amount.
    fn from_rounded_minor(minor: f64) -> Result<Self, MoneyError> {
        if minor >= i64::MAX as f64 {
            return Err(MoneyError::NotRepresentable);
        }
        Ok(Money(minor as i64))
    }

    pub fn to_major(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (whole, fraction) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(MoneyError::Invalid(s.to_string()));
        }
        if !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(MoneyError::Invalid(s.to_string()));
        }
        if fraction.len() > 2 {
            return Err(MoneyError::TooPrecise(s.to_string()));
        }

        let whole: i64 = whole.parse().map_err(|_| MoneyError::Invalid(s.to_string()))?;
        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| MoneyError::Invalid(s.to_string()))? * 10,
            _ => fraction.parse().map_err(|_| MoneyError::Invalid(s.to_string()))?,
        };

        whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(cents))
            .map(Money)
            .ok_or(MoneyError::NotRepresentable)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_major())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Money::from_major(n).map_err(serde::de::Error::custom),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_past_i64_are_rejected() {
        assert_eq!(Money::from_rounded_minor(2f64.powi(63)), Err(MoneyError::NotRepresentable));
        assert_eq!(Money::from_major(1e17), Err(MoneyError::NotRepresentable));
        assert_eq!(Money::from_rounded_minor(2f64.powi(62)), Ok(Money(1 << 62)));
    }

    #[test]
    fn major_units_round_trip_exactly() {
        for (major, minor) in [(0.01, 1), (1.0, 100), (99.99, 9_999), (10_000.00, 1_000_000)] {
            let money = Money::from_major(major).unwrap();
            assert_eq!(money.minor(), minor);
            assert_eq!(money.to_major(), major);
        }
    }

    #[test]
    fn text_amounts_parse_and_display() {
        assert_eq!("99.99".parse::<Money>().unwrap(), Money::from_minor(9_999));
        assert_eq!("12.5".parse::<Money>().unwrap(), Money::from_minor(1_250));
        assert_eq!("7".parse::<Money>().unwrap().to_string(), "7.00");
        assert_eq!(Money::from_minor(1).to_string(), "0.01");
        assert!(matches!("1.005".parse::<Money>(), Err(MoneyError::TooPrecise(_))));
        assert!("-3".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
    }

    #[test]
    fn negative_and_non_finite_rejected() {
        assert_eq!(Money::from_major(-1.0), Err(MoneyError::NotRepresentable));
        assert_eq!(Money::from_major(f64::NAN), Err(MoneyError::NotRepresentable));
    }

    #[test]
    fn json_accepts_numbers_and_strings() {
        let from_number: Money = serde_json::from_str("99.99").unwrap();
        let from_text: Money = serde_json::from_str("\"99.99\"").unwrap();
        assert_eq!(from_number, from_text);
        assert_eq!(serde_json::to_string(&from_number).unwrap(), "99.99");
    }
}
