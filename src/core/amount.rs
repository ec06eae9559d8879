//! Fixed-point amounts
//!
//! Balances, fees and share percentages carry eight decimal places and are
//! stored as signed 64-bit units. On the wire they are decimal strings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of decimal places
pub const AMOUNT_DECIMALS: u32 = 8;

/// Units per whole coin
pub const UNITS_PER_COIN: i64 = 100_000_000;

/// Errors parsing an amount
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Invalid amount: {0}")]
    Invalid(String),
    #[error("Amount has more than {} decimal places", AMOUNT_DECIMALS)]
    TooPrecise,
    #[error("Amount out of range")]
    Overflow,
}

/// A fixed-point amount with eight decimal places
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Create from raw units (1 unit = 10^-8)
    pub const fn from_units(units: i64) -> Self {
        Self(units)
    }

    /// Create from a whole number of coins
    pub fn from_whole(whole: i64) -> Result<Self, AmountError> {
        whole
            .checked_mul(UNITS_PER_COIN)
            .map(Self)
            .ok_or(AmountError::Overflow)
    }

    /// Raw units
    pub const fn units(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = UNITS_PER_COIN as u64;
        write!(
            f,
            "{}{}.{:0width$}",
            sign,
            abs / scale,
            abs % scale,
            width = AMOUNT_DECIMALS as usize
        )
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(AmountError::Invalid(s.to_string()));
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(AmountError::Invalid(s.to_string()));
        }

        // Trailing zeros beyond eight places carry no value
        let fraction = fraction.trim_end_matches('0');
        if fraction.len() > AMOUNT_DECIMALS as usize {
            return Err(AmountError::TooPrecise);
        }

        let whole_units = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<i64>()
                .map_err(|_| AmountError::Overflow)?
                .checked_mul(UNITS_PER_COIN)
                .ok_or(AmountError::Overflow)?
        };

        let fraction_units = if fraction.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", fraction, width = AMOUNT_DECIMALS as usize);
            padded
                .parse::<i64>()
                .map_err(|_| AmountError::Invalid(s.to_string()))?
        };

        let units = whole_units
            .checked_add(fraction_units)
            .ok_or(AmountError::Overflow)?;

        Ok(Amount(if negative { -units } else { units }))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
            Repr::Integer(whole) => Amount::from_whole(whole).map_err(serde::de::Error::custom),
            Repr::Float(value) => {
                let units = (value * UNITS_PER_COIN as f64).round();
                if !units.is_finite() || units.abs() >= i64::MAX as f64 {
                    return Err(serde::de::Error::custom(AmountError::Overflow));
                }
                Ok(Amount(units as i64))
            }
        }
    }
}
