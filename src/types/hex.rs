// ABOUTME: Validated hex-encoded chain values: account addresses and transaction hashes.
// ABOUTME: Values are normalized to lowercase so comparisons are case-insensitive.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexValueError {
    #[error("value must start with 0x")]
    MissingPrefix,

    #[error("expected {expected} hex digits, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("value has no hex digits after 0x")]
    Empty,

    #[error("too many hex digits for a transaction hash: {0}")]
    TooLong(usize),

    #[error("invalid hex character: '{0}'")]
    InvalidChar(char),
}

fn hex_digits(value: &str) -> Result<&str, HexValueError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or(HexValueError::MissingPrefix)?;

    if let Some(c) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(HexValueError::InvalidChar(c));
    }

    Ok(digits)
}

/// A 20-byte account or contract address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(String);

impl Address {
    pub fn parse(value: &str) -> Result<Self, HexValueError> {
        let digits = hex_digits(value.trim())?;
        if digits.len() != 40 {
            return Err(HexValueError::WrongLength {
                expected: 40,
                actual: digits.len(),
            });
        }
        Ok(Self(format!("0x{}", digits.to_ascii_lowercase())))
    }

    /// The zero address, used as the native-asset payment marker.
    pub fn zero() -> Self {
        Self(format!("0x{}", "0".repeat(40)))
    }

    pub fn is_zero(&self) -> bool {
        self.0[2..].bytes().all(|b| b == b'0')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A transaction hash as returned by the broadcaster.
///
/// Up to 32 bytes of hex; shorter values are accepted because some dev chains
/// and test doubles hand back abbreviated hashes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TxHash(String);

impl TxHash {
    pub fn parse(value: &str) -> Result<Self, HexValueError> {
        let digits = hex_digits(value.trim())?;
        if digits.is_empty() {
            return Err(HexValueError::Empty);
        }
        if digits.len() > 64 {
            return Err(HexValueError::TooLong(digits.len()));
        }
        Ok(Self(format!("0x{}", digits.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! hex_value_impls {
    ($ty:ident) => {
        impl FromStr for $ty {
            type Err = HexValueError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                self.0.serialize(serializer)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_value_impls!(Address);
hex_value_impls!(TxHash);
