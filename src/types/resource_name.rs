// ABOUTME: DNS-compatible resource name validation.
// ABOUTME: Resource names key the local record store and become container hostnames.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResourceNameError {
    #[error("resource name cannot be empty")]
    Empty,

    #[error("resource name exceeds maximum length of 63 characters")]
    TooLong,

    #[error("resource name cannot start with a hyphen")]
    StartsWithHyphen,

    #[error("resource name cannot end with a hyphen")]
    EndsWithHyphen,

    #[error("invalid character in resource name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceName(String);

impl ResourceName {
    /// Validate a user-entered name. Uppercase is folded rather than rejected
    /// because names come straight from a form field.
    pub fn new(value: &str) -> Result<Self, ResourceNameError> {
        let value = value.trim();

        if value.is_empty() {
            return Err(ResourceNameError::Empty);
        }

        if value.len() > 63 {
            return Err(ResourceNameError::TooLong);
        }

        if value.starts_with('-') {
            return Err(ResourceNameError::StartsWithHyphen);
        }

        if value.ends_with('-') {
            return Err(ResourceNameError::EndsWithHyphen);
        }

        if let Some(c) = value
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '-')
        {
            return Err(ResourceNameError::InvalidChar(c));
        }

        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ResourceName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ResourceName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(&s).map_err(serde::de::Error::custom)
    }
}
