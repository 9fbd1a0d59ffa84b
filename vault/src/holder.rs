//! # Holder Identity
//!
//! A [`Holder`] is whoever can own shares, spend an allowance, or receive
//! assets: an account, a contract, the vault's own custody address. The
//! engine never interprets it beyond equality, so it is a thin wrapper
//! around the host's address string.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Returned by [`Holder::parse`] for identities the engine refuses.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HolderError {
    /// The identity was empty or only whitespace.
    #[error("holder identity must not be empty")]
    Empty,
}

/// An opaque, address-equivalent identity.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Holder(String);

impl Holder {
    /// Wraps an address without validation. Prefer [`parse`](Self::parse)
    /// for input that crosses a trust boundary.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Parses an address, rejecting empty identities and trimming
    /// surrounding whitespace.
    pub fn parse(address: &str) -> Result<Self, HolderError> {
        let trimmed = address.trim();
        if trimmed.is_empty() {
            return Err(HolderError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the underlying address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Holder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Holder({})", self.0)
    }
}

impl fmt::Display for Holder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Holder {
    type Err = HolderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<&str> for Holder {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_whitespace() {
        let holder = Holder::parse("  alice ").unwrap();
        assert_eq!(holder.as_str(), "alice");
        assert_eq!(holder, Holder::from("alice"));
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!(Holder::parse("   "), Err(HolderError::Empty));
        assert!("".parse::<Holder>().is_err());
    }

    #[test]
    fn display_and_debug() {
        let holder = Holder::new("bob");
        assert_eq!(holder.to_string(), "bob");
        assert_eq!(format!("{:?}", holder), "Holder(bob)");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&Holder::new("carol")).unwrap();
        assert_eq!(json, "\"carol\"");
        let back: Holder = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_str(), "carol");
    }
}
