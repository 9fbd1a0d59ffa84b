//! # Share/Asset Conversion
//!
//! The exchange rate is never stored. It is rebuilt on every call from the
//! asset total reported by the collaborator and the share total held by
//! the ledger, so strategy gains and losses show up immediately and there
//! is nothing to go stale.
//!
//! Both totals are padded with a virtual offset before the ratio is taken:
//!
//! ```text
//! shares = assets * (total_shares + 10^offset) / (total_assets + 1)
//! assets = shares * (total_assets + 1) / (total_shares + 10^offset)
//! ```
//!
//! The padding gives the empty vault a defined rate (exactly
//! `10^offset` shares per asset) and makes donating assets to a nearly empty
//! vault a losing trade for the donor: the virtual shares capture part of
//! every donation, and with a larger offset they capture most of it.
//!
//! ## Rounding Rules (always favor the vault)
//!
//! | Operation | Converts          | Rounding |
//! |-----------|-------------------|----------|
//! | deposit   | assets -> shares  | down     |
//! | mint      | shares -> assets  | up       |
//! | withdraw  | assets -> shares  | up       |
//! | redeem    | shares -> assets  | down     |

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::{virtual_shares, VIRTUAL_ASSETS};
use crate::math::{checked_add, mul_div, MathError, Rounding};

/// A snapshot of the pool totals, ready to convert in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Assets controlled by the vault at snapshot time.
    pub total_assets: u128,
    /// Shares outstanding at snapshot time.
    pub total_shares: u128,
    /// Share-side virtual offset (`10^decimals_offset`).
    pub virtual_shares: u128,
}

impl ExchangeRate {
    /// Builds a rate from the pool totals and a decimals offset.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::Overflow`] if `10^decimals_offset` does not fit
    /// a `u128`.
    pub fn new(
        total_assets: u128,
        total_shares: u128,
        decimals_offset: u8,
    ) -> Result<Self, MathError> {
        Ok(Self::from_parts(
            total_assets,
            total_shares,
            virtual_shares(decimals_offset)?,
        ))
    }

    /// Builds a rate from the pool totals and an already computed virtual
    /// share count.
    pub fn from_parts(total_assets: u128, total_shares: u128, virtual_shares: u128) -> Self {
        Self {
            total_assets,
            total_shares,
            virtual_shares,
        }
    }

    /// Converts an asset amount to shares.
    pub fn to_shares(&self, assets: u128, rounding: Rounding) -> Result<u128, MathError> {
        let shares = mul_div(
            assets,
            self.effective_shares()?,
            self.effective_assets()?,
            rounding,
        )?;
        trace!(assets, shares, %rounding, "assets -> shares");
        Ok(shares)
    }

    /// Converts a share amount to assets.
    pub fn to_assets(&self, shares: u128, rounding: Rounding) -> Result<u128, MathError> {
        let assets = mul_div(
            shares,
            self.effective_assets()?,
            self.effective_shares()?,
            rounding,
        )?;
        trace!(shares, assets, %rounding, "shares -> assets");
        Ok(assets)
    }

    /// `total_assets` plus the virtual asset.
    pub fn effective_assets(&self) -> Result<u128, MathError> {
        checked_add(self.total_assets, VIRTUAL_ASSETS)
    }

    /// `total_shares` plus the virtual shares.
    pub fn effective_shares(&self) -> Result<u128, MathError> {
        checked_add(self.total_shares, self.virtual_shares)
    }
}
