//! # Vault Configuration & Constants
//!
//! Every tunable number in the engine lives here. The share math only has
//! one real knob, the virtual offset, and the limit policy has one more,
//! the deposit cap. Both are carried in [`VaultConfig`] so a host can pick
//! them per vault instead of recompiling.
//!
//! Changing the offset of a vault that already has depositors changes the
//! exchange rate under their feet. Pick it at creation time and leave it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::holder::Holder;
use crate::math::MathError;

// ---------------------------------------------------------------------------
// Virtual Offset
// ---------------------------------------------------------------------------

/// Default decimals offset. `0` means one virtual share and one virtual
/// asset, so an empty vault starts at exactly 1 share per asset.
pub const DEFAULT_DECIMALS_OFFSET: u8 = 0;

/// Largest accepted decimals offset. Each step up costs a factor of ten in
/// share-supply headroom.
pub const MAX_DECIMALS_OFFSET: u8 = 18;

/// Virtual assets added to `total_assets` before every conversion.
///
/// Always 1, independent of the share-side offset.
pub const VIRTUAL_ASSETS: u128 = 1;

/// Returns `10^decimals_offset`, the virtual share count for an offset.
///
/// # Errors
///
/// Returns [`MathError::Overflow`] for offsets whose power of ten does not
/// fit a `u128` (anything above 38).
pub fn virtual_shares(decimals_offset: u8) -> Result<u128, MathError> {
    10u128
        .checked_pow(u32::from(decimals_offset))
        .ok_or(MathError::Overflow)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced while validating a [`VaultConfig`] or a restored vault.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The decimals offset is larger than [`MAX_DECIMALS_OFFSET`].
    #[error("decimals offset {offset} exceeds maximum {max}")]
    OffsetTooLarge {
        /// The offset that was requested.
        offset: u8,
        /// The largest accepted offset.
        max: u8,
    },

    /// The configuration document could not be parsed.
    #[error("malformed vault config: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A restored ledger's balances do not add up to its total supply.
    #[error("inconsistent ledger: balances do not sum to total supply {total_shares}")]
    InconsistentLedger {
        /// The total supply recorded in the ledger.
        total_shares: u128,
    },

    /// The vault state and its asset backend name different custody accounts.
    #[error("custody mismatch: state holds {state}, asset backend holds {backend}")]
    CustodyMismatch {
        /// Custody account recorded in the vault state.
        state: Holder,
        /// Custody account the asset backend moves funds through.
        backend: Holder,
    },
}

// ---------------------------------------------------------------------------
// VaultConfig
// ---------------------------------------------------------------------------

/// Per-vault parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Share-side virtual offset, as a power of ten. Shares carry
    /// `asset_decimals + decimals_offset` decimals.
    pub decimals_offset: u8,

    /// Maximum total assets the vault accepts. `None` means unlimited.
    pub deposit_cap: Option<u128>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            decimals_offset: DEFAULT_DECIMALS_OFFSET,
            deposit_cap: None,
        }
    }
}

impl VaultConfig {
    /// Config with the given offset and no deposit cap.
    pub fn with_offset(decimals_offset: u8) -> Self {
        Self {
            decimals_offset,
            ..Self::default()
        }
    }

    /// Returns a copy of this config with a deposit cap set.
    pub fn capped(mut self, cap: u128) -> Self {
        self.deposit_cap = Some(cap);
        self
    }

    /// Checks the config for values the engine cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OffsetTooLarge`] if `decimals_offset` is above
    /// [`MAX_DECIMALS_OFFSET`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decimals_offset > MAX_DECIMALS_OFFSET {
            return Err(ConfigError::OffsetTooLarge {
                offset: self.decimals_offset,
                max: MAX_DECIMALS_OFFSET,
            });
        }
        Ok(())
    }

    /// Parses and validates a JSON config document. Missing fields fall
    /// back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Malformed`] for invalid JSON and
    /// [`ConfigError::OffsetTooLarge`] for an out-of-range offset.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Virtual share count implied by this config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OffsetTooLarge`] if the config fails validation.
    pub fn virtual_shares(&self) -> Result<u128, ConfigError> {
        self.validate()?;
        virtual_shares(self.decimals_offset).map_err(|_| ConfigError::OffsetTooLarge {
            offset: self.decimals_offset,
            max: MAX_DECIMALS_OFFSET,
        })
    }
}
