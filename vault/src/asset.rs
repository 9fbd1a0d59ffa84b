//! # Asset Collaborator Contracts
//!
//! The engine never touches the underlying token's books. It asks a
//! collaborator how much the vault holds, and asks it to move funds in or
//! out. These traits are the whole contract; the `strata-token` crate ships
//! an in-memory implementation, and a host wires in whatever token system
//! it actually runs on.

use thiserror::Error;

use crate::holder::Holder;

/// Refusals the asset collaborator may report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// The payer has not approved the vault for enough assets.
    #[error("insufficient asset allowance: approved {allowance}, needed {needed}")]
    InsufficientAllowance {
        /// Current approval granted to the vault.
        allowance: u128,
        /// Amount the vault tried to pull.
        needed: u128,
    },

    /// The payer (or the vault's custody account, on push) is short.
    #[error("insufficient asset balance: holds {balance}, needed {needed}")]
    InsufficientBalance {
        /// Current asset balance of the debited account.
        balance: u128,
        /// Amount that was requested.
        needed: u128,
    },
}

/// Read-only view of the assets under the vault's control.
pub trait AssetView {
    /// Assets currently attributed to the vault, including anything a
    /// strategy has added or removed since the last call.
    fn total_assets(&self) -> u128;

    /// Identity of the underlying asset.
    fn asset_id(&self) -> String;

    /// Display decimals of the underlying asset.
    fn decimals(&self) -> u8;

    /// The account the collaborator keeps vault funds in, if it has one.
    /// A vault refuses to open over a backend whose custody account differs
    /// from its own.
    fn custody_account(&self) -> Option<&Holder> {
        None
    }
}

/// Moves assets between accounts and the vault.
pub trait AssetTransfer {
    /// Debits `amount` from `from` into the vault, up to the allowance
    /// `from` granted the vault.
    fn pull(&mut self, from: &Holder, amount: u128) -> Result<(), TransferError>;

    /// Credits `amount` from the vault to `to`.
    fn push(&mut self, to: &Holder, amount: u128) -> Result<(), TransferError>;
}

/// Everything a [`Vault`](crate::vault::Vault) needs from its asset.
pub trait AssetBackend: AssetView + AssetTransfer {}

impl<T: AssetView + AssetTransfer> AssetBackend for T {}
