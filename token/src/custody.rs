//! # Vault Custody
//!
//! [`VaultCustody`] plugs an [`AssetToken`] into the vault engine. The vault
//! holds its assets in an ordinary token account (the custody holder), and
//! the total assets it reports are simply that account's balance. Anything
//! that changes the balance from outside the vault, a strategy harvest or a
//! plain donation, moves the share price on the next call.
//!
//! The token sits behind an `Arc<RwLock<..>>` so that tests and hosts can
//! keep a handle to it while the vault owns the adapter.

use std::sync::Arc;

use parking_lot::RwLock;
use strata_vault::{
    AssetTransfer, AssetView, ConfigError, Holder, TransferError, Vault, VaultConfig,
};
use tracing::{debug, trace};

use crate::token::{AssetToken, TokenError};

/// Shared handle to an [`AssetToken`].
pub type TokenHandle = Arc<RwLock<AssetToken>>;

/// Asset collaborator backed by an [`AssetToken`] account.
#[derive(Debug, Clone)]
pub struct VaultCustody {
    token: TokenHandle,
    custody: Holder,
}

impl VaultCustody {
    /// Wraps `token`, holding vault funds in the `custody` account.
    pub fn new(token: TokenHandle, custody: Holder) -> Self {
        Self { token, custody }
    }

    /// Convenience constructor that takes ownership of a bare token and
    /// returns the adapter together with a handle to it.
    pub fn wrap(token: AssetToken, custody: Holder) -> (Self, TokenHandle) {
        let handle = Arc::new(RwLock::new(token));
        (Self::new(Arc::clone(&handle), custody), handle)
    }

    /// The custody account.
    pub fn custody(&self) -> &Holder {
        &self.custody
    }

    /// Opens an empty vault over this adapter, using its custody account as
    /// the vault's own.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails validation.
    pub fn open_vault(self, config: VaultConfig) -> Result<Vault<Self>, ConfigError> {
        let custody = self.custody.clone();
        Vault::new(custody, self, config)
    }

    /// A handle to the underlying token.
    pub fn token(&self) -> TokenHandle {
        Arc::clone(&self.token)
    }

    /// Issues `amount` new tokens straight into custody. Models a strategy
    /// gain: the share price rises for every holder.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::SupplyOverflow`] if the token supply would overflow.
    pub fn harvest(&self, amount: u128) -> Result<(), TokenError> {
        self.token.write().mint(&self.custody, amount)?;
        debug!(custody = %self.custody, amount, "harvest credited to custody");
        Ok(())
    }

    /// Burns `amount` out of custody. Models a strategy loss.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InsufficientBalance`] if custody holds less.
    pub fn slash(&self, amount: u128) -> Result<(), TokenError> {
        self.token.write().burn(&self.custody, amount)?;
        debug!(custody = %self.custody, amount, "loss debited from custody");
        Ok(())
    }

    /// Sends `amount` from `from` directly to custody, bypassing the vault.
    /// No shares are minted for it.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InsufficientBalance`] if `from` is short.
    pub fn donate(&self, from: &Holder, amount: u128) -> Result<(), TokenError> {
        self.token.write().transfer(from, &self.custody, amount)?;
        debug!(%from, amount, "direct transfer into custody");
        Ok(())
    }
}

impl AssetView for VaultCustody {
    fn total_assets(&self) -> u128 {
        self.token.read().balance_of(&self.custody)
    }

    fn asset_id(&self) -> String {
        self.token.read().token_id().to_string()
    }

    fn decimals(&self) -> u8 {
        self.token.read().decimals()
    }

    fn custody_account(&self) -> Option<&Holder> {
        Some(&self.custody)
    }
}

impl AssetTransfer for VaultCustody {
    fn pull(&mut self, from: &Holder, amount: u128) -> Result<(), TransferError> {
        trace!(%from, amount, "pull into custody");
        self.token
            .write()
            .transfer_from(&self.custody, from, &self.custody, amount)
            .map_err(refusal)
    }

    fn push(&mut self, to: &Holder, amount: u128) -> Result<(), TransferError> {
        trace!(%to, amount, "push out of custody");
        self.token
            .write()
            .transfer(&self.custody, to, amount)
            .map_err(refusal)
    }
}

/// Maps token refusals onto the engine's transfer errors.
fn refusal(err: TokenError) -> TransferError {
    match err {
        TokenError::InsufficientAllowance {
            allowance, needed, ..
        } => TransferError::InsufficientAllowance { allowance, needed },
        TokenError::InsufficientBalance { balance, needed, .. } => {
            TransferError::InsufficientBalance { balance, needed }
        }
        // A credit overflow means the receiving side cannot take the funds.
        TokenError::SupplyOverflow { amount } => TransferError::InsufficientBalance {
            balance: 0,
            needed: amount,
        },
    }
}
