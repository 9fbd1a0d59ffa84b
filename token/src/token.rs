//! # Asset Token
//!
//! A plain fungible token with balances, approvals, and issuer-side supply
//! control. It is the underlying asset the vault integration tests and the
//! demo run against, and a reasonable stand-in for any ERC-20 style token a
//! host might wire in.
//!
//! ## Semantics
//!
//! - **Supply tracking**: `mint` and `burn` move the total supply together
//!   with a balance. Overflow is checked on every credit.
//! - **Approvals**: `approve` replaces the allowance. `transfer_from`
//!   checks the allowance before the balance, so a caller with neither gets
//!   the allowance error. An allowance of `u128::MAX` is never decremented.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strata_vault::Holder;
use thiserror::Error;
use uuid::Uuid;

/// An approval of this size is never decremented.
pub const UNLIMITED_APPROVAL: u128 = u128::MAX;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during token operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The spender's approval does not cover the amount.
    #[error("insufficient allowance: {spender} approved for {allowance}, needs {needed}")]
    InsufficientAllowance {
        /// Account spending on the owner's behalf.
        spender: Holder,
        /// Current approval.
        allowance: u128,
        /// Amount requested.
        needed: u128,
    },

    /// The debited account holds less than the amount.
    #[error("insufficient balance: {holder} has {balance}, needs {needed}")]
    InsufficientBalance {
        /// The debited account.
        holder: Holder,
        /// Current balance.
        balance: u128,
        /// Amount requested.
        needed: u128,
    },

    /// A credit would overflow a balance or the total supply.
    #[error("supply overflow: crediting {amount} would exceed u128::MAX")]
    SupplyOverflow {
        /// The amount that was attempted.
        amount: u128,
    },
}

// ---------------------------------------------------------------------------
// AssetToken
// ---------------------------------------------------------------------------

/// An in-memory fungible token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetToken {
    /// Unique token identifier, assigned at creation.
    token_id: String,
    /// Human-readable name (e.g., "Test Token").
    name: String,
    /// Ticker symbol, upper-cased.
    symbol: String,
    /// Display decimals.
    decimals: u8,
    /// Current total supply in the smallest denomination.
    total_supply: u128,
    /// Balance per account.
    balances: HashMap<Holder, u128>,
    /// `owner -> (spender -> amount)`.
    allowances: HashMap<Holder, HashMap<Holder, u128>>,
}

impl AssetToken {
    /// Creates a token with zero supply.
    pub fn new(name: &str, symbol: &str, decimals: u8) -> Self {
        Self {
            token_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            symbol: symbol.to_uppercase(),
            decimals,
            total_supply: 0,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    /// Creates a token and mints `initial_supply` to `issuer`, the way a
    /// freshly deployed test token credits its deployer.
    pub fn with_supply(
        name: &str,
        symbol: &str,
        decimals: u8,
        issuer: &Holder,
        initial_supply: u128,
    ) -> Result<Self, TokenError> {
        let mut token = Self::new(name, symbol, decimals);
        token.mint(issuer, initial_supply)?;
        Ok(token)
    }

    /// The token's unique identifier.
    pub fn token_id(&self) -> &str {
        &self.token_id
    }

    /// Human-readable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ticker symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Display decimals.
    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Total supply.
    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Balance of `holder`, or 0.
    pub fn balance_of(&self, holder: &Holder) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Amount `spender` may move on behalf of `owner`.
    pub fn allowance(&self, owner: &Holder, spender: &Holder) -> u128 {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Issues new tokens to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::SupplyOverflow`] if the supply or the balance
    /// would exceed `u128::MAX`.
    pub fn mint(&mut self, to: &Holder, amount: u128) -> Result<(), TokenError> {
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::SupplyOverflow { amount })?;
        let new_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::SupplyOverflow { amount })?;

        self.total_supply = new_supply;
        self.balances.insert(to.clone(), new_balance);
        Ok(())
    }

    /// Destroys tokens held by `from`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InsufficientBalance`] if `from` doesn't have enough.
    pub fn burn(&mut self, from: &Holder, amount: u128) -> Result<(), TokenError> {
        let balance = self.debitable(from, amount)?;
        self.balances.insert(from.clone(), balance - amount);
        self.total_supply -= amount;
        Ok(())
    }

    /// Moves tokens from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InsufficientBalance`] if `from` is short and
    /// [`TokenError::SupplyOverflow`] if `to` would overflow.
    pub fn transfer(&mut self, from: &Holder, to: &Holder, amount: u128) -> Result<(), TokenError> {
        let from_balance = self.debitable(from, amount)?;
        if from == to {
            return Ok(());
        }
        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::SupplyOverflow { amount })?;

        self.balances.insert(from.clone(), from_balance - amount);
        self.balances.insert(to.clone(), to_balance);
        Ok(())
    }

    /// Sets the amount `spender` may move on behalf of `owner`.
    pub fn approve(&mut self, owner: &Holder, spender: &Holder, amount: u128) {
        self.allowances
            .entry(owner.clone())
            .or_default()
            .insert(spender.clone(), amount);
    }

    /// Moves tokens from `from` to `to` on the authority of `spender`'s
    /// approval. Allowance is checked first, then balance; nothing changes
    /// unless both pass.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InsufficientAllowance`] or
    /// [`TokenError::InsufficientBalance`].
    pub fn transfer_from(
        &mut self,
        spender: &Holder,
        from: &Holder,
        to: &Holder,
        amount: u128,
    ) -> Result<(), TokenError> {
        let allowance = self.allowance(from, spender);
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance {
                spender: spender.clone(),
                allowance,
                needed: amount,
            });
        }

        self.transfer(from, to, amount)?;

        if allowance != UNLIMITED_APPROVAL {
            self.approve(from, spender, allowance - amount);
        }
        Ok(())
    }

    fn debitable(&self, holder: &Holder, amount: u128) -> Result<u128, TokenError> {
        let balance = self.balance_of(holder);
        if balance < amount {
            return Err(TokenError::InsufficientBalance {
                holder: holder.clone(),
                balance,
                needed: amount,
            });
        }
        Ok(balance)
    }
}
