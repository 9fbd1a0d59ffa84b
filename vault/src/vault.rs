//! # Vault Executor
//!
//! [`Vault`] ties the pieces together. It owns the [`VaultState`] record
//! and the asset collaborator, and runs the four operations that change the
//! pool:
//!
//! ```text
//! deposit(assets)  -> shares   limit check, convert down, mint, pull
//! mint(shares)     -> assets   limit check, convert up,   mint, pull
//! withdraw(assets) -> shares   limit check, convert up,   burn, push
//! redeem(shares)   -> assets   limit check, convert down, burn, push
//! ```
//!
//! ## Atomicity
//!
//! Every check that can be done without side effects runs first. Ledger
//! effects are then applied before the asset collaborator is called, so
//! anything the collaborator does observes the post-operation ledger. If
//! the collaborator refuses, the ledger effects are undone before the error
//! returns. Either way the caller sees all of the operation or none of it.
//!
//! ## Exclusivity
//!
//! Mutating methods take `&mut self`, and the vault owns its collaborator
//! by value, so two operations cannot interleave on the same vault and a
//! collaborator cannot call back into it. Hosts that share a vault across
//! threads wrap it in a [`SharedVault`](crate::shared::SharedVault).

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::asset::AssetBackend;
use crate::config::{ConfigError, VaultConfig};
use crate::conversion::ExchangeRate;
use crate::error::VaultError;
use crate::events::VaultEvent;
use crate::holder::Holder;
use crate::ledger::{ShareAllowance, ShareLedger};
use crate::limits::LimitPolicy;
use crate::math::Rounding;

// ---------------------------------------------------------------------------
// VaultState
// ---------------------------------------------------------------------------

/// Everything the engine remembers between calls.
///
/// Total assets are deliberately absent: they belong to the asset
/// collaborator and are read fresh on every call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VaultState {
    /// The vault's own account on the asset side.
    custody: Holder,
    /// Offset and cap.
    config: VaultConfig,
    /// Share balances, supply, and allowances.
    ledger: ShareLedger,
    /// Events not yet drained by an observer.
    events: Vec<VaultEvent>,
}

impl VaultState {
    /// Fresh state with no shares and no pending events.
    pub fn new(custody: Holder, config: VaultConfig) -> Self {
        Self {
            custody,
            config,
            ledger: ShareLedger::new(),
            events: Vec::new(),
        }
    }

    /// The vault's custody account.
    pub fn custody(&self) -> &Holder {
        &self.custody
    }

    /// The vault's configuration.
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// The share ledger.
    pub fn ledger(&self) -> &ShareLedger {
        &self.ledger
    }

    /// Events recorded since the last drain.
    pub fn events(&self) -> &[VaultEvent] {
        &self.events
    }
}

// ---------------------------------------------------------------------------
// Vault
// ---------------------------------------------------------------------------

/// A tokenized vault over an asset collaborator `A`.
#[derive(Debug)]
pub struct Vault<A> {
    state: VaultState,
    asset: A,
    /// `10^decimals_offset`, fixed once the config has been validated.
    virtual_shares: u128,
}

impl<A: AssetBackend> Vault<A> {
    /// Creates an empty vault.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails validation or `asset`
    /// keeps its funds in an account other than `custody`.
    pub fn new(custody: Holder, asset: A, config: VaultConfig) -> Result<Self, ConfigError> {
        Self::from_state(VaultState::new(custody, config), asset)
    }

    /// Restores a vault from a previously captured state.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::OffsetTooLarge`] if the stored config fails validation.
    /// - [`ConfigError::InconsistentLedger`] if the ledger's balances do not
    ///   add up to its total supply.
    /// - [`ConfigError::CustodyMismatch`] if `asset` keeps funds in a
    ///   different account than the state's custody.
    pub fn from_state(state: VaultState, asset: A) -> Result<Self, ConfigError> {
        let virtual_shares = state.config.virtual_shares()?;
        if !state.ledger.is_conserved() {
            warn!(
                total_shares = state.ledger.total_shares(),
                "refusing to restore non-conserved ledger"
            );
            return Err(ConfigError::InconsistentLedger {
                total_shares: state.ledger.total_shares(),
            });
        }
        if let Some(backend) = asset.custody_account() {
            if *backend != state.custody {
                return Err(ConfigError::CustodyMismatch {
                    state: state.custody.clone(),
                    backend: backend.clone(),
                });
            }
        }
        debug!(
            custody = %state.custody,
            decimals_offset = state.config.decimals_offset,
            deposit_cap = ?state.config.deposit_cap,
            "vault opened"
        );
        Ok(Self {
            state,
            asset,
            virtual_shares,
        })
    }

    /// Read access to the state record.
    pub fn state(&self) -> &VaultState {
        &self.state
    }

    /// Splits the vault into its state and collaborator.
    pub fn into_parts(self) -> (VaultState, A) {
        (self.state, self.asset)
    }

    /// Read access to the asset collaborator.
    pub fn backend(&self) -> &A {
        &self.asset
    }

    /// Mutable access to the asset collaborator, for hosts that need to
    /// drive it directly (strategy harvests, reconciliation).
    pub fn backend_mut(&mut self) -> &mut A {
        &mut self.asset
    }

    // -----------------------------------------------------------------------
    // Metadata & Balances
    // -----------------------------------------------------------------------

    /// Identity of the underlying asset.
    pub fn asset(&self) -> String {
        self.asset.asset_id()
    }

    /// Share decimals: the asset's decimals plus the configured offset.
    pub fn decimals(&self) -> u8 {
        self.asset
            .decimals()
            .saturating_add(self.state.config.decimals_offset)
    }

    /// Assets under management, as reported by the collaborator.
    pub fn total_assets(&self) -> u128 {
        self.asset.total_assets()
    }

    /// Shares outstanding.
    pub fn total_supply(&self) -> u128 {
        self.state.ledger.total_shares()
    }

    /// Shares held by `holder`.
    pub fn balance_of(&self, holder: &Holder) -> u128 {
        self.state.ledger.balance_of(holder)
    }

    /// Shares `spender` may move on behalf of `owner`.
    pub fn allowance(&self, owner: &Holder, spender: &Holder) -> u128 {
        self.state.ledger.allowance(owner, spender)
    }

    /// Events recorded since the last drain.
    pub fn events(&self) -> &[VaultEvent] {
        &self.state.events
    }

    /// Drains and returns the recorded events.
    pub fn take_events(&mut self) -> Vec<VaultEvent> {
        std::mem::take(&mut self.state.events)
    }

    // -----------------------------------------------------------------------
    // Conversions & Previews
    // -----------------------------------------------------------------------

    /// The current exchange rate.
    pub fn exchange_rate(&self) -> ExchangeRate {
        ExchangeRate::from_parts(
            self.asset.total_assets(),
            self.state.ledger.total_shares(),
            self.virtual_shares,
        )
    }

    /// Shares `assets` are worth at the current rate, rounded down.
    pub fn convert_to_shares(&self, assets: u128) -> Result<u128, VaultError> {
        Ok(self.exchange_rate().to_shares(assets, Rounding::Down)?)
    }

    /// Assets `shares` are worth at the current rate, rounded down.
    pub fn convert_to_assets(&self, shares: u128) -> Result<u128, VaultError> {
        Ok(self.exchange_rate().to_assets(shares, Rounding::Down)?)
    }

    /// Shares a deposit of `assets` would mint right now. Ignores limits.
    pub fn preview_deposit(&self, assets: u128) -> Result<u128, VaultError> {
        Ok(self.exchange_rate().to_shares(assets, Rounding::Down)?)
    }

    /// Assets a mint of `shares` would cost right now. Ignores limits.
    pub fn preview_mint(&self, shares: u128) -> Result<u128, VaultError> {
        Ok(self.exchange_rate().to_assets(shares, Rounding::Up)?)
    }

    /// Shares a withdrawal of `assets` would burn right now. Ignores limits.
    pub fn preview_withdraw(&self, assets: u128) -> Result<u128, VaultError> {
        Ok(self.exchange_rate().to_shares(assets, Rounding::Up)?)
    }

    /// Assets a redemption of `shares` would pay right now. Ignores limits.
    pub fn preview_redeem(&self, shares: u128) -> Result<u128, VaultError> {
        Ok(self.exchange_rate().to_assets(shares, Rounding::Down)?)
    }

    // -----------------------------------------------------------------------
    // Limits
    // -----------------------------------------------------------------------

    fn limits(&self) -> LimitPolicy<'_> {
        LimitPolicy::new(&self.state.ledger, &self.state.config, self.exchange_rate())
    }

    /// Largest deposit `receiver` may make, in assets.
    pub fn max_deposit(&self, receiver: &Holder) -> u128 {
        self.limits().max_deposit(receiver)
    }

    /// Largest mint `receiver` may request, in shares.
    pub fn max_mint(&self, receiver: &Holder) -> Result<u128, VaultError> {
        Ok(self.limits().max_mint(receiver)?)
    }

    /// Largest withdrawal `owner` may make, in assets.
    pub fn max_withdraw(&self, owner: &Holder) -> Result<u128, VaultError> {
        Ok(self.limits().max_withdraw(owner)?)
    }

    /// Largest redemption `owner` may make, in shares.
    pub fn max_redeem(&self, owner: &Holder) -> u128 {
        self.limits().max_redeem(owner)
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Deposits exactly `assets` from `caller` and mints the resulting
    /// shares to `receiver`. Returns the shares minted.
    ///
    /// # Errors
    ///
    /// - [`VaultError::ExceededMaxDeposit`] above `max_deposit(receiver)`.
    /// - [`VaultError::InsufficientAllowance`] / [`VaultError::InsufficientBalance`]
    ///   if the asset collaborator refuses the pull.
    /// - [`VaultError::ArithmeticOverflow`] if the share math leaves `u128`.
    pub fn deposit(
        &mut self,
        caller: &Holder,
        assets: u128,
        receiver: &Holder,
    ) -> Result<u128, VaultError> {
        let limits = self.limits();
        let max = limits.max_deposit(receiver);
        if assets > max {
            debug!(%receiver, assets, max, "deposit above limit");
            return Err(VaultError::ExceededMaxDeposit {
                receiver: receiver.clone(),
                assets,
                max,
            });
        }
        let shares = limits.rate().to_shares(assets, Rounding::Down)?;

        self.enter(caller, receiver, assets, shares)?;

        info!(%caller, %receiver, assets, shares, "deposit");
        self.record(VaultEvent::Deposit {
            caller: caller.clone(),
            receiver: receiver.clone(),
            assets,
            shares,
        });
        Ok(shares)
    }

    /// Mints exactly `shares` to `receiver`, paid for by `caller`. Returns
    /// the assets pulled.
    ///
    /// # Errors
    ///
    /// - [`VaultError::ExceededMaxMint`] above `max_mint(receiver)`.
    /// - [`VaultError::InsufficientAllowance`] / [`VaultError::InsufficientBalance`]
    ///   if the asset collaborator refuses the pull.
    /// - [`VaultError::ArithmeticOverflow`] if the share math leaves `u128`.
    pub fn mint(
        &mut self,
        caller: &Holder,
        shares: u128,
        receiver: &Holder,
    ) -> Result<u128, VaultError> {
        let limits = self.limits();
        let max = limits.max_mint(receiver)?;
        if shares > max {
            debug!(%receiver, shares, max, "mint above limit");
            return Err(VaultError::ExceededMaxMint {
                receiver: receiver.clone(),
                shares,
                max,
            });
        }
        let assets = limits.rate().to_assets(shares, Rounding::Up)?;

        self.enter(caller, receiver, assets, shares)?;

        info!(%caller, %receiver, assets, shares, "mint");
        self.record(VaultEvent::Mint {
            caller: caller.clone(),
            receiver: receiver.clone(),
            assets,
            shares,
        });
        Ok(assets)
    }

    /// Sends exactly `assets` to `receiver`, burning the required shares
    /// from `owner`. Returns the shares burned.
    ///
    /// When `caller` is not `owner`, the burned shares are charged against
    /// the allowance `owner` granted `caller`.
    ///
    /// # Errors
    ///
    /// - [`VaultError::ExceededMaxWithdraw`] above `max_withdraw(owner)`.
    /// - [`VaultError::InsufficientAllowance`] if `caller` is not `owner`
    ///   and the share allowance is short.
    /// - [`VaultError::InsufficientBalance`] if the collaborator cannot pay
    ///   out of custody.
    pub fn withdraw(
        &mut self,
        caller: &Holder,
        assets: u128,
        receiver: &Holder,
        owner: &Holder,
    ) -> Result<u128, VaultError> {
        let limits = self.limits();
        let max = limits.max_withdraw(owner)?;
        if assets > max {
            debug!(%owner, assets, max, "withdraw above limit");
            return Err(VaultError::ExceededMaxWithdraw {
                owner: owner.clone(),
                assets,
                max,
            });
        }
        let shares = limits.rate().to_shares(assets, Rounding::Up)?;

        self.exit(caller, receiver, owner, assets, shares)?;

        info!(%caller, %receiver, %owner, assets, shares, "withdraw");
        self.record(VaultEvent::Withdraw {
            caller: caller.clone(),
            receiver: receiver.clone(),
            owner: owner.clone(),
            assets,
            shares,
        });
        Ok(shares)
    }

    /// Burns exactly `shares` from `owner` and sends the resulting assets
    /// to `receiver`. Returns the assets sent.
    ///
    /// Allowance handling is the same as [`withdraw`](Self::withdraw).
    ///
    /// # Errors
    ///
    /// - [`VaultError::ExceededMaxRedeem`] above `max_redeem(owner)`.
    /// - [`VaultError::InsufficientAllowance`] if `caller` is not `owner`
    ///   and the share allowance is short.
    /// - [`VaultError::InsufficientBalance`] if the collaborator cannot pay
    ///   out of custody.
    pub fn redeem(
        &mut self,
        caller: &Holder,
        shares: u128,
        receiver: &Holder,
        owner: &Holder,
    ) -> Result<u128, VaultError> {
        let limits = self.limits();
        let max = limits.max_redeem(owner);
        if shares > max {
            debug!(%owner, shares, max, "redeem above limit");
            return Err(VaultError::ExceededMaxRedeem {
                owner: owner.clone(),
                shares,
                max,
            });
        }
        let assets = limits.rate().to_assets(shares, Rounding::Down)?;

        self.exit(caller, receiver, owner, assets, shares)?;

        info!(%caller, %receiver, %owner, assets, shares, "redeem");
        self.record(VaultEvent::Redeem {
            caller: caller.clone(),
            receiver: receiver.clone(),
            owner: owner.clone(),
            assets,
            shares,
        });
        Ok(assets)
    }

    // -----------------------------------------------------------------------
    // Share Token
    // -----------------------------------------------------------------------

    /// Moves `shares` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InsufficientShareBalance`] if `from` is short.
    pub fn transfer(&mut self, from: &Holder, to: &Holder, shares: u128) -> Result<(), VaultError> {
        self.state.ledger.transfer(from, to, shares)?;
        self.record(VaultEvent::Transfer {
            from: Some(from.clone()),
            to: Some(to.clone()),
            shares,
        });
        Ok(())
    }

    /// Lets `spender` move up to `shares` of `owner`'s shares, replacing any
    /// previous allowance. `u128::MAX` never decreases.
    pub fn approve(&mut self, owner: &Holder, spender: &Holder, shares: u128) {
        self.state.ledger.approve(owner, spender, shares);
        self.record(VaultEvent::Approval {
            owner: owner.clone(),
            spender: spender.clone(),
            shares,
        });
    }

    /// Moves `shares` from `from` to `to` on the authority of `spender`'s
    /// allowance.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InsufficientAllowance`] if the allowance is
    /// short and [`VaultError::InsufficientShareBalance`] if `from` is.
    pub fn transfer_from(
        &mut self,
        spender: &Holder,
        from: &Holder,
        to: &Holder,
        shares: u128,
    ) -> Result<(), VaultError> {
        let allowance = self.state.ledger.allowance(from, spender);
        if allowance < shares {
            return Err(VaultError::InsufficientAllowance {
                allowance,
                needed: shares,
            });
        }

        self.state.ledger.transfer(from, to, shares)?;
        // Checked above, cannot fail.
        self.state.ledger.consume(from, spender, shares)?;

        self.record(VaultEvent::Transfer {
            from: Some(from.clone()),
            to: Some(to.clone()),
            shares,
        });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Mints `shares` to `receiver`, then pulls `assets` from `caller`.
    /// Undoes the mint if the pull is refused.
    fn enter(
        &mut self,
        caller: &Holder,
        receiver: &Holder,
        assets: u128,
        shares: u128,
    ) -> Result<(), VaultError> {
        self.state.ledger.mint(receiver, shares)?;

        if let Err(err) = self.asset.pull(caller, assets) {
            warn!(%caller, assets, error = %err, "asset pull refused, reverting mint");
            self.state.ledger.burn(receiver, shares)?;
            return Err(err.into());
        }

        self.record(VaultEvent::Transfer {
            from: None,
            to: Some(receiver.clone()),
            shares,
        });
        Ok(())
    }

    /// Spends allowance if needed, burns `shares` from `owner`, then pushes
    /// `assets` to `receiver`. Undoes both ledger effects if the push is
    /// refused.
    fn exit(
        &mut self,
        caller: &Holder,
        receiver: &Holder,
        owner: &Holder,
        assets: u128,
        shares: u128,
    ) -> Result<(), VaultError> {
        let delegated = caller != owner;
        let prior_allowance = self.state.ledger.allowance(owner, caller);
        if delegated && prior_allowance < shares {
            return Err(VaultError::InsufficientAllowance {
                allowance: prior_allowance,
                needed: shares,
            });
        }
        let balance = self.state.ledger.balance_of(owner);
        if balance < shares {
            return Err(VaultError::InsufficientShareBalance {
                holder: owner.clone(),
                balance,
                needed: shares,
            });
        }

        if delegated {
            self.state.ledger.consume(owner, caller, shares)?;
        }
        self.state.ledger.burn(owner, shares)?;

        if let Err(err) = self.asset.push(receiver, assets) {
            warn!(%receiver, assets, error = %err, "asset push refused, reverting burn");
            self.state.ledger.mint(owner, shares)?;
            if delegated {
                self.state.ledger.approve(owner, caller, prior_allowance);
            }
            return Err(err.into());
        }

        self.record(VaultEvent::Transfer {
            from: Some(owner.clone()),
            to: None,
            shares,
        });
        Ok(())
    }

    fn record(&mut self, event: VaultEvent) {
        self.state.events.push(event);
    }
}
