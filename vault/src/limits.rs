//! # Operation Limits
//!
//! Each operation has a ceiling, computed fresh from the current state:
//!
//! | Operation | Limit                                         |
//! |-----------|-----------------------------------------------|
//! | deposit   | unlimited, or `cap - total_assets` when capped |
//! | mint      | unlimited, or the shares that deposit headroom buys |
//! | withdraw  | asset value of the owner's shares, rounded down |
//! | redeem    | the owner's share balance                     |
//!
//! The executor checks these before touching anything. A request above the
//! limit is rejected outright; it is never trimmed to fit.

use crate::config::VaultConfig;
use crate::conversion::ExchangeRate;
use crate::holder::Holder;
use crate::ledger::ShareLedger;
use crate::math::{mul_div, MathError, Rounding};

/// Limit calculator over a borrowed view of the vault state.
#[derive(Debug, Clone, Copy)]
pub struct LimitPolicy<'a> {
    ledger: &'a ShareLedger,
    config: &'a VaultConfig,
    rate: ExchangeRate,
}

impl<'a> LimitPolicy<'a> {
    /// Builds a policy over `ledger`, converting at `rate`.
    pub fn new(ledger: &'a ShareLedger, config: &'a VaultConfig, rate: ExchangeRate) -> Self {
        Self {
            ledger,
            config,
            rate,
        }
    }

    /// The exchange rate the limits were computed against.
    pub fn rate(&self) -> ExchangeRate {
        self.rate
    }

    /// Largest deposit `receiver` may make, in assets.
    pub fn max_deposit(&self, _receiver: &Holder) -> u128 {
        match self.config.deposit_cap {
            Some(cap) => cap.saturating_sub(self.rate.total_assets),
            None => u128::MAX,
        }
    }

    /// Largest mint `receiver` may request, in shares.
    ///
    /// Under a cap this is the deposit headroom converted down, so a mint at
    /// the limit never needs more assets than the cap allows. A headroom
    /// worth more shares than a `u128` holds is reported as `u128::MAX`.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::Overflow`] if the padded pool totals themselves
    /// overflow while there is headroom to convert.
    pub fn max_mint(&self, receiver: &Holder) -> Result<u128, MathError> {
        if self.config.deposit_cap.is_none() {
            return Ok(u128::MAX);
        }
        let headroom = self.max_deposit(receiver);
        if headroom == 0 {
            return Ok(0);
        }
        let effective_shares = self.rate.effective_shares()?;
        let effective_assets = self.rate.effective_assets()?;
        match mul_div(headroom, effective_shares, effective_assets, Rounding::Down) {
            Err(MathError::Overflow) => Ok(u128::MAX),
            other => other,
        }
    }

    /// Largest withdrawal `owner` may make, in assets.
    pub fn max_withdraw(&self, owner: &Holder) -> Result<u128, MathError> {
        self.rate
            .to_assets(self.ledger.balance_of(owner), Rounding::Down)
    }

    /// Largest redemption `owner` may make, in shares.
    pub fn max_redeem(&self, owner: &Holder) -> u128 {
        self.ledger.balance_of(owner)
    }
}
