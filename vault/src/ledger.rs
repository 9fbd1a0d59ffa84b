//! # Share Ledger
//!
//! The ledger is the vault's own bookkeeping: who holds how many shares,
//! how many exist in total, and who may spend whose shares. It knows
//! nothing about assets or exchange rates. Every mutation keeps the one
//! invariant that matters:
//!
//! ```text
//! sum(balances) == total_shares
//! ```
//!
//! Entries are created on first credit and never removed. A zero balance is
//! a perfectly valid resting state, not a deletion.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::holder::Holder;

/// An allowance of this size is never decremented.
pub const INFINITE_ALLOWANCE: u128 = u128::MAX;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by ledger mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Attempted to debit more shares than the holder owns.
    #[error("insufficient share balance: {holder} has {balance}, needs {needed}")]
    InsufficientShares {
        /// The holder being debited.
        holder: Holder,
        /// Current share balance.
        balance: u128,
        /// Shares requested.
        needed: u128,
    },

    /// The spender's allowance does not cover the amount.
    #[error("insufficient allowance: {spender} may spend {allowance} of {owner}'s shares, needs {needed}")]
    InsufficientAllowance {
        /// Owner of the shares.
        owner: Holder,
        /// Account trying to spend them.
        spender: Holder,
        /// Current allowance.
        allowance: u128,
        /// Shares requested.
        needed: u128,
    },

    /// A credit would push a balance or the total supply past `u128::MAX`.
    #[error("share supply overflow: crediting {amount}")]
    Overflow {
        /// The amount that did not fit.
        amount: u128,
    },

    /// A debit is covered by the holder's balance but not by the total
    /// supply. Only a ledger whose balances exceed its supply gets here.
    #[error("share supply underflow: burning {amount} from total {total_shares}")]
    SupplyUnderflow {
        /// The recorded total supply.
        total_shares: u128,
        /// The amount being burned.
        amount: u128,
    },
}

// ---------------------------------------------------------------------------
// ShareAllowance
// ---------------------------------------------------------------------------

/// Delegated spending of shares.
///
/// Withdraw and redeem consult this only when the caller is not the owner.
pub trait ShareAllowance {
    /// Shares `spender` may currently spend on behalf of `owner`.
    fn allowance(&self, owner: &Holder, spender: &Holder) -> u128;

    /// Deducts `amount` from the allowance. Infinite allowances are left
    /// untouched.
    fn consume(&mut self, owner: &Holder, spender: &Holder, amount: u128)
        -> Result<(), LedgerError>;
}

// ---------------------------------------------------------------------------
// ShareLedger
// ---------------------------------------------------------------------------

/// Share balances, total supply, and share allowances.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShareLedger {
    /// Share balance per holder.
    balances: HashMap<Holder, u128>,
    /// Sum of all balances.
    total_shares: u128,
    /// `owner -> (spender -> shares)`.
    allowances: HashMap<Holder, HashMap<Holder, u128>>,
}

impl ShareLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shares held by `holder`, or 0 if it has never held any.
    pub fn balance_of(&self, holder: &Holder) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Total shares outstanding.
    pub fn total_shares(&self) -> u128 {
        self.total_shares
    }

    /// Issues new shares to `to`.
    ///
    /// Both the balance and the total are checked before either is written,
    /// so a failed mint changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Overflow`] if the balance or the total supply
    /// would exceed `u128::MAX`.
    pub fn mint(&mut self, to: &Holder, amount: u128) -> Result<u128, LedgerError> {
        let new_total = self
            .total_shares
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { amount })?;
        let new_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { amount })?;

        self.balances.insert(to.clone(), new_balance);
        self.total_shares = new_total;
        Ok(new_balance)
    }

    /// Destroys shares held by `from`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientShares`] if `from` holds fewer
    /// than `amount` shares, and [`LedgerError::SupplyUnderflow`] if the
    /// total supply does not cover the burn. Neither case writes anything.
    pub fn burn(&mut self, from: &Holder, amount: u128) -> Result<u128, LedgerError> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(LedgerError::InsufficientShares {
                holder: from.clone(),
                balance,
                needed: amount,
            });
        }
        let new_total = self
            .total_shares
            .checked_sub(amount)
            .ok_or(LedgerError::SupplyUnderflow {
                total_shares: self.total_shares,
                amount,
            })?;

        let new_balance = balance - amount;
        self.balances.insert(from.clone(), new_balance);
        self.total_shares = new_total;
        Ok(new_balance)
    }

    /// Moves shares between holders. Total supply is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientShares`] if `from` is short, or
    /// [`LedgerError::Overflow`] if the recipient's balance would overflow.
    pub fn transfer(&mut self, from: &Holder, to: &Holder, amount: u128) -> Result<(), LedgerError> {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(LedgerError::InsufficientShares {
                holder: from.clone(),
                balance: from_balance,
                needed: amount,
            });
        }
        if from == to {
            return Ok(());
        }

        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { amount })?;

        self.balances.insert(from.clone(), from_balance - amount);
        self.balances.insert(to.clone(), to_balance);
        Ok(())
    }

    /// Sets the allowance of `spender` over `owner`'s shares, replacing
    /// any previous value.
    pub fn approve(&mut self, owner: &Holder, spender: &Holder, amount: u128) {
        self.allowances
            .entry(owner.clone())
            .or_default()
            .insert(spender.clone(), amount);
    }

    /// Number of holders with a ledger entry, including zero balances.
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// All `(holder, balance)` pairs with a non-zero balance.
    pub fn holders(&self) -> Vec<(Holder, u128)> {
        self.balances
            .iter()
            .filter(|(_, balance)| **balance > 0)
            .map(|(holder, balance)| (holder.clone(), *balance))
            .collect()
    }

    /// Returns `true` if the balances add up to the total supply.
    pub fn is_conserved(&self) -> bool {
        let mut sum: u128 = 0;
        for balance in self.balances.values() {
            match sum.checked_add(*balance) {
                Some(next) => sum = next,
                None => return false,
            }
        }
        sum == self.total_shares
    }
}

impl ShareAllowance for ShareLedger {
    fn allowance(&self, owner: &Holder, spender: &Holder) -> u128 {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    fn consume(
        &mut self,
        owner: &Holder,
        spender: &Holder,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let current = self.allowance(owner, spender);
        if current == INFINITE_ALLOWANCE {
            return Ok(());
        }
        if current < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: owner.clone(),
                spender: spender.clone(),
                allowance: current,
                needed: amount,
            });
        }
        self.approve(owner, spender, current - amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Holder {
        Holder::new("alice")
    }

    fn bob() -> Holder {
        Holder::new("bob")
    }

    #[test]
    fn mint_creates_entry_and_supply() {
        let mut ledger = ShareLedger::new();
        assert_eq!(ledger.mint(&alice(), 100).unwrap(), 100);
        assert_eq!(ledger.balance_of(&alice()), 100);
        assert_eq!(ledger.total_shares(), 100);
        assert!(ledger.is_conserved());
    }

    #[test]
    fn mint_overflow_leaves_ledger_untouched() {
        let mut ledger = ShareLedger::new();
        ledger.mint(&alice(), u128::MAX).unwrap();
        let result = ledger.mint(&bob(), 1);
        assert_eq!(result, Err(LedgerError::Overflow { amount: 1 }));
        assert_eq!(ledger.balance_of(&bob()), 0);
        assert_eq!(ledger.total_shares(), u128::MAX);
    }

    #[test]
    fn burn_to_zero_keeps_entry() {
        let mut ledger = ShareLedger::new();
        ledger.mint(&alice(), 50).unwrap();
        assert_eq!(ledger.burn(&alice(), 50).unwrap(), 0);
        assert_eq!(ledger.holder_count(), 1);
        assert!(ledger.holders().is_empty());
        assert_eq!(ledger.total_shares(), 0);
    }

    #[test]
    fn burn_more_than_balance_rejected() {
        let mut ledger = ShareLedger::new();
        ledger.mint(&alice(), 10).unwrap();
        let err = ledger.burn(&alice(), 11).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientShares {
                balance: 10,
                needed: 11,
                ..
            }
        ));
        assert_eq!(ledger.balance_of(&alice()), 10);
    }

    #[test]
    fn burn_against_short_supply_is_rejected_untouched() {
        let json = r#"{"balances":{"alice":100},"total_shares":40,"allowances":{}}"#;
        let mut ledger: ShareLedger = serde_json::from_str(json).expect("deserialize");
        assert!(!ledger.is_conserved());

        let err = ledger.burn(&alice(), 100).unwrap_err();
        assert_eq!(
            err,
            LedgerError::SupplyUnderflow {
                total_shares: 40,
                amount: 100
            }
        );
        assert_eq!(ledger.balance_of(&alice()), 100);
        assert_eq!(ledger.total_shares(), 40);
    }

    #[test]
    fn transfer_moves_without_changing_supply() {
        let mut ledger = ShareLedger::new();
        ledger.mint(&alice(), 100).unwrap();
        ledger.transfer(&alice(), &bob(), 30).unwrap();
        assert_eq!(ledger.balance_of(&alice()), 70);
        assert_eq!(ledger.balance_of(&bob()), 30);
        assert_eq!(ledger.total_shares(), 100);
        assert!(ledger.is_conserved());
    }

    #[test]
    fn self_transfer_is_noop() {
        let mut ledger = ShareLedger::new();
        ledger.mint(&alice(), 100).unwrap();
        ledger.transfer(&alice(), &alice(), 100).unwrap();
        assert_eq!(ledger.balance_of(&alice()), 100);
    }

    #[test]
    fn consume_decrements_finite_allowance() {
        let mut ledger = ShareLedger::new();
        ledger.approve(&alice(), &bob(), 40);
        ledger.consume(&alice(), &bob(), 15).unwrap();
        assert_eq!(ledger.allowance(&alice(), &bob()), 25);
    }

    #[test]
    fn consume_leaves_infinite_allowance() {
        let mut ledger = ShareLedger::new();
        ledger.approve(&alice(), &bob(), INFINITE_ALLOWANCE);
        ledger.consume(&alice(), &bob(), 1_000).unwrap();
        assert_eq!(ledger.allowance(&alice(), &bob()), INFINITE_ALLOWANCE);
    }

    #[test]
    fn consume_beyond_allowance_rejected() {
        let mut ledger = ShareLedger::new();
        ledger.approve(&alice(), &bob(), 5);
        let err = ledger.consume(&alice(), &bob(), 6).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientAllowance {
                allowance: 5,
                needed: 6,
                ..
            }
        ));
        assert_eq!(ledger.allowance(&alice(), &bob()), 5);
    }

    #[test]
    fn ledger_serialization_roundtrip() {
        let mut ledger = ShareLedger::new();
        ledger.mint(&alice(), 42).unwrap();
        ledger.approve(&alice(), &bob(), 7);

        let json = serde_json::to_string(&ledger).expect("serialize");
        let recovered: ShareLedger = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(recovered.balance_of(&alice()), 42);
        assert_eq!(recovered.total_shares(), 42);
        assert_eq!(recovered.allowance(&alice(), &bob()), 7);
    }
}
