//! # Vault Errors
//!
//! One taxonomy for everything an operation can fail with. Limit violations
//! are checked before anything is touched. Collaborator refusals are
//! surfaced as-is. The last two variants are invariant guards: seeing them
//! from a well-formed call means the limit policy let something through it
//! should not have.

use thiserror::Error;

use crate::asset::TransferError;
use crate::holder::Holder;
use crate::ledger::LedgerError;
use crate::math::MathError;

/// Errors returned by vault operations. Every error means the operation
/// did not happen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    /// Deposit larger than `max_deposit(receiver)`.
    #[error("exceeded max deposit for {receiver}: requested {assets}, max {max}")]
    ExceededMaxDeposit {
        /// Receiver of the shares.
        receiver: Holder,
        /// Assets requested.
        assets: u128,
        /// Current limit.
        max: u128,
    },

    /// Mint larger than `max_mint(receiver)`.
    #[error("exceeded max mint for {receiver}: requested {shares}, max {max}")]
    ExceededMaxMint {
        /// Receiver of the shares.
        receiver: Holder,
        /// Shares requested.
        shares: u128,
        /// Current limit.
        max: u128,
    },

    /// Withdrawal larger than `max_withdraw(owner)`.
    #[error("exceeded max withdraw for {owner}: requested {assets}, max {max}")]
    ExceededMaxWithdraw {
        /// Owner of the shares.
        owner: Holder,
        /// Assets requested.
        assets: u128,
        /// Current limit.
        max: u128,
    },

    /// Redemption larger than `max_redeem(owner)`.
    #[error("exceeded max redeem for {owner}: requested {shares}, max {max}")]
    ExceededMaxRedeem {
        /// Owner of the shares.
        owner: Holder,
        /// Shares requested.
        shares: u128,
        /// Current limit.
        max: u128,
    },

    /// An asset approval or a share allowance does not cover the amount.
    #[error("insufficient allowance: approved {allowance}, needed {needed}")]
    InsufficientAllowance {
        /// Current allowance.
        allowance: u128,
        /// Amount required.
        needed: u128,
    },

    /// The asset collaborator reported a short balance.
    #[error("insufficient balance: holds {balance}, needed {needed}")]
    InsufficientBalance {
        /// Current balance of the debited account.
        balance: u128,
        /// Amount required.
        needed: u128,
    },

    /// A burn or share transfer would drive a balance negative.
    #[error("insufficient share balance: {holder} has {balance}, needs {needed}")]
    InsufficientShareBalance {
        /// Holder being debited.
        holder: Holder,
        /// Current share balance.
        balance: u128,
        /// Shares required.
        needed: u128,
    },

    /// A checked computation left the representable range.
    #[error("arithmetic overflow: {0}")]
    ArithmeticOverflow(MathError),
}

impl From<TransferError> for VaultError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::InsufficientAllowance { allowance, needed } => {
                VaultError::InsufficientAllowance { allowance, needed }
            }
            TransferError::InsufficientBalance { balance, needed } => {
                VaultError::InsufficientBalance { balance, needed }
            }
        }
    }
}

impl From<LedgerError> for VaultError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientShares {
                holder,
                balance,
                needed,
            } => VaultError::InsufficientShareBalance {
                holder,
                balance,
                needed,
            },
            LedgerError::InsufficientAllowance {
                allowance, needed, ..
            } => VaultError::InsufficientAllowance { allowance, needed },
            LedgerError::Overflow { .. } | LedgerError::SupplyUnderflow { .. } => {
                VaultError::ArithmeticOverflow(MathError::Overflow)
            }
        }
    }
}

impl From<MathError> for VaultError {
    fn from(err: MathError) -> Self {
        VaultError::ArithmeticOverflow(err)
    }
}

impl VaultError {
    /// Returns `true` for the invariant guards that a correct limit policy
    /// should make unreachable.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            VaultError::InsufficientShareBalance { .. } | VaultError::ArithmeticOverflow(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_errors_surface_verbatim() {
        let err: VaultError = TransferError::InsufficientAllowance {
            allowance: 0,
            needed: 100,
        }
        .into();
        assert_eq!(
            err,
            VaultError::InsufficientAllowance {
                allowance: 0,
                needed: 100
            }
        );
        assert!(!err.is_invariant_violation());
    }

    #[test]
    fn ledger_shortfall_is_invariant_violation() {
        let err: VaultError = LedgerError::InsufficientShares {
            holder: Holder::new("alice"),
            balance: 1,
            needed: 2,
        }
        .into();
        assert!(matches!(err, VaultError::InsufficientShareBalance { .. }));
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn supply_underflow_is_arithmetic_guard() {
        let err: VaultError = LedgerError::SupplyUnderflow {
            total_shares: 0,
            amount: 100,
        }
        .into();
        assert_eq!(err, VaultError::ArithmeticOverflow(MathError::Overflow));
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn math_errors_map_to_overflow() {
        let err: VaultError = MathError::DivisionByZero.into();
        assert_eq!(err, VaultError::ArithmeticOverflow(MathError::DivisionByZero));
        assert_eq!(err.to_string(), "arithmetic overflow: division by zero");
    }

    #[test]
    fn limit_error_message() {
        let err = VaultError::ExceededMaxRedeem {
            owner: Holder::new("alice"),
            shares: 100,
            max: 0,
        };
        assert_eq!(
            err.to_string(),
            "exceeded max redeem for alice: requested 100, max 0"
        );
    }
}
