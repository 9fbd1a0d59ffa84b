//! # Vault Events
//!
//! Every committed state change leaves a record. The engine appends them to
//! the state's event log and never reads them back; observers (indexers, a
//! host's log shipper, tests) drain the log with
//! [`Vault::take_events`](crate::vault::Vault::take_events).

use serde::{Deserialize, Serialize};

use crate::holder::Holder;

/// A record of one committed state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VaultEvent {
    /// Assets deposited, shares minted to `receiver`.
    Deposit {
        caller: Holder,
        receiver: Holder,
        assets: u128,
        shares: u128,
    },

    /// Exact shares minted to `receiver`, assets paid by `caller`.
    Mint {
        caller: Holder,
        receiver: Holder,
        assets: u128,
        shares: u128,
    },

    /// Exact assets withdrawn to `receiver`, shares burned from `owner`.
    Withdraw {
        caller: Holder,
        receiver: Holder,
        owner: Holder,
        assets: u128,
        shares: u128,
    },

    /// Exact shares redeemed from `owner`, assets sent to `receiver`.
    Redeem {
        caller: Holder,
        receiver: Holder,
        owner: Holder,
        assets: u128,
        shares: u128,
    },

    /// Shares moved. `from` is `None` on mint, `to` is `None` on burn.
    Transfer {
        from: Option<Holder>,
        to: Option<Holder>,
        shares: u128,
    },

    /// Share allowance set.
    Approval {
        owner: Holder,
        spender: Holder,
        shares: u128,
    },
}

impl VaultEvent {
    /// Short name of the event, as it appears in logs.
    pub fn name(&self) -> &'static str {
        match self {
            VaultEvent::Deposit { .. } => "deposit",
            VaultEvent::Mint { .. } => "mint",
            VaultEvent::Withdraw { .. } => "withdraw",
            VaultEvent::Redeem { .. } => "redeem",
            VaultEvent::Transfer { .. } => "transfer",
            VaultEvent::Approval { .. } => "approval",
        }
    }
}
