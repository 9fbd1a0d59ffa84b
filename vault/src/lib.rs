// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Strata Vault — Share Accounting Engine
//!
//! A tokenized vault takes in an underlying fungible asset and hands out
//! shares: proportional claims on whatever the pool holds at the time of
//! redemption. This crate is the accounting engine behind that exchange.
//! It does not hold tokens itself. It keeps the share ledger, decides how
//! many shares an amount of assets is worth (and the reverse), enforces the
//! per-operation limits, and tells an asset collaborator when to pull or
//! push funds.
//!
//! ## Architecture
//!
//! ```text
//! math.rs        — 256-bit mul-div with an explicit rounding mode
//! conversion.rs  — asset <-> share exchange with a virtual offset
//! ledger.rs      — share balances, total supply, share allowances
//! limits.rs      — max deposit / mint / withdraw / redeem
//! asset.rs       — collaborator traits for the underlying asset
//! events.rs      — records emitted by every state change
//! vault.rs       — deposit, mint, withdraw, redeem
//! shared.rs      — lock-wrapped vault for multi-threaded hosts
//! config.rs      — offsets, caps, and the knobs that go with them
//! ```
//!
//! ## Design Principles
//!
//! 1. **Rounding always favors the vault.** Depositors get shares rounded
//!    down, minters pay assets rounded up, withdrawers burn shares rounded
//!    up, redeemers receive assets rounded down. A round-trip can lose a
//!    unit of dust to the pool; it can never gain one.
//! 2. **No wrapping arithmetic.** Products are taken in 256 bits and every
//!    narrowing back to `u128` is checked.
//! 3. **Atomic operations.** An operation either commits everything or
//!    leaves the ledger exactly as it found it, including when the asset
//!    collaborator refuses a transfer halfway through.
//! 4. **State is an explicit value.** All pool state lives in a single
//!    [`VaultState`] record owned by the [`Vault`]. Nothing is global.

pub mod asset;
pub mod config;
pub mod conversion;
pub mod error;
pub mod events;
pub mod holder;
pub mod ledger;
pub mod limits;
pub mod math;
pub mod shared;
pub mod vault;

pub use asset::{AssetBackend, AssetTransfer, AssetView, TransferError};
pub use config::{ConfigError, VaultConfig};
pub use conversion::ExchangeRate;
pub use error::VaultError;
pub use events::VaultEvent;
pub use holder::Holder;
pub use ledger::{ShareAllowance, ShareLedger};
pub use math::{MathError, Rounding};
pub use shared::SharedVault;
pub use vault::{Vault, VaultState};
