//! # Strata Token
//!
//! The asset side of a Strata vault. The engine in `strata-vault` only
//! keeps share books; it needs something that actually holds the
//! underlying tokens. This crate provides both halves of that:
//!
//! - **Asset Token** — an in-memory fungible token with balances,
//!   approvals, and issuer-side mint and burn.
//! - **Vault Custody** — an adapter that exposes one token account as the
//!   vault's custody, implementing the engine's asset collaborator traits.
//!   It also carries the hooks a strategy uses to move total assets
//!   (harvest, loss, donation) without going through the vault.

pub mod custody;
pub mod token;

pub use custody::{TokenHandle, VaultCustody};
pub use token::{AssetToken, TokenError, UNLIMITED_APPROVAL};
