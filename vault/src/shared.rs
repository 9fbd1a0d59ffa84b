//! # Shared Vault
//!
//! [`Vault`] relies on `&mut self` for exclusivity. Hosts that hand the same
//! vault to several threads use [`SharedVault`] instead: an
//! `Arc<Mutex<Vault>>` whose lock is held for the whole
//! read-compute-mutate sequence of each operation, so the exchange rate an
//! operation converts with is the one it commits against.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::asset::AssetBackend;
use crate::error::VaultError;
use crate::events::VaultEvent;
use crate::holder::Holder;
use crate::vault::{Vault, VaultState};

/// A cloneable, thread-safe handle to a [`Vault`].
#[derive(Debug)]
pub struct SharedVault<A> {
    inner: Arc<Mutex<Vault<A>>>,
}

impl<A> Clone for SharedVault<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: AssetBackend> SharedVault<A> {
    /// Wraps a vault for shared use.
    pub fn new(vault: Vault<A>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(vault)),
        }
    }

    /// Runs `f` with exclusive access to the vault. Use this to compose
    /// several calls under one lock.
    pub fn with<R>(&self, f: impl FnOnce(&mut Vault<A>) -> R) -> R {
        let mut vault = self.inner.lock();
        f(&mut vault)
    }

    /// See [`Vault::deposit`].
    pub fn deposit(&self, caller: &Holder, assets: u128, receiver: &Holder) -> Result<u128, VaultError> {
        self.inner.lock().deposit(caller, assets, receiver)
    }

    /// See [`Vault::mint`].
    pub fn mint(&self, caller: &Holder, shares: u128, receiver: &Holder) -> Result<u128, VaultError> {
        self.inner.lock().mint(caller, shares, receiver)
    }

    /// See [`Vault::withdraw`].
    pub fn withdraw(
        &self,
        caller: &Holder,
        assets: u128,
        receiver: &Holder,
        owner: &Holder,
    ) -> Result<u128, VaultError> {
        self.inner.lock().withdraw(caller, assets, receiver, owner)
    }

    /// See [`Vault::redeem`].
    pub fn redeem(
        &self,
        caller: &Holder,
        shares: u128,
        receiver: &Holder,
        owner: &Holder,
    ) -> Result<u128, VaultError> {
        self.inner.lock().redeem(caller, shares, receiver, owner)
    }

    /// Shares held by `holder`.
    pub fn balance_of(&self, holder: &Holder) -> u128 {
        self.inner.lock().balance_of(holder)
    }

    /// Shares outstanding.
    pub fn total_supply(&self) -> u128 {
        self.inner.lock().total_supply()
    }

    /// Assets under management.
    pub fn total_assets(&self) -> u128 {
        self.inner.lock().total_assets()
    }

    /// Drains recorded events.
    pub fn take_events(&self) -> Vec<VaultEvent> {
        self.inner.lock().take_events()
    }

    /// A copy of the current state record.
    pub fn snapshot(&self) -> VaultState {
        self.inner.lock().state().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetTransfer, AssetView, TransferError};
    use crate::config::VaultConfig;
    use std::thread;

    /// Asset that lets anyone pay anything; only custody is tracked.
    #[derive(Debug, Default)]
    struct OpenAsset {
        custody: u128,
    }

    impl AssetView for OpenAsset {
        fn total_assets(&self) -> u128 {
            self.custody
        }

        fn asset_id(&self) -> String {
            "open".into()
        }

        fn decimals(&self) -> u8 {
            18
        }
    }

    impl AssetTransfer for OpenAsset {
        fn pull(&mut self, _from: &Holder, amount: u128) -> Result<(), TransferError> {
            self.custody += amount;
            Ok(())
        }

        fn push(&mut self, _to: &Holder, amount: u128) -> Result<(), TransferError> {
            if self.custody < amount {
                return Err(TransferError::InsufficientBalance {
                    balance: self.custody,
                    needed: amount,
                });
            }
            self.custody -= amount;
            Ok(())
        }
    }

    #[test]
    fn concurrent_deposits_conserve_shares() {
        let vault = Vault::new(
            Holder::new("vault"),
            OpenAsset::default(),
            VaultConfig::default(),
        )
        .unwrap();
        let shared = SharedVault::new(vault);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let holder = Holder::new(format!("holder-{i}"));
                    for _ in 0..50 {
                        shared.deposit(&holder, 10, &holder).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.total_supply(), 8 * 50 * 10);
        assert_eq!(shared.total_assets(), 8 * 50 * 10);
        let snapshot = shared.snapshot();
        assert!(snapshot.ledger().is_conserved());
        assert_eq!(snapshot.ledger().holders().len(), 8);
    }

    #[test]
    fn with_composes_under_one_lock() {
        let vault = Vault::new(
            Holder::new("vault"),
            OpenAsset::default(),
            VaultConfig::default(),
        )
        .unwrap();
        let shared = SharedVault::new(vault);
        let alice = Holder::new("alice");

        let redeemed = shared.with(|v| {
            let shares = v.deposit(&alice, 100, &alice)?;
            v.redeem(&alice, shares, &alice, &alice)
        });
        assert_eq!(redeemed.unwrap(), 100);
        assert_eq!(shared.balance_of(&alice), 0);
        assert_eq!(shared.take_events().len(), 4);
    }
}
