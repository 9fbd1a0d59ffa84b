//! Integration tests for the vault lifecycle against a real asset token.
//!
//! Each test deploys a fresh token with 1,000 units credited to the user,
//! opens an empty vault whose custody is a plain token account, and drives
//! deposit, mint, withdraw, and redeem end to end.

use strata_token::{AssetToken, TokenHandle, VaultCustody};
use strata_vault::{Holder, Vault, VaultConfig, VaultError, VaultEvent};

/// Helper: the account that funds the vault in every test.
fn user() -> Holder {
    Holder::new("user")
}

fn custody_account() -> Holder {
    Holder::new("vault")
}

/// Helper: a fresh vault plus a handle to its underlying token.
fn setup() -> (Vault<VaultCustody>, TokenHandle) {
    let token = AssetToken::with_supply("Test Token", "TTK", 18, &user(), 1_000).unwrap();
    let (custody, handle) = VaultCustody::wrap(token, custody_account());
    let vault = custody.open_vault(VaultConfig::default()).unwrap();
    (vault, handle)
}

/// Helper: approves the vault to pull `amount` of the user's tokens.
fn approve(handle: &TokenHandle, amount: u128) {
    handle.write().approve(&user(), &custody_account(), amount);
}

// ---------------------------------------------------------------------------
// Deposit
// ---------------------------------------------------------------------------

#[test]
fn deposit_assets_and_receive_shares() {
    let (mut vault, handle) = setup();
    approve(&handle, 100);

    let shares = vault.deposit(&user(), 100, &user()).unwrap();

    assert_eq!(shares, 100);
    assert_eq!(vault.balance_of(&user()), 100);
    assert_eq!(vault.total_assets(), 100);
    assert_eq!(handle.read().balance_of(&user()), 900);
    assert!(vault.events().contains(&VaultEvent::Deposit {
        caller: user(),
        receiver: user(),
        assets: 100,
        shares: 100,
    }));
}

#[test]
fn deposit_without_approval_fails() {
    let (mut vault, handle) = setup();

    let err = vault.deposit(&user(), 100, &user()).unwrap_err();

    assert_eq!(
        err,
        VaultError::InsufficientAllowance {
            allowance: 0,
            needed: 100
        }
    );
    assert_eq!(vault.balance_of(&user()), 0);
    assert_eq!(vault.total_supply(), 0);
    assert_eq!(handle.read().balance_of(&user()), 1_000);
    assert!(vault.events().is_empty());
}

#[test]
fn deposit_for_another_receiver() {
    let (mut vault, handle) = setup();
    approve(&handle, 100);
    let friend = Holder::new("friend");

    vault.deposit(&user(), 100, &friend).unwrap();

    assert_eq!(vault.balance_of(&friend), 100);
    assert_eq!(vault.balance_of(&user()), 0);
    assert_eq!(handle.read().balance_of(&user()), 900);
}

// ---------------------------------------------------------------------------
// Withdraw
// ---------------------------------------------------------------------------

#[test]
fn withdraw_assets_by_burning_shares() {
    let (mut vault, handle) = setup();
    approve(&handle, 100);
    vault.deposit(&user(), 100, &user()).unwrap();

    let burned = vault.withdraw(&user(), 50, &user(), &user()).unwrap();

    assert_eq!(burned, 50);
    assert_eq!(vault.balance_of(&user()), 50);
    assert_eq!(handle.read().balance_of(&user()), 950);
    assert_eq!(
        vault.events().last(),
        Some(&VaultEvent::Withdraw {
            caller: user(),
            receiver: user(),
            owner: user(),
            assets: 50,
            shares: 50,
        })
    );
}

#[test]
fn withdraw_without_shares_fails() {
    let (mut vault, _handle) = setup();

    let err = vault.withdraw(&user(), 100, &user(), &user()).unwrap_err();

    assert_eq!(
        err,
        VaultError::ExceededMaxWithdraw {
            owner: user(),
            assets: 100,
            max: 0
        }
    );
}

#[test]
fn delegated_withdraw_spends_share_allowance() {
    let (mut vault, handle) = setup();
    approve(&handle, 100);
    vault.deposit(&user(), 100, &user()).unwrap();

    let operator = Holder::new("operator");
    vault.approve(&user(), &operator, 60);
    let burned = vault.withdraw(&operator, 40, &operator, &user()).unwrap();

    assert_eq!(burned, 40);
    assert_eq!(vault.allowance(&user(), &operator), 20);
    assert_eq!(vault.balance_of(&user()), 60);
    assert_eq!(handle.read().balance_of(&operator), 40);

    let err = vault.withdraw(&operator, 30, &operator, &user()).unwrap_err();
    assert_eq!(
        err,
        VaultError::InsufficientAllowance {
            allowance: 20,
            needed: 30
        }
    );
}

// ---------------------------------------------------------------------------
// Mint
// ---------------------------------------------------------------------------

#[test]
fn mint_exact_shares() {
    let (mut vault, handle) = setup();
    approve(&handle, 100);

    let assets = vault.mint(&user(), 100, &user()).unwrap();

    assert_eq!(assets, 100);
    assert_eq!(vault.balance_of(&user()), 100);
    assert_eq!(handle.read().balance_of(&user()), 900);
    assert_eq!(
        vault.events().last(),
        Some(&VaultEvent::Mint {
            caller: user(),
            receiver: user(),
            assets: 100,
            shares: 100,
        })
    );
}

#[test]
fn mint_without_approval_fails() {
    let (mut vault, _handle) = setup();

    let err = vault.mint(&user(), 1_000, &user()).unwrap_err();

    assert_eq!(
        err,
        VaultError::InsufficientAllowance {
            allowance: 0,
            needed: 1_000
        }
    );
    assert_eq!(vault.total_supply(), 0);
}

// ---------------------------------------------------------------------------
// Redeem
// ---------------------------------------------------------------------------

#[test]
fn redeem_all_shares_returns_deposit() {
    let (mut vault, handle) = setup();
    approve(&handle, 100);
    vault.deposit(&user(), 100, &user()).unwrap();

    let assets = vault.redeem(&user(), 100, &user(), &user()).unwrap();

    assert_eq!(assets, 100);
    assert_eq!(vault.balance_of(&user()), 0);
    assert_eq!(vault.total_supply(), 0);
    assert_eq!(vault.total_assets(), 0);
    assert_eq!(handle.read().balance_of(&user()), 1_000);
}

#[test]
fn redeem_zero_is_a_noop() {
    let (mut vault, handle) = setup();

    let assets = vault.redeem(&user(), 0, &user(), &user()).unwrap();

    assert_eq!(assets, 0);
    assert_eq!(handle.read().balance_of(&user()), 1_000);
    assert_eq!(
        vault.events().last(),
        Some(&VaultEvent::Redeem {
            caller: user(),
            receiver: user(),
            owner: user(),
            assets: 0,
            shares: 0,
        })
    );
}

#[test]
fn redeem_without_shares_fails() {
    let (mut vault, _handle) = setup();

    let err = vault.redeem(&user(), 100, &user(), &user()).unwrap_err();

    assert_eq!(
        err,
        VaultError::ExceededMaxRedeem {
            owner: user(),
            shares: 100,
            max: 0
        }
    );
}

// ---------------------------------------------------------------------------
// Event Ordering
// ---------------------------------------------------------------------------

#[test]
fn full_cycle_event_log() {
    let (mut vault, handle) = setup();
    approve(&handle, 100);
    vault.deposit(&user(), 100, &user()).unwrap();
    vault.redeem(&user(), 100, &user(), &user()).unwrap();

    let names: Vec<_> = vault.take_events().iter().map(VaultEvent::name).collect();
    assert_eq!(names, ["transfer", "deposit", "transfer", "redeem"]);
    assert!(vault.events().is_empty());
}
