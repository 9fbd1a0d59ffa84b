//! Walkthrough of a Strata vault's lifecycle against an in-memory token.
//!
//! Two depositors enter, a strategy harvest raises the share price, one
//! holder withdraws through an operator, and everyone redeems. Every step
//! is logged through `tracing`; set `RUST_LOG=strata_vault=debug` for the
//! engine's internals and `STRATA_LOG_FORMAT=json` for machine-readable
//! output. A vault config can be supplied as JSON in `STRATA_VAULT_CONFIG`.
//!
//! Run with:
//!   cargo run -p strata-token --example lifecycle

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use strata_token::{AssetToken, VaultCustody, UNLIMITED_APPROVAL};
use strata_vault::{Holder, VaultConfig};

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    /// Human-readable output.
    Pretty,
    /// JSON lines.
    Json,
}

impl LogFormat {
    /// Accepts "json" (case-insensitive); anything else is `Pretty`.
    fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides `default_level`.
fn init_logging(default_level: &str, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_target(true))
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_target(true))
                .init();
        }
    }
}

fn load_config() -> Result<VaultConfig> {
    match std::env::var("STRATA_VAULT_CONFIG") {
        Ok(json) => VaultConfig::from_json(&json).context("invalid STRATA_VAULT_CONFIG"),
        Err(_) => Ok(VaultConfig::with_offset(3)),
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let format = LogFormat::from_str_lossy(&std::env::var("STRATA_LOG_FORMAT").unwrap_or_default());
    init_logging("info", format);

    let config = load_config()?;
    let custody = Holder::new("vault");
    let alice = Holder::new("alice");
    let bob = Holder::new("bob");
    let operator = Holder::new("operator");

    let mut token = AssetToken::new("Demo Dollar", "dusd", 6);
    for holder in [&alice, &bob] {
        token.mint(holder, 10_000_000)?;
        token.approve(holder, &custody, UNLIMITED_APPROVAL);
    }
    let (backend, handle) = VaultCustody::wrap(token, custody.clone());
    let mut vault = backend.open_vault(config)?;
    info!(asset = %vault.asset(), decimals = vault.decimals(), "vault ready");

    // 1. Deposits
    let alice_shares = vault.deposit(&alice, 4_000_000, &alice)?;
    let bob_shares = vault.deposit(&bob, 1_000_000, &bob)?;
    info!(alice_shares, bob_shares, "initial deposits");

    // 2. Strategy gain: 10% on assets under management
    vault.backend().harvest(500_000)?;
    info!(
        total_assets = vault.total_assets(),
        price_per_share = vault.convert_to_assets(10u128.pow(u32::from(vault.decimals())))?,
        "harvest"
    );

    // 3. Delegated withdraw
    vault.approve(&alice, &operator, alice_shares / 4);
    let burned = vault.withdraw(&operator, 1_000_000, &operator, &alice)?;
    info!(burned, remaining_allowance = vault.allowance(&alice, &operator), "operator withdrew for alice");

    // 4. Everyone exits
    for holder in [&alice, &bob] {
        let shares = vault.max_redeem(holder);
        let assets = vault.redeem(holder, shares, holder, holder)?;
        info!(%holder, shares, assets, "exit");
    }

    for event in vault.take_events() {
        info!(event = event.name(), detail = %serde_json::to_string(&event)?, "event");
    }

    let token = handle.read();
    info!(
        alice = token.balance_of(&alice),
        bob = token.balance_of(&bob),
        operator = token.balance_of(&operator),
        dust = token.balance_of(vault.state().custody()),
        "final token balances"
    );
    Ok(())
}
