use anyhow::{bail, Result};

use super::types::DeskConfig;

/// Validate invariants across the merged config that serde alone cannot enforce.
///
/// Collects every problem before failing. Called automatically by
/// [`super::load_config`].
pub fn validate_config(config: &DeskConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    validate_app_config(config, &mut errors);
    validate_chain_config(config, &mut errors);
    validate_transaction_config(config, &mut errors);
    validate_indexer_config(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        let msg = format!(
            "Configuration validation failed ({} error{}):\n  - {}",
            errors.len(),
            if errors.len() == 1 { "" } else { "s" },
            errors.join("\n  - ")
        );
        bail!("{msg}");
    }
}

fn validate_app_config(config: &DeskConfig, errors: &mut Vec<String>) {
    if config.app.logging.log_dir.is_empty() {
        errors.push("app.logging: log_dir is empty".into());
    }
}

// ---------------------------------------------------------------------------
// Chain config
// ---------------------------------------------------------------------------

fn validate_chain_config(config: &DeskConfig, errors: &mut Vec<String>) {
    let chain = &config.chain;

    if chain.rpc.http_url.is_empty() {
        errors.push("chain.rpc: http_url is empty".into());
    }

    let contract_addrs = [
        ("aave_v3_pool", &chain.contracts.aave_v3_pool),
        ("wrapped_native", &chain.contracts.wrapped_native),
    ];

    for (name, addr) in &contract_addrs {
        if let Err(e) = validate_address(addr) {
            errors.push(format!("chain.contracts.{name}: {e}"));
        }
    }

    // The data provider is optional, but if set must be valid.
    if !chain.contracts.aave_v3_data_provider.is_empty() {
        if let Err(e) = validate_address(&chain.contracts.aave_v3_data_provider) {
            errors.push(format!("chain.contracts.aave_v3_data_provider: {e}"));
        }
    }

    for token in &chain.tokens {
        if let Err(e) = validate_address(&token.address) {
            errors.push(format!("chain.tokens.{}.address: {e}", token.symbol));
        }
    }
}

// ---------------------------------------------------------------------------
// Transaction config
// ---------------------------------------------------------------------------

fn validate_transaction_config(config: &DeskConfig, errors: &mut Vec<String>) {
    let tx = &config.transaction;

    let positive = [
        ("confirmation_timeout_seconds", tx.confirmation_timeout_seconds),
        ("simulation_timeout_seconds", tx.simulation_timeout_seconds),
        ("receipt_poll_interval_ms", tx.receipt_poll_interval_ms),
        ("wrap_gas_limit", tx.wrap_gas_limit),
        ("supply_gas_limit", tx.supply_gas_limit),
    ];
    for (name, value) in positive {
        if value == 0 {
            errors.push(format!("transaction: {name} must be > 0"));
        }
    }

    if !(tx.gas_price_buffer.is_finite() && tx.gas_price_buffer >= 1.0) {
        errors.push(format!(
            "transaction: gas_price_buffer ({}) must be >= 1.0",
            tx.gas_price_buffer
        ));
    }
}

// ---------------------------------------------------------------------------
// Indexer config
// ---------------------------------------------------------------------------

fn validate_indexer_config(config: &DeskConfig, errors: &mut Vec<String>) {
    let idx = &config.indexers;

    if idx.http_timeout_seconds == 0 {
        errors.push("indexers: http_timeout_seconds must be > 0".into());
    }
    if idx.alchemy.base_url.is_empty() {
        errors.push("indexers.alchemy: base_url is empty".into());
    }
    if idx.unmarshal.base_url.is_empty() {
        errors.push("indexers.unmarshal: base_url is empty".into());
    }
    if idx.unmarshal.page_size == 0 {
        errors.push("indexers.unmarshal: page_size must be > 0".into());
    }
}

/// Check that `addr` looks like a 20-byte hex address with `0x` prefix.
pub fn validate_address(addr: &str) -> std::result::Result<(), String> {
    if addr.is_empty() {
        return Err("address is empty".into());
    }
    let hex = addr
        .strip_prefix("0x")
        .ok_or_else(|| format!("address must start with 0x: {addr}"))?;
    if hex.len() != 40 {
        return Err(format!("address has wrong length ({}): {addr}", hex.len()));
    }
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("address contains non-hex characters: {addr}"));
    }
    Ok(())
}
