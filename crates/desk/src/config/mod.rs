pub mod types;
pub mod validate;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Load and merge all config JSON files into a single [`DeskConfig`],
/// then apply environment variable overrides and validate.
///
/// Expected directory layout:
/// ```text
/// config/
///   app.json
///   chain.json
///   transaction.json
///   indexers.json
/// ```
///
/// # Environment variable overrides
///
/// | Env Var                          | Config Field                                 |
/// |----------------------------------|----------------------------------------------|
/// | `PROVIDER_URL`                   | `chain.rpc.http_url`                         |
/// | `AAVE_V3_POOL_ADDRESS`           | `chain.contracts.aave_v3_pool`               |
/// | `AAVE_V3_UI_POOL_DATA_PROVIDER`  | `chain.contracts.aave_v3_data_provider`      |
/// | `WBNB_CONTRACT_ADDRESS`          | `chain.contracts.wrapped_native`             |
/// | `CONFIRMATION_TIMEOUT_SECONDS`   | `transaction.confirmation_timeout_seconds`   |
///
/// Credentials (`PRIVATE_KEY`, `ALCHEMY_API_KEY`, `UNMARSHAL_API_KEY`) are
/// never part of the config; the binary reads them when a command needs one.
pub fn load_config(config_dir: &Path) -> Result<DeskConfig> {
    let read = |name: &str| -> Result<String> {
        let path = config_dir.join(name);
        std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))
    };

    let app: AppConfig = serde_json::from_str(&read("app.json")?).context("parsing app.json")?;

    let chain: ChainConfig =
        serde_json::from_str(&read("chain.json")?).context("parsing chain.json")?;

    let transaction: TransactionConfig =
        serde_json::from_str(&read("transaction.json")?).context("parsing transaction.json")?;

    let indexers: IndexerConfig =
        serde_json::from_str(&read("indexers.json")?).context("parsing indexers.json")?;

    let mut config = DeskConfig {
        app,
        chain,
        transaction,
        indexers,
    };

    apply_env_overrides(&mut config);
    validate::validate_config(&config)?;

    Ok(config)
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides to the loaded config.
///
/// Only non-empty env vars take effect. Parse failures are skipped (the JSON
/// value remains).
fn apply_env_overrides(config: &mut DeskConfig) {
    if let Some(val) = env_string("PROVIDER_URL") {
        info!("env override: PROVIDER_URL");
        config.chain.rpc.http_url = val;
    }

    if let Some(val) = env_string("AAVE_V3_POOL_ADDRESS") {
        info!("env override: AAVE_V3_POOL_ADDRESS");
        config.chain.contracts.aave_v3_pool = val;
    }

    if let Some(val) = env_string("AAVE_V3_UI_POOL_DATA_PROVIDER") {
        info!("env override: AAVE_V3_UI_POOL_DATA_PROVIDER");
        config.chain.contracts.aave_v3_data_provider = val;
    }

    if let Some(val) = env_string("WBNB_CONTRACT_ADDRESS") {
        info!("env override: WBNB_CONTRACT_ADDRESS");
        config.chain.contracts.wrapped_native = val;
    }

    if let Some(val) = env_parse::<u64>("CONFIRMATION_TIMEOUT_SECONDS") {
        info!(val, "env override: CONFIRMATION_TIMEOUT_SECONDS");
        config.transaction.confirmation_timeout_seconds = val;
    }
}

/// Read a non-empty env var as a `String`.
pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Read a non-empty env var and parse it as `T`.
fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::path::PathBuf;

    fn project_config_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
    }

    // -----------------------------------------------------------------------
    // Helper: write a minimal set of config JSON files to a temp dir.
    // -----------------------------------------------------------------------

    fn write_test_configs(dir: &Path) {
        std::fs::write(dir.join("app.json"), r#"{ "logging": { "log_dir": "logs" } }"#).unwrap();

        std::fs::write(
            dir.join("chain.json"),
            r#"{
                "chain_id": 56,
                "chain_name": "BSC Mainnet",
                "native_symbol": "BNB",
                "rpc": { "http_url": "https://bsc-dataseed1.binance.org/" },
                "contracts": {
                    "aave_v3_pool": "0x6807dc923806fE8Fd134338EABCA509979a7e0cB",
                    "wrapped_native": "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c",
                    "aave_v3_data_provider": ""
                },
                "tokens": [
                    { "symbol": "USDT", "address": "0x55d398326f99059fF775485246999027B3197955", "decimals": 18 }
                ]
            }"#,
        )
        .unwrap();

        std::fs::write(
            dir.join("transaction.json"),
            r#"{
                "confirmation_timeout_seconds": 120,
                "simulation_timeout_seconds": 15,
                "receipt_poll_interval_ms": 1000,
                "wrap_gas_limit": 100000,
                "supply_gas_limit": 300000,
                "gas_price_buffer": 1.1
            }"#,
        )
        .unwrap();

        std::fs::write(
            dir.join("indexers.json"),
            r#"{
                "http_timeout_seconds": 10,
                "alchemy": { "base_url": "https://bnb-mainnet.g.alchemy.com/v2" },
                "unmarshal": { "base_url": "https://api.unmarshal.com", "chain": "bsc", "page_size": 100 }
            }"#,
        )
        .unwrap();
    }

    /// Remove all desk-related env vars so tests don't interfere with each other.
    fn clean_desk_env() {
        for key in [
            "PROVIDER_URL",
            "AAVE_V3_POOL_ADDRESS",
            "AAVE_V3_UI_POOL_DATA_PROVIDER",
            "WBNB_CONTRACT_ADDRESS",
            "CONFIRMATION_TIMEOUT_SECONDS",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_load_real_configs() {
        clean_desk_env();
        let dir = project_config_dir();
        if !dir.exists() {
            eprintln!("skipping: config dir not found at {}", dir.display());
            return;
        }
        let config = load_config(&dir).expect("config should load and validate");
        assert_eq!(config.chain.chain_id, 56);
        assert!(config.chain.pool_address().is_ok());
        clean_desk_env();
    }

    #[test]
    #[serial]
    fn test_load_test_configs() {
        clean_desk_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());
        let config = load_config(tmp.path()).expect("test config should load");
        assert_eq!(config.chain.chain_name, "BSC Mainnet");
        assert_eq!(config.transaction.supply_gas_limit, 300_000);
        assert_eq!(config.chain.tokens.len(), 1);
        assert_eq!(config.chain.data_provider_address().unwrap(), None);
        clean_desk_env();
    }

    #[test]
    #[serial]
    fn test_missing_config_file_errors() {
        clean_desk_env();
        let tmp = tempfile::tempdir().unwrap();
        let err = load_config(tmp.path()).unwrap_err();
        assert!(
            err.to_string().contains("failed to read config file"),
            "expected file-not-found error, got: {err}"
        );
    }

    #[test]
    #[serial]
    fn test_env_override_contracts() {
        clean_desk_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        std::env::set_var("AAVE_V3_POOL_ADDRESS", "0x1234567890abcdef1234567890abcdef12345678");
        std::env::set_var(
            "AAVE_V3_UI_POOL_DATA_PROVIDER",
            "0xc90Df74A7c16245c5F5C5870327Ceb38Fe5d5328",
        );
        std::env::set_var("PROVIDER_URL", "https://custom-rpc.example.com");

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(
            config.chain.contracts.aave_v3_pool,
            "0x1234567890abcdef1234567890abcdef12345678"
        );
        assert!(config.chain.data_provider_address().unwrap().is_some());
        assert_eq!(config.chain.rpc.http_url, "https://custom-rpc.example.com");
        clean_desk_env();
    }

    #[test]
    #[serial]
    fn test_env_override_timeout() {
        clean_desk_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        std::env::set_var("CONFIRMATION_TIMEOUT_SECONDS", "30");
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.transaction.confirmation_timeout_seconds, 30);
        clean_desk_env();
    }

    #[test]
    #[serial]
    fn test_env_override_empty_string_ignored() {
        clean_desk_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        std::env::set_var("PROVIDER_URL", "");
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.chain.rpc.http_url, "https://bsc-dataseed1.binance.org/");
        clean_desk_env();
    }

    #[test]
    #[serial]
    fn test_env_override_invalid_parse_ignored() {
        clean_desk_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        std::env::set_var("CONFIRMATION_TIMEOUT_SECONDS", "soon");
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.transaction.confirmation_timeout_seconds, 120);
        clean_desk_env();
    }

    #[test]
    #[serial]
    fn test_invalid_pool_address_rejected() {
        clean_desk_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        std::env::set_var("AAVE_V3_POOL_ADDRESS", "not-an-address");
        let err = load_config(tmp.path()).unwrap_err();
        assert!(
            err.to_string().contains("aave_v3_pool"),
            "expected pool address error, got: {err}"
        );
        clean_desk_env();
    }

    #[test]
    #[serial]
    fn test_zero_timeout_rejected() {
        clean_desk_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        std::env::set_var("CONFIRMATION_TIMEOUT_SECONDS", "0");
        let err = load_config(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("confirmation_timeout_seconds"));
        clean_desk_env();
    }
}
