use alloy::primitives::Address;
use anyhow::{Context, Result};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Top-level aggregate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct DeskConfig {
    pub app: AppConfig,
    pub chain: ChainConfig,
    pub transaction: TransactionConfig,
    pub indexers: IndexerConfig,
}

// ---------------------------------------------------------------------------
// app.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
}

// ---------------------------------------------------------------------------
// chain.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub chain_name: String,
    pub native_symbol: String,
    pub rpc: RpcConfig,
    pub contracts: ContractsConfig,
    /// Tokens checked by the on-chain balance listing.
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    pub http_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
    pub aave_v3_pool: String,
    pub wrapped_native: String,
    /// Optional; empty disables the enable-as-collateral step.
    #[serde(default)]
    pub aave_v3_data_provider: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub symbol: String,
    pub address: String,
    pub decimals: u8,
}

impl ChainConfig {
    pub fn pool_address(&self) -> Result<Address> {
        self.contracts
            .aave_v3_pool
            .parse()
            .context("failed to parse aave_v3_pool address")
    }

    pub fn wrapped_native_address(&self) -> Result<Address> {
        self.contracts
            .wrapped_native
            .parse()
            .context("failed to parse wrapped_native address")
    }

    /// `None` when no data provider is configured.
    pub fn data_provider_address(&self) -> Result<Option<Address>> {
        if self.contracts.aave_v3_data_provider.is_empty() {
            return Ok(None);
        }
        self.contracts
            .aave_v3_data_provider
            .parse()
            .map(Some)
            .context("failed to parse aave_v3_data_provider address")
    }
}

// ---------------------------------------------------------------------------
// transaction.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionConfig {
    pub confirmation_timeout_seconds: u64,
    pub simulation_timeout_seconds: u64,
    pub receipt_poll_interval_ms: u64,
    pub wrap_gas_limit: u64,
    pub supply_gas_limit: u64,
    /// Multiplier applied to the node's gas price.
    pub gas_price_buffer: f64,
}

// ---------------------------------------------------------------------------
// indexers.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct IndexerConfig {
    pub http_timeout_seconds: u64,
    pub alchemy: AlchemyConfig,
    pub unmarshal: UnmarshalConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlchemyConfig {
    /// JSON-RPC endpoint without the trailing API key segment.
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnmarshalConfig {
    pub base_url: String,
    /// Chain slug in Unmarshal paths, e.g. `bsc`.
    pub chain: String,
    pub page_size: u32,
}
