//! Alchemy token API client: every ERC-20 a wallet holds, with metadata.

use std::time::Duration;

use alloy::primitives::{Address, U256};
use anyhow::{bail, Context, Result};
use futures::future::try_join_all;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::IndexerConfig;
use crate::constants::NATIVE_DECIMALS;
use crate::types::wad_ray::format_token_amount;
use crate::types::PortfolioToken;

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcFault>,
}

#[derive(Debug, Deserialize)]
struct RpcFault {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenBalancesResult {
    token_balances: Vec<RawTokenBalance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTokenBalance {
    contract_address: String,
    /// Hex quantity; `null` when Alchemy could not read the balance.
    token_balance: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenMetadataResult {
    name: Option<String>,
    symbol: Option<String>,
    decimals: Option<u8>,
    logo: Option<String>,
}

pub struct AlchemyClient {
    http: Client,
    endpoint: String,
}

impl AlchemyClient {
    pub fn new(config: &IndexerConfig, api_key: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            endpoint: format!("{}/{api_key}", config.alchemy.base_url.trim_end_matches('/')),
        })
    }

    /// All tokens `wallet` holds, metadata fetched concurrently.
    pub async fn token_portfolio(&self, wallet: Address) -> Result<Vec<PortfolioToken>> {
        let balances: TokenBalancesResult = self
            .rpc("alchemy_getTokenBalances", json!([format!("{wallet:#x}")]))
            .await?;
        debug!(wallet = %wallet, tokens = balances.token_balances.len(), "token balances fetched");

        let lookups = balances.token_balances.into_iter().map(|entry| async move {
            let meta: TokenMetadataResult = self
                .rpc("alchemy_getTokenMetadata", json!([entry.contract_address]))
                .await
                .with_context(|| format!("metadata for {}", entry.contract_address))?;
            Ok::<_, anyhow::Error>(portfolio_line(entry, meta))
        });

        try_join_all(lookups).await
    }

    async fn rpc<T: DeserializeOwned>(&self, method: &str, params: serde_json::Value) -> Result<T> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let envelope: RpcEnvelope<T> = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("{method} HTTP request failed"))?
            .error_for_status()
            .with_context(|| format!("{method} HTTP error status"))?
            .json()
            .await
            .with_context(|| format!("{method} JSON parse failed"))?;

        if let Some(fault) = envelope.error {
            bail!("{method} failed ({}): {}", fault.code, fault.message);
        }
        envelope
            .result
            .with_context(|| format!("{method} returned no result"))
    }
}

fn portfolio_line(entry: RawTokenBalance, meta: TokenMetadataResult) -> PortfolioToken {
    let decimals = meta.decimals.unwrap_or(NATIVE_DECIMALS);
    let raw = match entry.token_balance.as_deref().map(str::parse::<U256>) {
        Some(Ok(v)) => v,
        Some(Err(e)) => {
            warn!(token = %entry.contract_address, error = %e, "unparseable token balance");
            U256::ZERO
        }
        None => U256::ZERO,
    };

    PortfolioToken {
        name: meta.name.unwrap_or_default(),
        logo: meta.logo.unwrap_or_default(),
        symbol: meta.symbol.unwrap_or_default(),
        address: entry.contract_address,
        balance: format_token_amount(raw, decimals),
        decimals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balances_response_parses() {
        let raw = r#"{
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "address": "0xc33d53d4aca86a8e40c050e92d23e3842789641e",
                "tokenBalances": [
                    {"contractAddress": "0x55d398326f99059ff775485246999027b3197955",
                     "tokenBalance": "0x00000000000000000000000000000000000000000000000029a2241af62c0000"},
                    {"contractAddress": "0x8ac76a51cc950d9822d68b83fe1ad97b32cd580d",
                     "tokenBalance": null}
                ]
            }
        }"#;
        let env: RpcEnvelope<TokenBalancesResult> = serde_json::from_str(raw).unwrap();
        let balances = env.result.unwrap().token_balances;
        assert_eq!(balances.len(), 2);
        assert!(balances[1].token_balance.is_none());
    }

    #[test]
    fn test_portfolio_line_uses_token_decimals() {
        let entry = RawTokenBalance {
            contract_address: "0x8ac76a51cc950d9822d68b83fe1ad97b32cd580d".into(),
            token_balance: Some("0x2faf080".into()),
        };
        let meta = TokenMetadataResult {
            name: Some("USD Coin".into()),
            symbol: Some("USDC".into()),
            decimals: Some(6),
            logo: None,
        };
        let line = portfolio_line(entry, meta);
        assert_eq!(line.balance, "50");
        assert_eq!(line.decimals, 6);
        assert_eq!(line.logo, "");
    }

    #[test]
    fn test_portfolio_line_defaults() {
        let entry = RawTokenBalance {
            contract_address: "0x55d398326f99059ff775485246999027b3197955".into(),
            token_balance: Some("0x29a2241af62c0000".into()),
        };
        let line = portfolio_line(entry, TokenMetadataResult::default());
        assert_eq!(line.balance, "3");
        assert_eq!(line.decimals, 18);
        assert_eq!(line.symbol, "");
    }

    #[test]
    fn test_rpc_fault_parses() {
        let raw = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"invalid address"}}"#;
        let env: RpcEnvelope<TokenBalancesResult> = serde_json::from_str(raw).unwrap();
        assert!(env.result.is_none());
        assert_eq!(env.error.unwrap().code, -32602);
    }
}
