//! Unmarshal transaction-history client.

use std::time::Duration;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::IndexerConfig;

/// One page of a wallet's transaction history. Individual transactions are
/// passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub items_on_page: u32,
    #[serde(default)]
    pub total_txs: u64,
    #[serde(default)]
    pub transactions: Vec<serde_json::Value>,
}

pub struct HistoryClient {
    http: Client,
    base_url: String,
    chain: String,
    page_size: u32,
    api_key: String,
}

impl HistoryClient {
    pub fn new(config: &IndexerConfig, api_key: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: config.unmarshal.base_url.trim_end_matches('/').to_string(),
            chain: config.unmarshal.chain.clone(),
            page_size: config.unmarshal.page_size,
            api_key,
        })
    }

    fn transactions_url(&self, wallet: Address) -> String {
        format!(
            "{}/v3/{}/address/{wallet:#x}/transactions",
            self.base_url, self.chain
        )
    }

    /// Fetch page `page` (1-based) of `wallet`'s transactions.
    pub async fn transactions(&self, wallet: Address, page: u32) -> Result<TransactionPage> {
        let page = page.max(1);
        let result: TransactionPage = self
            .http
            .get(self.transactions_url(wallet))
            .query(&[
                ("page", page.to_string()),
                ("pageSize", self.page_size.to_string()),
                ("auth_key", self.api_key.clone()),
            ])
            .send()
            .await
            .context("Unmarshal HTTP request failed")?
            .error_for_status()
            .context("Unmarshal HTTP error status")?
            .json()
            .await
            .context("Unmarshal JSON parse failed")?;

        debug!(
            wallet = %wallet,
            page = result.page,
            total_pages = result.total_pages,
            items = result.items_on_page,
            "transaction history fetched"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AlchemyConfig, UnmarshalConfig};
    use alloy::primitives::address;

    fn config() -> IndexerConfig {
        IndexerConfig {
            http_timeout_seconds: 5,
            alchemy: AlchemyConfig {
                base_url: "https://bnb-mainnet.g.alchemy.com/v2".into(),
            },
            unmarshal: UnmarshalConfig {
                base_url: "https://api.unmarshal.com/".into(),
                chain: "bsc".into(),
                page_size: 100,
            },
        }
    }

    #[test]
    fn test_transactions_url() {
        let client = HistoryClient::new(&config(), "key".into()).unwrap();
        let url = client.transactions_url(address!("7a4eAA2393c06C79786cb5cff70Dc1174C763c37"));
        assert_eq!(
            url,
            "https://api.unmarshal.com/v3/bsc/address/0x7a4eaa2393c06c79786cb5cff70dc1174c763c37/transactions"
        );
    }

    #[test]
    fn test_page_parses_and_keeps_transactions_raw() {
        let raw = r#"{
            "page": 2,
            "total_pages": 7,
            "items_on_page": 1,
            "total_txs": 613,
            "transactions": [
                {"id": "0xabc", "status": "completed", "type": "receive", "fee": "21000"}
            ]
        }"#;
        let page: TransactionPage = serde_json::from_str(raw).unwrap();
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 7);
        assert_eq!(page.total_txs, 613);
        assert_eq!(page.transactions[0]["type"], "receive");
    }

    #[test]
    fn test_empty_page_defaults() {
        let page: TransactionPage = serde_json::from_str("{}").unwrap();
        assert_eq!(page.items_on_page, 0);
        assert!(page.transactions.is_empty());
    }
}
