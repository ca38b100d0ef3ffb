use serde::{Deserialize, Serialize};

/// ERC-20 metadata needed to scale human amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub symbol: String,
    pub decimals: u8,
}

/// One line of a wallet's on-chain balance listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub symbol: String,
    /// Contract address, or `"native"` for the chain currency.
    pub address: String,
    /// Human units.
    pub balance: String,
    /// Smallest units.
    pub raw_balance: String,
    pub decimals: u8,
}

/// A token held by a wallet, enriched with indexer metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioToken {
    pub name: String,
    pub logo: String,
    pub symbol: String,
    pub address: String,
    pub balance: String,
    pub decimals: u8,
}
