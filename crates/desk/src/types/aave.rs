use alloy::primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::wad_ray::{base_currency_to_decimal, bps_to_percent, wad_to_decimal};

/// Raw result of `Pool.getUserAccountData()`, exactly as returned on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawAccountData {
    /// Base currency (USD, 8 decimals).
    pub total_collateral_base: U256,
    pub total_debt_base: U256,
    pub available_borrows_base: U256,
    /// Weighted liquidation threshold in basis points.
    pub current_liquidation_threshold: U256,
    /// Weighted LTV in basis points.
    pub ltv: U256,
    /// WAD; `type(uint256).max` when the account has no debt.
    pub health_factor: U256,
}

/// Decimal view of a user's Aave position, fetched fresh for every use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    #[serde(with = "rust_decimal::serde::str")]
    pub total_collateral_usd: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_debt_usd: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub available_borrow_usd: Decimal,
    /// Weighted liquidation threshold, percent.
    #[serde(with = "rust_decimal::serde::str")]
    pub liquidation_threshold_pct: Decimal,
    /// Weighted loan-to-value, percent.
    #[serde(with = "rust_decimal::serde::str")]
    pub ltv_pct: Decimal,
    /// Zero when the account carries no debt.
    #[serde(with = "rust_decimal::serde::str")]
    pub health_factor: Decimal,
}

impl From<RawAccountData> for AccountSnapshot {
    fn from(raw: RawAccountData) -> Self {
        Self {
            total_collateral_usd: base_currency_to_decimal(raw.total_collateral_base),
            total_debt_usd: base_currency_to_decimal(raw.total_debt_base),
            available_borrow_usd: base_currency_to_decimal(raw.available_borrows_base),
            liquidation_threshold_pct: bps_to_percent(raw.current_liquidation_threshold),
            ltv_pct: bps_to_percent(raw.ltv),
            health_factor: wad_to_decimal(raw.health_factor),
        }
    }
}

/// Reserve configuration subset read from the protocol data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReserveCollateralConfig {
    pub usage_as_collateral_enabled: bool,
    pub is_active: bool,
}
