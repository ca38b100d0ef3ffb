//! Read-only account analysis: scaled position figures plus a health
//! classification.

use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use tracing::info;

use crate::constants::{
    BASE_CURRENCY_DECIMALS, HEALTHY_HF_THRESHOLD, LIQUIDATION_HF_THRESHOLD, MAX_UINT256,
    WAD_DECIMALS,
};
use crate::errors::LedgerError;
use crate::execution::ledger::LedgerReader;
use crate::types::wad_ray::{bps_to_percent, format_scaled, format_two_decimals};
use crate::types::{
    AccountAnalysis, AccountSnapshot, HealthLevel, HealthStatus, RawAccountData, RiskLevel,
};

/// Classify a health factor. Zero means the account carries no debt.
pub fn classify_health_factor(hf: Decimal) -> HealthStatus {
    let (level, risk, suggestion) = if hf.is_zero() {
        (
            HealthLevel::NoDebt,
            RiskLevel::None,
            "no outstanding debt, safe to borrow",
        )
    } else if hf > HEALTHY_HF_THRESHOLD {
        (
            HealthLevel::Healthy,
            RiskLevel::Low,
            "position is healthy, continue normally",
        )
    } else if hf > LIQUIDATION_HF_THRESHOLD {
        (
            HealthLevel::Warning,
            RiskLevel::Medium,
            "add collateral or reduce debt",
        )
    } else {
        (
            HealthLevel::Danger,
            RiskLevel::High,
            "add collateral or repay debt immediately, the position can be liquidated",
        )
    };

    HealthStatus {
        level,
        risk,
        suggestion: suggestion.to_string(),
    }
}

/// Format a basis-point ratio as a percentage; the sentinel renders as `"0"`.
fn format_bps(raw: U256) -> String {
    if raw == MAX_UINT256 {
        return "0".to_string();
    }
    format_two_decimals(bps_to_percent(raw))
}

/// Build the report from raw pool data.
pub fn analyze_raw(user: Address, raw: RawAccountData) -> AccountAnalysis {
    let snapshot = AccountSnapshot::from(raw);

    AccountAnalysis {
        user_address: user.to_string(),
        total_collateral: format_scaled(raw.total_collateral_base, BASE_CURRENCY_DECIMALS),
        total_debt: format_scaled(raw.total_debt_base, BASE_CURRENCY_DECIMALS),
        available_borrows: format_scaled(raw.available_borrows_base, BASE_CURRENCY_DECIMALS),
        liquidation_threshold: format_bps(raw.current_liquidation_threshold),
        loan_to_value: format_bps(raw.ltv),
        health_factor: format_scaled(raw.health_factor, WAD_DECIMALS),
        status: classify_health_factor(snapshot.health_factor),
    }
}

pub async fn analyze_account<R: LedgerReader + ?Sized>(
    reader: &R,
    pool: Address,
    user: Address,
) -> Result<AccountAnalysis, LedgerError> {
    let raw = reader.account_data(pool, user).await?;
    let analysis = analyze_raw(user, raw);
    info!(
        user = %user,
        collateral = %analysis.total_collateral,
        debt = %analysis.total_debt,
        health_factor = %analysis.health_factor,
        level = ?analysis.status.level,
        "account analysed"
    );
    Ok(analysis)
}
