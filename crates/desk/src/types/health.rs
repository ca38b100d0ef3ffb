use serde::{Deserialize, Serialize};

/// Liquidation-safety level of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HealthLevel {
    /// HF == 0: nothing borrowed.
    NoDebt,
    /// HF > 1.5.
    Healthy,
    /// 1.0 < HF ≤ 1.5.
    Warning,
    /// HF ≤ 1.0: eligible for liquidation.
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
}

/// Classification attached to an account analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub level: HealthLevel,
    pub risk: RiskLevel,
    pub suggestion: String,
}

/// Read-only report on a user's lending position, all values pre-formatted
/// with two decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountAnalysis {
    pub user_address: String,
    /// USD.
    pub total_collateral: String,
    /// USD.
    pub total_debt: String,
    /// USD.
    pub available_borrows: String,
    /// Percent.
    pub liquidation_threshold: String,
    /// Percent.
    pub loan_to_value: String,
    pub health_factor: String,
    #[serde(flatten)]
    pub status: HealthStatus,
}
