pub mod aave;
pub mod health;
pub mod supply;
pub mod token;
pub mod wad_ray;

pub use aave::{AccountSnapshot, RawAccountData, ReserveCollateralConfig};
pub use health::{AccountAnalysis, HealthLevel, HealthStatus, RiskLevel};
pub use supply::{
    ApprovedAmount, AssetSelection, DepositRequest, ResolvedDeposit, SupplyReceipt,
    TransactionOutcome,
};
pub use token::{PortfolioToken, TokenBalance, TokenMetadata};
