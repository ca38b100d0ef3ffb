//! Aave V3 client: typed read + calldata encoding layer.
//!
//! Reads pool account aggregates and reserve configuration via async calls,
//! and encodes calldata for the writes the desk performs (supply, collateral
//! toggle). Submission is handled by [`TxSubmitter`](super::tx_submitter::TxSubmitter).

use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::RootProvider;
use tracing::debug;

use crate::errors::LedgerError;
use crate::types::{RawAccountData, ReserveCollateralConfig};

use super::contracts::{IPool, IPoolDataProvider};

/// Concrete provider type: Alloy HTTP provider over Ethereum network.
pub type HttpProvider = RootProvider;

/// Async read + sync encode wrapper for Aave V3 contracts.
///
/// Pool and data-provider addresses are passed per call so one client can
/// serve any deployment the caller targets.
#[derive(Clone)]
pub struct AaveClient {
    provider: HttpProvider,
}

impl AaveClient {
    pub fn new(provider: HttpProvider) -> Self {
        Self { provider }
    }

    // -----------------------------------------------------------------------
    // Read operations (async, RPC calls)
    // -----------------------------------------------------------------------

    /// Query an Aave V3 Pool for a user's aggregate position data, unscaled.
    pub async fn get_user_account_data(
        &self,
        pool: Address,
        user: Address,
    ) -> Result<RawAccountData, LedgerError> {
        let result = IPool::new(pool, self.provider.clone())
            .getUserAccountData(user)
            .call()
            .await?;

        let raw = RawAccountData {
            total_collateral_base: result.totalCollateralBase,
            total_debt_base: result.totalDebtBase,
            available_borrows_base: result.availableBorrowsBase,
            current_liquidation_threshold: result.currentLiquidationThreshold,
            ltv: result.ltv,
            health_factor: result.healthFactor,
        };

        debug!(
            user = %user,
            collateral_base = %raw.total_collateral_base,
            debt_base = %raw.total_debt_base,
            "user account data"
        );

        Ok(raw)
    }

    /// Read the collateral-relevant flags of a reserve.
    ///
    /// Returns `None` for an address that is not a listed reserve (all-zero
    /// configuration).
    pub async fn get_reserve_collateral_config(
        &self,
        data_provider: Address,
        asset: Address,
    ) -> Result<Option<ReserveCollateralConfig>, LedgerError> {
        let cfg = IPoolDataProvider::new(data_provider, self.provider.clone())
            .getReserveConfigurationData(asset)
            .call()
            .await?;

        if cfg.decimals.is_zero() && !cfg.isActive {
            debug!(asset = %asset, "asset is not a listed reserve");
            return Ok(None);
        }

        Ok(Some(ReserveCollateralConfig {
            usage_as_collateral_enabled: cfg.usageAsCollateralEnabled,
            is_active: cfg.isActive,
        }))
    }

    // -----------------------------------------------------------------------
    // Encode operations (sync, local ABI encoding)
    // -----------------------------------------------------------------------

    /// Encode calldata for `Pool.supply()`.
    pub fn encode_supply(
        asset: Address,
        amount: U256,
        on_behalf_of: Address,
        referral_code: u16,
    ) -> Bytes {
        let call = IPool::supplyCall {
            asset,
            amount,
            onBehalfOf: on_behalf_of,
            referralCode: referral_code,
        };
        Bytes::from(alloy::sol_types::SolCall::abi_encode(&call))
    }

    /// Encode calldata for `Pool.setUserUseReserveAsCollateral()`.
    pub fn encode_set_use_as_collateral(asset: Address, use_as_collateral: bool) -> Bytes {
        let call = IPool::setUserUseReserveAsCollateralCall {
            asset,
            useAsCollateral: use_as_collateral,
        };
        Bytes::from(alloy::sol_types::SolCall::abi_encode(&call))
    }
}
