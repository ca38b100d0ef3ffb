//! Enable a supplied reserve as collateral.
//!
//! Invoked on its own, never as part of the supply workflow: Aave flags a
//! first deposit as collateral automatically, so this is only needed after
//! the user has switched it off.

use alloy::primitives::{Address, B256};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::{SupplyError, TxStep};
use crate::execution::ledger::Ledger;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum CollateralToggle {
    Enabled { transaction_hash: B256 },
    /// The reserve exists but the protocol does not accept it as collateral.
    NotCollateralEligible,
    /// The asset is not listed on this pool.
    UnknownReserve,
}

pub async fn enable_as_collateral<L: Ledger + ?Sized>(
    ledger: &L,
    pool: Address,
    data_provider: Address,
    asset: Address,
) -> Result<CollateralToggle, SupplyError> {
    let Some(reserve) = ledger
        .reserve_collateral_config(data_provider, asset)
        .await?
    else {
        warn!(asset = %asset, "asset is not a listed reserve");
        return Ok(CollateralToggle::UnknownReserve);
    };

    if !reserve.usage_as_collateral_enabled || !reserve.is_active {
        warn!(
            asset = %asset,
            active = reserve.is_active,
            collateral_enabled = reserve.usage_as_collateral_enabled,
            "reserve cannot be used as collateral"
        );
        return Ok(CollateralToggle::NotCollateralEligible);
    }

    let tx = ledger
        .set_use_as_collateral(pool, asset, true)
        .await
        .map_err(|e| SupplyError::from_write(TxStep::EnableCollateral, e))?;
    info!(asset = %asset, tx_hash = %tx, "reserve enabled as collateral");

    Ok(CollateralToggle::Enabled {
        transaction_hash: tx,
    })
}
