use alloy::primitives::{Address, B256, U256};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::errors::{ErrorKind, SupplyError};

use super::aave::AccountSnapshot;
use super::wad_ray::format_two_decimals;

/// Which asset a deposit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSelection {
    /// A concrete ERC-20 reserve.
    Token(Address),
    /// The chain's wrapped-native token, wrapped on demand.
    WrappedNative,
}

impl From<Option<Address>> for AssetSelection {
    fn from(asset: Option<Address>) -> Self {
        asset.map_or(AssetSelection::WrappedNative, AssetSelection::Token)
    }
}

/// A single collateral deposit, immutable once built.
///
/// Construction rejects amounts that are not a finite positive number, so a
/// request that exists always carries a numeric amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositRequest {
    asset: AssetSelection,
    amount: String,
    depositor: Address,
    pool: Address,
    data_provider: Option<Address>,
}

impl DepositRequest {
    pub fn new(
        asset: impl Into<AssetSelection>,
        amount: &str,
        depositor: Address,
        pool: Address,
        data_provider: Option<Address>,
    ) -> Result<Self, SupplyError> {
        Ok(Self {
            asset: asset.into(),
            amount: validate_amount(amount)?,
            depositor,
            pool,
            data_provider,
        })
    }

    pub fn asset(&self) -> AssetSelection {
        self.asset
    }

    /// Human-unit amount, trimmed.
    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn depositor(&self) -> Address {
        self.depositor
    }

    pub fn pool(&self) -> Address {
        self.pool
    }

    pub fn data_provider(&self) -> Option<Address> {
        self.data_provider
    }
}

/// Check that `amount` is a finite number greater than zero.
///
/// Returns the trimmed string. Scaling to the token's smallest unit happens
/// later, once its decimals are known.
pub fn validate_amount(amount: &str) -> Result<String, SupplyError> {
    let trimmed = amount.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(trimmed.to_string()),
        Ok(_) => Err(SupplyError::InvalidAmount(format!(
            "{trimmed:?} must be a finite number greater than zero"
        ))),
        Err(_) => Err(SupplyError::InvalidAmount(format!("{trimmed:?} is not a number"))),
    }
}

/// A deposit whose asset is concrete. Only the balance guard builds one, so
/// the allowance guard never sees an unresolved asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDeposit {
    pub asset: Address,
    pub amount: String,
    pub depositor: Address,
    pub pool: Address,
    /// Hash of the wrap transaction, if one was needed.
    pub wrap_tx: Option<B256>,
}

impl ResolvedDeposit {
    pub(crate) fn new(request: &DepositRequest, asset: Address, wrap_tx: Option<B256>) -> Self {
        Self {
            asset,
            amount: request.amount.clone(),
            depositor: request.depositor,
            pool: request.pool,
            wrap_tx,
        }
    }
}

/// Output of the allowance guard: the deposit amount in the asset's smallest
/// unit, with the pool cleared to pull it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovedAmount {
    pub scaled: U256,
    pub symbol: String,
    pub decimals: u8,
    pub approval_tx: Option<B256>,
}

/// Everything observed around a confirmed supply.
#[derive(Debug, Clone)]
pub struct SupplyReceipt {
    pub asset: Address,
    pub amount: String,
    pub supply_tx: B256,
    pub wrap_tx: Option<B256>,
    pub approval_tx: Option<B256>,
    pub before: AccountSnapshot,
    pub after: AccountSnapshot,
    pub collateral_delta: Decimal,
    pub health_factor_delta: Decimal,
}

impl SupplyReceipt {
    /// Advisory only: a confirmed supply is reported even when the pool
    /// shows no collateral increase.
    pub fn collateral_increased(&self) -> bool {
        self.collateral_delta > Decimal::ZERO
    }
}

/// Terminal artifact of the supply workflow, returned to the caller as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap_transaction_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_transaction_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_added: Option<String>,
    /// `$`-prefixed, two decimals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collateral_change: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_factor_after: Option<String>,
    /// Signed, two decimals. Zero when the account carries no debt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_factor_change: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl TransactionOutcome {
    pub fn succeeded(receipt: &SupplyReceipt) -> Self {
        Self {
            success: true,
            transaction_hash: Some(receipt.supply_tx.to_string()),
            wrap_transaction_hash: receipt.wrap_tx.map(|h| h.to_string()),
            approval_transaction_hash: receipt.approval_tx.map(|h| h.to_string()),
            amount_added: Some(receipt.amount.clone()),
            collateral_change: Some(format!("${}", format_two_decimals(receipt.collateral_delta))),
            health_factor_after: Some(format_two_decimals(receipt.after.health_factor)),
            health_factor_change: Some(format_two_decimals(receipt.health_factor_delta)),
            error: None,
            error_kind: None,
        }
    }

    pub fn failed(err: &SupplyError) -> Self {
        Self {
            success: false,
            transaction_hash: None,
            wrap_transaction_hash: None,
            approval_transaction_hash: None,
            amount_added: None,
            collateral_change: None,
            health_factor_after: None,
            health_factor_change: None,
            error: Some(err.to_string()),
            error_kind: Some(err.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const USER: Address = address!("C33D53d4ACa86A8e40c050E92D23E3842789641e");
    const POOL: Address = address!("6807dc923806fE8Fd134338EABCA509979a7e0cB");

    #[test]
    fn none_asset_selects_wrapped_native() {
        assert_eq!(AssetSelection::from(None), AssetSelection::WrappedNative);
        let token = address!("55d398326f99059fF775485246999027B3197955");
        assert_eq!(AssetSelection::from(Some(token)), AssetSelection::Token(token));
    }

    #[test]
    fn validate_amount_accepts_decimal_strings() {
        assert_eq!(validate_amount("0.0001").unwrap(), "0.0001");
        assert_eq!(validate_amount("  25 ").unwrap(), "25");
    }

    #[test]
    fn validate_amount_rejects_non_numeric() {
        for bad in ["abc", "", "   ", "1,5", "NaN", "inf", "0", "-3"] {
            let err = validate_amount(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidAmount, "input {bad:?}");
        }
    }

    #[test]
    fn request_construction_validates_amount() {
        let err = DepositRequest::new(None, "abc", USER, POOL, None).unwrap_err();
        assert!(matches!(err, SupplyError::InvalidAmount(_)));

        let req = DepositRequest::new(None, "1.5", USER, POOL, None).unwrap();
        assert_eq!(req.amount(), "1.5");
        assert_eq!(req.asset(), AssetSelection::WrappedNative);
        assert_eq!(req.depositor(), USER);
    }

    #[test]
    fn failed_outcome_serializes_uniform_shape() {
        let err = SupplyError::InvalidAmount("\"abc\" is not a number".into());
        let json = serde_json::to_value(TransactionOutcome::failed(&err)).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "invalid amount: \"abc\" is not a number");
        assert_eq!(json["errorKind"], "invalid-amount");
        assert!(json.get("transactionHash").is_none());
    }
}
