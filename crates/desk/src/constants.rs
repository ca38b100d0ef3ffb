use alloy::primitives::{address, Address, U256};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Numeric Constants
// ---------------------------------------------------------------------------

/// Basis points per whole.
pub const BPS: Decimal = dec!(10_000);

/// Decimal places of the Aave base currency (USD).
pub const BASE_CURRENCY_DECIMALS: u8 = 8;

/// Decimal places of WAD-scaled values (health factor).
pub const WAD_DECIMALS: u8 = 18;

/// Decimal places of the chain's native currency.
pub const NATIVE_DECIMALS: u8 = 18;

/// `type(uint256).max`. Aave reports it for the health factor of a
/// debt-free account; also the value of an unlimited ERC-20 approval.
pub const MAX_UINT256: U256 = U256::MAX;

// ---------------------------------------------------------------------------
// Aave V3
// ---------------------------------------------------------------------------

/// Referral code passed to `Pool.supply()`.
pub const REFERRAL_CODE: u16 = 0;

// ---------------------------------------------------------------------------
// Health factor classification thresholds
// ---------------------------------------------------------------------------

pub const HEALTHY_HF_THRESHOLD: Decimal = dec!(1.5);
pub const LIQUIDATION_HF_THRESHOLD: Decimal = dec!(1.0);

// ---------------------------------------------------------------------------
// BSC
// ---------------------------------------------------------------------------

/// Wrapped BNB, the wrapped-native token on BSC mainnet.
pub const TOKEN_WBNB: Address = address!("bb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c");
