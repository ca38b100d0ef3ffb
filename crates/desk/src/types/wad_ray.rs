//! Fixed-point conversions for on-chain values.
//!
//! Aave reports account aggregates as integers: base-currency amounts with
//! 8 decimals, ratios in basis points and the health factor as a WAD
//! (18 decimals). `type(uint256).max` is a sentinel (a debt-free account's
//! health factor) and always converts to zero.

use alloy::primitives::utils::format_units;
use alloy::primitives::U256;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::constants::{BASE_CURRENCY_DECIMALS, BPS, MAX_UINT256, WAD_DECIMALS};

/// Convert an integer with `decimals` implied decimal places to `Decimal`.
///
/// The `MAX_UINT256` sentinel maps to zero. Any other value too large for
/// `Decimal` saturates at `Decimal::MAX`.
pub fn scaled_to_decimal(raw: U256, decimals: u8) -> Decimal {
    if raw == MAX_UINT256 {
        return Decimal::ZERO;
    }
    u128::try_from(raw)
        .ok()
        .and_then(|v| i128::try_from(v).ok())
        .and_then(|v| Decimal::try_from_i128_with_scale(v, u32::from(decimals)).ok())
        .map(|d| d.normalize())
        .unwrap_or(Decimal::MAX)
}

/// Convert a raw WAD (18 decimals) value, such as a health factor, to `Decimal`.
pub fn wad_to_decimal(wad: U256) -> Decimal {
    scaled_to_decimal(wad, WAD_DECIMALS)
}

/// Convert Aave base-currency (8-decimal USD) U256 to `Decimal`.
pub fn base_currency_to_decimal(raw: U256) -> Decimal {
    scaled_to_decimal(raw, BASE_CURRENCY_DECIMALS)
}

/// Convert basis points to a percentage (`8000` → `80`).
pub fn bps_to_percent(bps: U256) -> Decimal {
    scaled_to_decimal(bps, 0) * dec!(100) / BPS
}

/// Round half away from zero to two places and render with exactly two
/// fractional digits.
pub fn format_two_decimals(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

/// Format a raw on-chain integer for display: sentinel-aware, two decimals.
pub fn format_scaled(raw: U256, decimals: u8) -> String {
    if raw == MAX_UINT256 {
        return "0".to_string();
    }
    format_two_decimals(scaled_to_decimal(raw, decimals))
}

/// Exact token amount in human units, without trailing zeros
/// (`100000000000000` at 18 decimals → `"0.0001"`).
pub fn format_token_amount(raw: U256, decimals: u8) -> String {
    match format_units(raw, decimals) {
        Ok(s) if s.contains('.') => s.trim_end_matches('0').trim_end_matches('.').to_string(),
        Ok(s) => s,
        Err(_) => raw.to_string(),
    }
}
