//! Wallet balance listing over RPC for a configured token list.

use alloy::primitives::{Address, U256};
use futures::future::join_all;
use tracing::{debug, warn};

use crate::config::TokenConfig;
use crate::constants::NATIVE_DECIMALS;
use crate::errors::LedgerError;
use crate::execution::ledger::LedgerReader;
use crate::types::wad_ray::format_token_amount;
use crate::types::TokenBalance;

fn balance_line(symbol: &str, address: String, raw: U256, decimals: u8) -> TokenBalance {
    TokenBalance {
        symbol: symbol.to_string(),
        address,
        balance: format_token_amount(raw, decimals),
        raw_balance: raw.to_string(),
        decimals,
    }
}

/// Native balance first (always listed), then every configured token the
/// wallet holds, in configuration order.
///
/// Only the native read is fatal. A failing token read is logged and the
/// token left out.
pub async fn collect_token_balances<R: LedgerReader + ?Sized>(
    reader: &R,
    wallet: Address,
    native_symbol: &str,
    tokens: &[TokenConfig],
) -> Result<Vec<TokenBalance>, LedgerError> {
    let native = reader.native_balance(wallet).await?;
    let mut lines = vec![balance_line(
        native_symbol,
        "native".to_string(),
        native,
        NATIVE_DECIMALS,
    )];

    let reads = tokens.iter().map(|token| async move {
        let address: Address = match token.address.parse() {
            Ok(a) => a,
            Err(e) => {
                warn!(symbol = %token.symbol, error = %e, "skipping token with bad address");
                return None;
            }
        };
        match reader.balance_of(address, wallet).await {
            Ok(raw) => Some((token, address, raw)),
            Err(e) => {
                warn!(symbol = %token.symbol, error = %e, "token balance read failed");
                None
            }
        }
    });

    for (token, address, raw) in join_all(reads).await.into_iter().flatten() {
        if raw.is_zero() {
            continue;
        }
        debug!(symbol = %token.symbol, raw = %raw, "token held");
        lines.push(balance_line(
            &token.symbol,
            address.to_string(),
            raw,
            token.decimals,
        ));
    }

    Ok(lines)
}
