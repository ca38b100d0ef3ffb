//! ERC-20 and wrapped-native reads plus calldata for approve/wrap.

use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::Provider;
use std::future::IntoFuture;

use crate::errors::LedgerError;
use crate::types::TokenMetadata;

use super::aave_client::HttpProvider;
use super::contracts::{IWrappedNative, IERC20};

#[derive(Clone)]
pub struct TokenClient {
    provider: HttpProvider,
}

impl TokenClient {
    pub fn new(provider: HttpProvider) -> Self {
        Self { provider }
    }

    /// Symbol and decimals, read concurrently.
    pub async fn metadata(&self, token: Address) -> Result<TokenMetadata, LedgerError> {
        let erc20 = IERC20::new(token, self.provider.clone());
        let symbol_call = erc20.symbol();
        let decimals_call = erc20.decimals();
        let (symbol, decimals) = tokio::try_join!(
            symbol_call.call().into_future(),
            decimals_call.call().into_future()
        )?;
        Ok(TokenMetadata { symbol, decimals })
    }

    pub async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, LedgerError> {
        Ok(IERC20::new(token, self.provider.clone())
            .balanceOf(owner)
            .call()
            .await?)
    }

    pub async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, LedgerError> {
        Ok(IERC20::new(token, self.provider.clone())
            .allowance(owner, spender)
            .call()
            .await?)
    }

    pub async fn native_balance(&self, owner: Address) -> Result<U256, LedgerError> {
        Ok(self.provider.get_balance(owner).await?)
    }

    /// Encode calldata for `ERC20.approve()`.
    pub fn encode_approve(spender: Address, amount: U256) -> Bytes {
        let call = IERC20::approveCall { spender, amount };
        Bytes::from(alloy::sol_types::SolCall::abi_encode(&call))
    }

    /// Encode calldata for `WETH9.deposit()`; the wrapped amount travels as
    /// the transaction value.
    pub fn encode_wrap() -> Bytes {
        Bytes::from(alloy::sol_types::SolCall::abi_encode(&IWrappedNative::depositCall {}))
    }
}
