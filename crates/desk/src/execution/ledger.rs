//! The ledger capabilities consumed by the desk's workflows.
//!
//! [`LedgerReader`] covers the read-only queries. A [`Ledger`] adds the
//! writes and is bound to one signing identity: writes are always signed by
//! [`Ledger::depositor`] and return only once the transaction is confirmed.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, B256, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use tracing::debug;

use crate::config::TransactionConfig;
use crate::constants::REFERRAL_CODE;
use crate::errors::LedgerError;
use crate::types::{RawAccountData, ReserveCollateralConfig, TokenMetadata};

use super::aave_client::{AaveClient, HttpProvider};
use super::token_client::TokenClient;
use super::tx_submitter::TxSubmitter;

#[async_trait]
pub trait LedgerReader: Send + Sync {
    async fn token_metadata(&self, token: Address) -> Result<TokenMetadata, LedgerError>;

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, LedgerError>;

    async fn native_balance(&self, owner: Address) -> Result<U256, LedgerError>;

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, LedgerError>;

    async fn account_data(&self, pool: Address, user: Address)
        -> Result<RawAccountData, LedgerError>;

    /// `None` when `asset` is not a listed reserve.
    async fn reserve_collateral_config(
        &self,
        data_provider: Address,
        asset: Address,
    ) -> Result<Option<ReserveCollateralConfig>, LedgerError>;
}

#[async_trait]
pub trait Ledger: LedgerReader {
    /// Public address of the signing identity.
    fn depositor(&self) -> Address;

    /// Deposit `amount` of native currency into the wrapped-native contract.
    async fn wrap_native(&self, wrapped: Address, amount: U256) -> Result<B256, LedgerError>;

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<B256, LedgerError>;

    /// `Pool.supply` with the depositor as beneficiary and referral code 0.
    async fn supply(&self, pool: Address, asset: Address, amount: U256)
        -> Result<B256, LedgerError>;

    async fn set_use_as_collateral(
        &self,
        pool: Address,
        asset: Address,
        enabled: bool,
    ) -> Result<B256, LedgerError>;
}

// ---------------------------------------------------------------------------
// ChainReader
// ---------------------------------------------------------------------------

/// Live [`LedgerReader`] over an RPC node. Needs no credentials.
#[derive(Clone)]
pub struct ChainReader {
    aave: AaveClient,
    tokens: TokenClient,
}

impl ChainReader {
    pub fn new(provider: HttpProvider) -> Self {
        Self {
            aave: AaveClient::new(provider.clone()),
            tokens: TokenClient::new(provider),
        }
    }
}

#[async_trait]
impl LedgerReader for ChainReader {
    async fn token_metadata(&self, token: Address) -> Result<TokenMetadata, LedgerError> {
        self.tokens.metadata(token).await
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, LedgerError> {
        self.tokens.balance_of(token, owner).await
    }

    async fn native_balance(&self, owner: Address) -> Result<U256, LedgerError> {
        self.tokens.native_balance(owner).await
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, LedgerError> {
        self.tokens.allowance(token, owner, spender).await
    }

    async fn account_data(
        &self,
        pool: Address,
        user: Address,
    ) -> Result<RawAccountData, LedgerError> {
        self.aave.get_user_account_data(pool, user).await
    }

    async fn reserve_collateral_config(
        &self,
        data_provider: Address,
        asset: Address,
    ) -> Result<Option<ReserveCollateralConfig>, LedgerError> {
        self.aave
            .get_reserve_collateral_config(data_provider, asset)
            .await
    }
}

// ---------------------------------------------------------------------------
// ChainLedger
// ---------------------------------------------------------------------------

/// Live [`Ledger`] over an RPC node and a local private key.
pub struct ChainLedger {
    reader: ChainReader,
    submitter: TxSubmitter,
    wrap_gas_limit: u64,
    supply_gas_limit: u64,
}

impl ChainLedger {
    pub fn new(reader: ChainReader, submitter: TxSubmitter, config: &TransactionConfig) -> Self {
        Self {
            reader,
            submitter,
            wrap_gas_limit: config.wrap_gas_limit,
            supply_gas_limit: config.supply_gas_limit,
        }
    }

    async fn send(&self, tx: TransactionRequest) -> Result<B256, LedgerError> {
        let receipt = self.submitter.submit_and_wait(tx).await?;
        Ok(receipt.transaction_hash)
    }
}

#[async_trait]
impl LedgerReader for ChainLedger {
    async fn token_metadata(&self, token: Address) -> Result<TokenMetadata, LedgerError> {
        self.reader.token_metadata(token).await
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, LedgerError> {
        self.reader.balance_of(token, owner).await
    }

    async fn native_balance(&self, owner: Address) -> Result<U256, LedgerError> {
        self.reader.native_balance(owner).await
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, LedgerError> {
        self.reader.allowance(token, owner, spender).await
    }

    async fn account_data(
        &self,
        pool: Address,
        user: Address,
    ) -> Result<RawAccountData, LedgerError> {
        self.reader.account_data(pool, user).await
    }

    async fn reserve_collateral_config(
        &self,
        data_provider: Address,
        asset: Address,
    ) -> Result<Option<ReserveCollateralConfig>, LedgerError> {
        self.reader
            .reserve_collateral_config(data_provider, asset)
            .await
    }
}

#[async_trait]
impl Ledger for ChainLedger {
    fn depositor(&self) -> Address {
        self.submitter.signer_address()
    }

    async fn wrap_native(&self, wrapped: Address, amount: U256) -> Result<B256, LedgerError> {
        debug!(wrapped = %wrapped, amount = %amount, "wrapping native currency");
        let mut tx = TransactionRequest::default();
        tx.set_to(wrapped);
        tx.set_value(amount);
        tx.set_input(TokenClient::encode_wrap());
        tx.set_gas_limit(self.wrap_gas_limit);
        self.send(tx).await
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<B256, LedgerError> {
        let mut tx = TransactionRequest::default();
        tx.set_to(token);
        tx.set_input(TokenClient::encode_approve(spender, amount));
        self.send(tx).await
    }

    async fn supply(
        &self,
        pool: Address,
        asset: Address,
        amount: U256,
    ) -> Result<B256, LedgerError> {
        let mut tx = TransactionRequest::default();
        tx.set_to(pool);
        tx.set_input(AaveClient::encode_supply(
            asset,
            amount,
            self.depositor(),
            REFERRAL_CODE,
        ));
        tx.set_gas_limit(self.supply_gas_limit);
        self.send(tx).await
    }

    async fn set_use_as_collateral(
        &self,
        pool: Address,
        asset: Address,
        enabled: bool,
    ) -> Result<B256, LedgerError> {
        let mut tx = TransactionRequest::default();
        tx.set_to(pool);
        tx.set_input(AaveClient::encode_set_use_as_collateral(asset, enabled));
        self.send(tx).await
    }
}
