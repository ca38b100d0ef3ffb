//! Transaction submitter: simulation, local signing, confirmation wait.
//!
//! Every write the desk performs goes through [`TxSubmitter::submit_and_wait`]:
//! `eth_call` simulation (revert reason decoded), local legacy-transaction
//! signing with a locally tracked nonce, raw submission, then receipt polling
//! bounded by the configured confirmation timeout.

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxKind, B256, U256};
use alloy::providers::Provider;
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::TransactionConfig;
use crate::errors::LedgerError;

use super::aave_client::HttpProvider;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// `Error(string)` selector: `keccak256("Error(string)")[0..4]`.
const ERROR_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// `Panic(uint256)` selector: `keccak256("Panic(uint256)")[0..4]`.
const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

// ---------------------------------------------------------------------------
// TxSubmitter
// ---------------------------------------------------------------------------

/// Signs and submits transactions for a single signing identity.
///
/// The nonce counter is shared by every workflow using this submitter, so
/// concurrent invocations for the same key never collide on a nonce.
pub struct TxSubmitter {
    provider: HttpProvider,
    signer: PrivateKeySigner,
    /// Async-safe nonce counter. `None` until first chain query.
    nonce: Mutex<Option<u64>>,
    simulation_timeout: Duration,
    confirmation_timeout: Duration,
    poll_interval: Duration,
    gas_price_buffer: f64,
    chain_id: u64,
}

impl TxSubmitter {
    pub fn new(
        provider: HttpProvider,
        signer: PrivateKeySigner,
        config: &TransactionConfig,
        chain_id: u64,
    ) -> Self {
        info!(
            address = %signer.address(),
            chain_id,
            simulation_timeout = config.simulation_timeout_seconds,
            confirmation_timeout = config.confirmation_timeout_seconds,
            "TxSubmitter initialized"
        );

        Self {
            provider,
            signer,
            nonce: Mutex::new(None),
            simulation_timeout: Duration::from_secs(config.simulation_timeout_seconds),
            confirmation_timeout: Duration::from_secs(config.confirmation_timeout_seconds),
            poll_interval: Duration::from_millis(config.receipt_poll_interval_ms),
            gas_price_buffer: config.gas_price_buffer,
            chain_id,
        }
    }

    /// Returns the address associated with the signer.
    pub fn signer_address(&self) -> Address {
        self.signer.address()
    }

    // -----------------------------------------------------------------------
    // Public API
    // -----------------------------------------------------------------------

    /// Full submission flow: simulate → submit → wait.
    ///
    /// `from` is always set to the signer. Returns the confirmed receipt.
    pub async fn submit_and_wait(
        &self,
        mut tx: TransactionRequest,
    ) -> Result<TransactionReceipt, LedgerError> {
        tx.set_from(self.signer.address());

        self.simulate(&tx).await?;
        let tx_hash = self.submit(tx).await?;
        self.wait_for_receipt(tx_hash).await
    }

    /// Simulate a transaction via `eth_call` with timeout protection.
    pub async fn simulate(&self, tx: &TransactionRequest) -> Result<Bytes, LedgerError> {
        let provider = &self.provider;
        let tx_clone = tx.clone();
        match tokio::time::timeout(self.simulation_timeout, async move {
            provider.call(tx_clone).await
        })
        .await
        {
            Ok(Ok(result)) => {
                debug!(output_len = result.len(), "simulation succeeded");
                Ok(result)
            }
            Ok(Err(e)) => {
                let reason = e
                    .as_error_resp()
                    .and_then(|payload| payload.as_revert_data())
                    .map(|data| Self::decode_revert_reason(&data))
                    .unwrap_or_else(|| e.to_string());
                Err(LedgerError::SimulationFailed {
                    reason: format!("simulation reverted: {reason}"),
                })
            }
            Err(_) => Err(LedgerError::SimulationFailed {
                reason: format!(
                    "simulation timed out after {}s",
                    self.simulation_timeout.as_secs()
                ),
            }),
        }
    }

    /// Sign and submit a transaction. Assigns nonce and gas price
    /// automatically; estimates gas when the caller set no limit.
    pub async fn submit(&self, tx: TransactionRequest) -> Result<B256, LedgerError> {
        let gas_price = self.get_gas_price().await?;

        let gas_limit: u64 = match tx.gas {
            Some(gas) => gas,
            None => self
                .provider
                .estimate_gas(tx.clone())
                .await
                .map_err(|e| LedgerError::SimulationFailed {
                    reason: format!("gas estimation failed: {e}"),
                })?,
        };

        let to = tx.to.unwrap_or(TxKind::Create);
        let value = tx.value.unwrap_or_default();
        let input = tx.input.into_input().unwrap_or_default();

        let nonce = self.get_next_nonce().await?;
        let tx_hash = match self
            .sign_and_send(nonce, gas_price, gas_limit, to, value, input)
            .await
        {
            Ok(hash) => hash,
            Err(e) => {
                // The reserved nonce was never used on-chain.
                if let Err(re) = self.recover_nonce().await {
                    warn!(error = %re, "nonce recovery failed");
                }
                return Err(e);
            }
        };

        info!(
            tx_hash = %tx_hash,
            nonce,
            gas_price,
            gas_limit,
            "transaction submitted"
        );

        Ok(tx_hash)
    }

    /// Poll for a transaction receipt until confirmed or timeout.
    ///
    /// Returns `LedgerError::TxReverted` if the receipt has `status == 0`,
    /// `LedgerError::TxTimeout` if confirmation takes too long.
    pub async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt, LedgerError> {
        let start = tokio::time::Instant::now();

        loop {
            match self.provider.get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => {
                    if !receipt.status() {
                        return Err(LedgerError::TxReverted {
                            tx_hash: tx_hash.to_string(),
                            reason: "transaction reverted on-chain".into(),
                        });
                    }
                    info!(
                        tx_hash = %tx_hash,
                        gas_used = receipt.gas_used,
                        "transaction confirmed"
                    );
                    return Ok(receipt);
                }
                Ok(None) => {
                    // Not yet mined
                }
                Err(e) => {
                    warn!(error = %e, tx_hash = %tx_hash, "receipt poll error, retrying");
                }
            }

            if start.elapsed() >= self.confirmation_timeout {
                return Err(LedgerError::TxTimeout {
                    tx_hash: tx_hash.to_string(),
                    timeout_seconds: self.confirmation_timeout.as_secs(),
                });
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Current gas price in Wei with the configured buffer applied.
    pub async fn get_gas_price(&self) -> Result<u128, LedgerError> {
        let base_price = self.provider.get_gas_price().await?;
        Ok(apply_gas_buffer(base_price, self.gas_price_buffer))
    }

    /// Re-sync local nonce counter from on-chain pending state.
    pub async fn recover_nonce(&self) -> Result<(), LedgerError> {
        let mut guard = self.nonce.lock().await;
        let chain_nonce = self
            .provider
            .get_transaction_count(self.signer.address())
            .await?;
        let old = *guard;
        *guard = Some(chain_nonce);
        warn!(old_nonce = ?old, chain_nonce, "nonce recovered from chain");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Revert decoding
    // -----------------------------------------------------------------------

    /// Decode a Solidity revert reason from raw return data.
    ///
    /// Handles `Error(string)`, `Panic(uint256)`, and falls back to hex for
    /// unknown selectors (custom errors).
    pub fn decode_revert_reason(data: &[u8]) -> String {
        if data.is_empty() {
            return "Unknown revert".into();
        }

        if data.len() < 4 {
            return hex::encode(data);
        }

        // Error(string): selector(4) + offset(32) + length(32) + data
        if data[..4] == ERROR_SELECTOR && data.len() >= 68 {
            if let Ok(len_bytes) = <[u8; 8]>::try_from(&data[60..68]) {
                let end = usize::try_from(u64::from_be_bytes(len_bytes))
                    .ok()
                    .and_then(|len| 68usize.checked_add(len))
                    .filter(|end| *end <= data.len());
                if let Some(end) = end {
                    return String::from_utf8_lossy(&data[68..end]).into_owned();
                }
            }
        }

        // Panic(uint256): selector(4) + code(32)
        if data[..4] == PANIC_SELECTOR && data.len() >= 36 {
            let code = U256::from_be_slice(&data[4..36]);
            return match u64::try_from(code).unwrap_or(u64::MAX) {
                0x01 => "Panic: assertion failed".into(),
                0x11 => "Panic: arithmetic overflow/underflow".into(),
                0x12 => "Panic: division by zero".into(),
                0x32 => "Panic: array index out of bounds".into(),
                _ => format!("Panic(0x{code:x})"),
            };
        }

        hex::encode(data)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Get the next nonce, initialising from chain on the first call.
    async fn get_next_nonce(&self) -> Result<u64, LedgerError> {
        let mut guard = self.nonce.lock().await;
        let nonce = match *guard {
            Some(n) => n,
            None => {
                let n = self
                    .provider
                    .get_transaction_count(self.signer.address())
                    .await?;
                info!(nonce = n, "nonce initialized from chain");
                n
            }
        };
        *guard = Some(nonce + 1);
        Ok(nonce)
    }

    /// Build a legacy transaction, sign it locally, and submit raw bytes.
    async fn sign_and_send(
        &self,
        nonce: u64,
        gas_price: u128,
        gas_limit: u64,
        to: TxKind,
        value: U256,
        input: Bytes,
    ) -> Result<B256, LedgerError> {
        let tx = TxLegacy {
            chain_id: Some(self.chain_id),
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            input,
        };

        let sig_hash = tx.signature_hash();
        let sig = self
            .signer
            .sign_hash_sync(&sig_hash)
            .map_err(|e| LedgerError::Signing {
                reason: e.to_string(),
            })?;

        let signed = tx.into_signed(sig);
        let envelope = TxEnvelope::Legacy(signed);
        let raw = envelope.encoded_2718();

        let pending = self.provider.send_raw_transaction(&raw).await?;

        Ok(*pending.tx_hash())
    }
}

/// Scale a node-reported gas price by `buffer`, never returning less than 1 Wei.
fn apply_gas_buffer(base_price: u128, buffer: f64) -> u128 {
    ((base_price as f64 * buffer) as u128).max(1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
