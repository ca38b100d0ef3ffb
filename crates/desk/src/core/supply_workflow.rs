//! Collateral supply workflow.
//!
//! An ordered pipeline of three steps, each returning a typed result:
//!
//! 1. Balance guard: resolve the asset and, for wrapped-native deposits,
//!    wrap the native shortfall.
//! 2. Allowance guard: scale the amount to the asset's smallest unit, check
//!    the balance, and approve the pool for `type(uint256).max` when the
//!    current allowance is short.
//! 3. Supply executor: snapshot the account, supply, snapshot again and
//!    report the deltas.
//!
//! A step only runs once the previous one succeeded, so a request that fails
//! validation never reaches a state-changing call. Nothing is retried:
//! every guard re-reads chain state, so re-invoking the whole workflow is
//! safe.

use alloy::primitives::utils::parse_units;
use alloy::primitives::{Address, U256};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::constants::MAX_UINT256;
use crate::errors::{SupplyError, TxStep};
use crate::execution::ledger::Ledger;
use crate::types::wad_ray::format_token_amount;
use crate::types::{
    AccountSnapshot, ApprovedAmount, AssetSelection, DepositRequest, ResolvedDeposit,
    SupplyReceipt, TransactionOutcome,
};

pub struct SupplyWorkflow {
    ledger: Arc<dyn Ledger>,
    wrapped_native: Address,
}

impl SupplyWorkflow {
    pub fn new(ledger: Arc<dyn Ledger>, wrapped_native: Address) -> Self {
        Self {
            ledger,
            wrapped_native,
        }
    }

    /// Supply `amount` of `asset` (the wrapped-native token when `None`) to
    /// `pool` on behalf of the ledger's signing identity.
    ///
    /// Never fails: any error from any step is folded into the returned
    /// outcome.
    pub async fn supply_collateral(
        &self,
        asset: Option<Address>,
        amount: &str,
        pool: Address,
        data_provider: Option<Address>,
    ) -> TransactionOutcome {
        let result: Result<SupplyReceipt, SupplyError> = async {
            let request =
                DepositRequest::new(asset, amount, self.ledger.depositor(), pool, data_provider)?;
            self.execute(&request).await
        }
        .await;

        match result {
            Ok(receipt) => {
                info!(
                    tx_hash = %receipt.supply_tx,
                    asset = %receipt.asset,
                    amount = %receipt.amount,
                    collateral_delta = %receipt.collateral_delta,
                    health_factor = %receipt.after.health_factor,
                    health_factor_delta = %receipt.health_factor_delta,
                    "collateral supplied"
                );
                TransactionOutcome::succeeded(&receipt)
            }
            Err(e) => {
                error!(kind = ?e.kind(), error = %e, "collateral supply failed");
                TransactionOutcome::failed(&e)
            }
        }
    }

    /// Run the three steps in order. `request.depositor()` must be the
    /// ledger's signing identity.
    pub async fn execute(&self, request: &DepositRequest) -> Result<SupplyReceipt, SupplyError> {
        debug!(
            depositor = %request.depositor(),
            amount = %request.amount(),
            pool = %request.pool(),
            data_provider = ?request.data_provider(),
            "deposit requested"
        );
        let deposit = self.ensure_balance(request).await?;
        let approved = self.ensure_allowance(&deposit).await?;
        self.execute_supply(&deposit, &approved).await
    }

    // -----------------------------------------------------------------------
    // Step 1: balance guard
    // -----------------------------------------------------------------------

    /// Resolve the deposit's asset. A concrete asset passes through
    /// untouched; its balance is checked by the allowance guard.
    pub async fn ensure_balance(
        &self,
        request: &DepositRequest,
    ) -> Result<ResolvedDeposit, SupplyError> {
        let asset = match request.asset() {
            AssetSelection::Token(asset) => return Ok(ResolvedDeposit::new(request, asset, None)),
            AssetSelection::WrappedNative => self.wrapped_native,
        };
        let depositor = request.depositor();

        let meta = self.ledger.token_metadata(asset).await?;
        let required = scale_amount(request.amount(), meta.decimals, &meta.symbol)?;
        let held = self.ledger.balance_of(asset, depositor).await?;

        if held >= required {
            debug!(
                symbol = %meta.symbol,
                held = %format_token_amount(held, meta.decimals),
                "wrapped balance covers deposit"
            );
            return Ok(ResolvedDeposit::new(request, asset, None));
        }

        let shortfall = required - held;
        let native = self.ledger.native_balance(depositor).await?;
        if native < shortfall {
            return Err(SupplyError::InsufficientBalance {
                symbol: meta.symbol,
                required: request.amount().to_string(),
                available: format_token_amount(held.saturating_add(native), meta.decimals),
            });
        }

        info!(
            symbol = %meta.symbol,
            shortfall = %format_token_amount(shortfall, meta.decimals),
            "wrapping native shortfall"
        );
        let tx = self
            .ledger
            .wrap_native(asset, shortfall)
            .await
            .map_err(|e| SupplyError::from_write(TxStep::Wrap, e))?;
        info!(tx_hash = %tx, "wrap confirmed");

        Ok(ResolvedDeposit::new(request, asset, Some(tx)))
    }

    // -----------------------------------------------------------------------
    // Step 2: allowance guard
    // -----------------------------------------------------------------------

    pub async fn ensure_allowance(
        &self,
        deposit: &ResolvedDeposit,
    ) -> Result<ApprovedAmount, SupplyError> {
        let meta = self.ledger.token_metadata(deposit.asset).await?;
        let scaled = scale_amount(&deposit.amount, meta.decimals, &meta.symbol)?;
        debug!(
            symbol = %meta.symbol,
            decimals = meta.decimals,
            scaled = %scaled,
            "amount scaled"
        );

        let balance = self
            .ledger
            .balance_of(deposit.asset, deposit.depositor)
            .await?;
        if balance < scaled {
            return Err(SupplyError::InsufficientBalance {
                symbol: meta.symbol,
                required: deposit.amount.clone(),
                available: format_token_amount(balance, meta.decimals),
            });
        }

        let allowance = self
            .ledger
            .allowance(deposit.asset, deposit.depositor, deposit.pool)
            .await?;
        let approval_tx = if allowance < scaled {
            info!(
                symbol = %meta.symbol,
                allowance = %allowance,
                "allowance short, approving pool"
            );
            let tx = self
                .ledger
                .approve(deposit.asset, deposit.pool, MAX_UINT256)
                .await
                .map_err(|e| SupplyError::from_write(TxStep::Approve, e))?;
            info!(tx_hash = %tx, "approval confirmed");
            Some(tx)
        } else {
            debug!(symbol = %meta.symbol, "allowance sufficient");
            None
        };

        Ok(ApprovedAmount {
            scaled,
            symbol: meta.symbol,
            decimals: meta.decimals,
            approval_tx,
        })
    }

    // -----------------------------------------------------------------------
    // Step 3: supply executor
    // -----------------------------------------------------------------------

    pub async fn execute_supply(
        &self,
        deposit: &ResolvedDeposit,
        approved: &ApprovedAmount,
    ) -> Result<SupplyReceipt, SupplyError> {
        let before = self.snapshot(deposit).await?;
        debug!(
            collateral = %before.total_collateral_usd,
            health_factor = %before.health_factor,
            "account before supply"
        );

        let supply_tx = self
            .ledger
            .supply(deposit.pool, deposit.asset, approved.scaled)
            .await
            .map_err(|e| SupplyError::from_write(TxStep::Supply, e))?;
        info!(tx_hash = %supply_tx, symbol = %approved.symbol, "supply confirmed");

        let after = self.snapshot(deposit).await?;
        let receipt = SupplyReceipt {
            asset: deposit.asset,
            amount: deposit.amount.clone(),
            supply_tx,
            wrap_tx: deposit.wrap_tx,
            approval_tx: approved.approval_tx,
            collateral_delta: after.total_collateral_usd - before.total_collateral_usd,
            health_factor_delta: after.health_factor - before.health_factor,
            before,
            after,
        };

        if !receipt.collateral_increased() {
            warn!(
                tx_hash = %supply_tx,
                collateral_delta = %receipt.collateral_delta,
                "supply confirmed but collateral did not increase"
            );
        }

        Ok(receipt)
    }

    async fn snapshot(&self, deposit: &ResolvedDeposit) -> Result<AccountSnapshot, SupplyError> {
        let raw = self
            .ledger
            .account_data(deposit.pool, deposit.depositor)
            .await?;
        Ok(AccountSnapshot::from(raw))
    }
}

/// Human amount → smallest unit. More fractional digits than the token has
/// decimals, or a result of zero, is an invalid amount rather than a rounded
/// one.
fn scale_amount(amount: &str, decimals: u8, symbol: &str) -> Result<U256, SupplyError> {
    let fraction_digits = amount.split_once('.').map_or(0, |(_, frac)| frac.len());
    if fraction_digits > usize::from(decimals) {
        return Err(SupplyError::InvalidAmount(format!(
            "{amount:?} has {fraction_digits} fractional digits, {symbol} allows {decimals}"
        )));
    }

    let scaled = parse_units(amount, decimals)
        .map_err(|e| {
            SupplyError::InvalidAmount(format!(
                "cannot convert {amount:?} to {symbol} units ({decimals} decimals): {e}"
            ))
        })?
        .get_absolute();
    if scaled.is_zero() {
        return Err(SupplyError::InvalidAmount(format!(
            "{amount:?} is below the smallest unit of {symbol}"
        )));
    }
    Ok(scaled)
}
