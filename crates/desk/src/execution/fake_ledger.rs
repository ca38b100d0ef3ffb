//! In-memory [`Ledger`] for workflow tests.

use alloy::primitives::{Address, B256, U256};
use alloy::transports::TransportErrorKind;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::errors::{LedgerError, TxStep};
use crate::types::{RawAccountData, ReserveCollateralConfig, TokenMetadata};

use super::ledger::{Ledger, LedgerReader};

const WAD_UNIT: u128 = 1_000_000_000_000_000_000;
const BPS_UNIT: u64 = 10_000;

/// A mutating call, recorded in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCall {
    Wrap {
        wrapped: Address,
        amount: U256,
    },
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },
    Supply {
        pool: Address,
        asset: Address,
        amount: U256,
        on_behalf_of: Address,
    },
    SetCollateral {
        pool: Address,
        asset: Address,
        enabled: bool,
    },
}

/// Scripted failure for one write step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Revert,
    Timeout,
    Transport,
}

#[derive(Default)]
struct State {
    native: U256,
    balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    metadata: HashMap<Address, TokenMetadata>,
    accounts: HashMap<Address, RawAccountData>,
    reserves: HashMap<Address, ReserveCollateralConfig>,
    /// Base-currency units credited per supplied smallest unit, scaled down
    /// by `collateral_divisor`.
    collateral_per_unit: U256,
    collateral_divisor: U256,
    failures: HashMap<TxStep, Failure>,
    fail_reads: bool,
    calls: Vec<LedgerCall>,
    next_hash: u8,
}

pub struct FakeLedger {
    depositor: Address,
    state: Mutex<State>,
}

impl FakeLedger {
    pub fn new(depositor: Address) -> Self {
        Self {
            depositor,
            state: Mutex::new(State {
                collateral_divisor: U256::from(1u64),
                ..Default::default()
            }),
        }
    }

    pub fn with_token(self, token: Address, symbol: &str, decimals: u8) -> Self {
        self.state.lock().unwrap().metadata.insert(
            token,
            TokenMetadata {
                symbol: symbol.to_string(),
                decimals,
            },
        );
        self
    }

    pub fn with_native(self, amount: U256) -> Self {
        self.state.lock().unwrap().native = amount;
        self
    }

    pub fn with_balance(self, token: Address, owner: Address, amount: U256) -> Self {
        self.state
            .lock()
            .unwrap()
            .balances
            .insert((token, owner), amount);
        self
    }

    pub fn with_allowance(
        self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Self {
        self.state
            .lock()
            .unwrap()
            .allowances
            .insert((token, owner, spender), amount);
        self
    }

    pub fn with_account(self, user: Address, data: RawAccountData) -> Self {
        self.state.lock().unwrap().accounts.insert(user, data);
        self
    }

    pub fn with_reserve(self, asset: Address, config: ReserveCollateralConfig) -> Self {
        self.state.lock().unwrap().reserves.insert(asset, config);
        self
    }

    /// Each supplied smallest unit adds `numerator / divisor` base-currency
    /// units of collateral.
    pub fn with_collateral_price(self, numerator: U256, divisor: U256) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.collateral_per_unit = numerator;
            state.collateral_divisor = divisor;
        }
        self
    }

    pub fn failing(self, step: TxStep, failure: Failure) -> Self {
        self.state.lock().unwrap().failures.insert(step, failure);
        self
    }

    pub fn failing_reads(self) -> Self {
        self.state.lock().unwrap().fail_reads = true;
        self
    }

    pub fn calls(&self) -> Vec<LedgerCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn balance(&self, token: Address, owner: Address) -> U256 {
        let state = self.state.lock().unwrap();
        state
            .balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default()
    }

    fn read_guard(&self) -> Result<(), LedgerError> {
        if self.state.lock().unwrap().fail_reads {
            return Err(TransportErrorKind::custom_str("connection refused").into());
        }
        Ok(())
    }

    /// Apply the scripted outcome for `step`; on success records `call` and
    /// returns its hash.
    fn write(
        &self,
        step: TxStep,
        call: LedgerCall,
        apply: impl FnOnce(&mut State) -> Result<(), String>,
    ) -> Result<B256, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.next_hash = state.next_hash.wrapping_add(1);
        let hash = B256::with_last_byte(state.next_hash);

        match state.failures.get(&step) {
            Some(Failure::Revert) => {
                return Err(LedgerError::TxReverted {
                    tx_hash: hash.to_string(),
                    reason: "execution reverted".into(),
                })
            }
            Some(Failure::Timeout) => {
                return Err(LedgerError::TxTimeout {
                    tx_hash: hash.to_string(),
                    timeout_seconds: 1,
                })
            }
            Some(Failure::Transport) => {
                return Err(TransportErrorKind::custom_str("connection reset").into())
            }
            None => {}
        }

        apply(&mut *state).map_err(|reason| LedgerError::TxReverted {
            tx_hash: hash.to_string(),
            reason,
        })?;
        state.calls.push(call);
        Ok(hash)
    }
}

#[async_trait]
impl LedgerReader for FakeLedger {
    async fn token_metadata(&self, token: Address) -> Result<TokenMetadata, LedgerError> {
        self.read_guard()?;
        let state = self.state.lock().unwrap();
        Ok(state.metadata.get(&token).cloned().unwrap_or(TokenMetadata {
            symbol: "TKN".into(),
            decimals: 18,
        }))
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, LedgerError> {
        self.read_guard()?;
        Ok(self.balance(token, owner))
    }

    async fn native_balance(&self, owner: Address) -> Result<U256, LedgerError> {
        self.read_guard()?;
        let state = self.state.lock().unwrap();
        Ok(if owner == self.depositor {
            state.native
        } else {
            U256::ZERO
        })
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, LedgerError> {
        self.read_guard()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default())
    }

    async fn account_data(
        &self,
        _pool: Address,
        user: Address,
    ) -> Result<RawAccountData, LedgerError> {
        self.read_guard()?;
        let state = self.state.lock().unwrap();
        Ok(state.accounts.get(&user).copied().unwrap_or(RawAccountData {
            health_factor: U256::MAX,
            ..Default::default()
        }))
    }

    async fn reserve_collateral_config(
        &self,
        _data_provider: Address,
        asset: Address,
    ) -> Result<Option<ReserveCollateralConfig>, LedgerError> {
        self.read_guard()?;
        Ok(self.state.lock().unwrap().reserves.get(&asset).copied())
    }
}

#[async_trait]
impl Ledger for FakeLedger {
    fn depositor(&self) -> Address {
        self.depositor
    }

    async fn wrap_native(&self, wrapped: Address, amount: U256) -> Result<B256, LedgerError> {
        let owner = self.depositor;
        self.write(
            TxStep::Wrap,
            LedgerCall::Wrap { wrapped, amount },
            |state| {
                if state.native < amount {
                    return Err("insufficient native balance".into());
                }
                state.native -= amount;
                *state.balances.entry((wrapped, owner)).or_default() += amount;
                Ok(())
            },
        )
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<B256, LedgerError> {
        let owner = self.depositor;
        self.write(
            TxStep::Approve,
            LedgerCall::Approve {
                token,
                spender,
                amount,
            },
            |state| {
                state.allowances.insert((token, owner, spender), amount);
                Ok(())
            },
        )
    }

    async fn supply(
        &self,
        pool: Address,
        asset: Address,
        amount: U256,
    ) -> Result<B256, LedgerError> {
        let owner = self.depositor;
        self.write(
            TxStep::Supply,
            LedgerCall::Supply {
                pool,
                asset,
                amount,
                on_behalf_of: owner,
            },
            |state| {
                let allowance = state
                    .allowances
                    .get(&(asset, owner, pool))
                    .copied()
                    .unwrap_or_default();
                if allowance < amount {
                    return Err("ERC20: insufficient allowance".into());
                }
                let balance = state.balances.entry((asset, owner)).or_default();
                if *balance < amount {
                    return Err("ERC20: transfer amount exceeds balance".into());
                }
                *balance -= amount;
                if allowance != U256::MAX {
                    state.allowances.insert((asset, owner, pool), allowance - amount);
                }

                let gained = amount * state.collateral_per_unit / state.collateral_divisor;
                let account = state.accounts.entry(owner).or_insert(RawAccountData {
                    health_factor: U256::MAX,
                    ..Default::default()
                });
                account.total_collateral_base += gained;
                if !account.total_debt_base.is_zero() {
                    account.health_factor = account.total_collateral_base
                        * account.current_liquidation_threshold
                        * U256::from(WAD_UNIT)
                        / (account.total_debt_base * U256::from(BPS_UNIT));
                }
                Ok(())
            },
        )
    }

    async fn set_use_as_collateral(
        &self,
        pool: Address,
        asset: Address,
        enabled: bool,
    ) -> Result<B256, LedgerError> {
        self.write(
            TxStep::EnableCollateral,
            LedgerCall::SetCollateral {
                pool,
                asset,
                enabled,
            },
            |_| Ok(()),
        )
    }
}
