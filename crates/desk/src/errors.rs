use serde::Serialize;
use thiserror::Error;

/// Failures raised by a [`Ledger`](crate::execution::ledger::Ledger)
/// implementation.
///
/// Read methods only ever produce the forwarded transport/contract variants.
/// Write methods additionally distinguish an on-chain revert from a
/// confirmation that never arrived.
#[derive(Error, Debug)]
pub enum LedgerError {
    // -- Execution ----------------------------------------------------------
    #[error("transaction simulation failed: {reason}")]
    SimulationFailed { reason: String },

    #[error("transaction reverted: {reason} (tx: {tx_hash})")]
    TxReverted { tx_hash: String, reason: String },

    #[error("transaction timed out after {timeout_seconds}s (tx: {tx_hash})")]
    TxTimeout { tx_hash: String, timeout_seconds: u64 },

    #[error("transaction signing failed: {reason}")]
    Signing { reason: String },

    // -- Forwarded errors ---------------------------------------------------
    #[error(transparent)]
    Transport(#[from] alloy::transports::TransportError),

    #[error(transparent)]
    Contract(#[from] alloy::contract::Error),
}

/// Stable, serialisable classification of a [`SupplyError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    InvalidAmount,
    InsufficientBalance,
    WrapFailed,
    ApprovalFailed,
    SupplyFailed,
    EnableCollateralFailed,
    ConfirmationTimeout,
    NetworkError,
}

/// The on-chain write a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxStep {
    Wrap,
    Approve,
    Supply,
    EnableCollateral,
}

impl std::fmt::Display for TxStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TxStep::Wrap => "wrap",
            TxStep::Approve => "approval",
            TxStep::Supply => "supply",
            TxStep::EnableCollateral => "enable-collateral",
        };
        f.write_str(name)
    }
}

/// Typed failure of the collateral-supply workflow.
#[derive(Error, Debug)]
pub enum SupplyError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("insufficient balance: need {required} {symbol}, have {available} {symbol}")]
    InsufficientBalance {
        symbol: String,
        required: String,
        available: String,
    },

    #[error("wrap failed: {0}")]
    WrapFailed(#[source] LedgerError),

    #[error("approval failed: {0}")]
    ApprovalFailed(#[source] LedgerError),

    #[error("supply failed: {0}")]
    SupplyFailed(#[source] LedgerError),

    #[error("enable collateral failed: {0}")]
    EnableCollateralFailed(#[source] LedgerError),

    #[error("{step} confirmation timed out: {source}")]
    ConfirmationTimeout {
        step: TxStep,
        #[source]
        source: LedgerError,
    },

    #[error("network error: {0}")]
    Network(#[source] LedgerError),
}

impl SupplyError {
    /// Map a failure of an on-chain write to the workflow error for `step`.
    pub fn from_write(step: TxStep, err: LedgerError) -> Self {
        match err {
            LedgerError::TxTimeout { .. } => SupplyError::ConfirmationTimeout { step, source: err },
            LedgerError::Transport(_) | LedgerError::Contract(_) => SupplyError::Network(err),
            LedgerError::SimulationFailed { .. }
            | LedgerError::TxReverted { .. }
            | LedgerError::Signing { .. } => match step {
                TxStep::Wrap => SupplyError::WrapFailed(err),
                TxStep::Approve => SupplyError::ApprovalFailed(err),
                TxStep::Supply => SupplyError::SupplyFailed(err),
                TxStep::EnableCollateral => SupplyError::EnableCollateralFailed(err),
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SupplyError::InvalidAmount(_) => ErrorKind::InvalidAmount,
            SupplyError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            SupplyError::WrapFailed(_) => ErrorKind::WrapFailed,
            SupplyError::ApprovalFailed(_) => ErrorKind::ApprovalFailed,
            SupplyError::EnableCollateralFailed(_) => ErrorKind::EnableCollateralFailed,
            SupplyError::SupplyFailed(_) => ErrorKind::SupplyFailed,
            SupplyError::ConfirmationTimeout { .. } => ErrorKind::ConfirmationTimeout,
            SupplyError::Network(_) => ErrorKind::NetworkError,
        }
    }
}

/// Reads never mutate state, so any failure on them is a connectivity fault.
impl From<LedgerError> for SupplyError {
    fn from(err: LedgerError) -> Self {
        SupplyError::Network(err)
    }
}
