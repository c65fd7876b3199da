//! Error taxonomy for settings and trade execution.

use crate::enums::ExecutionState;
use crate::value_objects::{AssetId, SettingKey};
use rust_decimal::Decimal;
use thiserror::Error;

/// A settings value violates one of its bounds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Buy amount must be strictly positive.
    #[error("{key} must be greater than 0, got {value}")]
    NotPositive { key: SettingKey, value: Decimal },
    /// Percentage outside `[0, 100]`.
    #[error("{key} must be between 0 and 100, got {value}")]
    PercentOutOfRange { key: SettingKey, value: Decimal },
    /// Negative duration.
    #[error("{key} must be >= 0, got {value}")]
    Negative { key: SettingKey, value: Decimal },
    /// Amount that rounds down to zero lamports or overflows `u64` lamports.
    #[error("{key} must be at least one lamport and fit in u64 lamports, got {value}")]
    NotInLamports { key: SettingKey, value: Decimal },
}

impl ValidationError {
    /// The setting whose bound was violated.
    #[must_use]
    pub fn key(&self) -> SettingKey {
        match self {
            Self::NotPositive { key, .. }
            | Self::PercentOutOfRange { key, .. }
            | Self::Negative { key, .. }
            | Self::NotInLamports { key, .. } => *key,
        }
    }
}

/// Failure to apply a raw `key = value` update.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingError {
    #[error("unknown setting: {0}")]
    UnknownKey(String),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: SettingKey, value: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Illegal state machine transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal transition {from} -> {to}")]
pub struct TransitionError {
    pub from: ExecutionState,
    pub to: ExecutionState,
}

/// Classified failure of a trade execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradeError {
    /// The venue has no route for the asset. Not retryable.
    #[error("asset not tradable: {0}")]
    NotTradable(String),
    /// Nothing to dispose of.
    #[error("no holding to dispose")]
    EmptyHolding,
    /// Any other venue failure.
    #[error("venue error: {0}")]
    Venue(String),
    #[error("holdings lookup failed: {0}")]
    Holdings(String),
    #[error("signing failed: {0}")]
    Signing(String),
    #[error("broadcast failed: {0}")]
    Broadcast(String),
    /// A capability call exceeded the configured timeout.
    #[error("{stage} timed out after {secs}s")]
    Timeout { stage: &'static str, secs: u64 },
    /// Broken invariant inside the engine.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TradeError {
    /// Whether this error ends the execution as `Skipped` rather than `Failed`.
    #[must_use]
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::NotTradable(_) | Self::EmptyHolding)
    }

    /// Terminal state this error drives an execution into.
    #[must_use]
    pub fn terminal_state(&self) -> ExecutionState {
        if self.is_skip() {
            ExecutionState::Skipped
        } else {
            ExecutionState::Failed
        }
    }
}

/// Rejected admission into the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// A non-terminal execution already exists for the asset.
    #[error("execution already in flight for {0}")]
    DuplicateInFlight(AssetId),
}
