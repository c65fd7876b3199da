use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a trade relative to the base asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeDirection {
    /// Swap the base asset into the target asset.
    Acquire,
    /// Swap the whole holding of the target asset back to the base asset.
    Dispose,
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acquire => write!(f, "acquire"),
            Self::Dispose => write!(f, "dispose"),
        }
    }
}

/// State of a single execution.
///
/// The happy path is `Idle -> Quoting -> Signing -> Broadcasting -> Confirmed`.
/// `Failed` is reachable from any non-terminal state, `Skipped` only from
/// `Quoting`, where the venue decides whether the asset is tradable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionState {
    Idle,
    Quoting,
    Signing,
    Broadcasting,
    Confirmed,
    Failed,
    Skipped,
}

impl ExecutionState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed | Self::Skipped)
    }

    /// Returns true if `next` is the legal successor of this state.
    #[must_use]
    pub fn can_transition_to(&self, next: ExecutionState) -> bool {
        use ExecutionState::*;
        match (self, next) {
            (Idle, Quoting) => true,
            (Quoting, Signing) => true,
            (Signing, Broadcasting) => true,
            (Broadcasting, Confirmed) => true,
            (Quoting, Skipped) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Quoting => "quoting",
            Self::Signing => "signing",
            Self::Broadcasting => "broadcasting",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        };
        f.write_str(name)
    }
}
