//! Trade lifecycle events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sniper_domain::{AssetId, ExecutionRecord, ExecutionState, TradeDirection};
use uuid::Uuid;

/// Type of lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeEventType {
    /// A new execution was admitted.
    Admitted,
    /// Admission was rejected because an execution is already in flight.
    DuplicateRejected,
    /// An execution moved to a non-terminal state.
    StateChanged,
    /// An execution reached a terminal state.
    Finished,
    /// A delayed disposal was armed.
    ExitArmed,
    /// A delayed disposal was cancelled before firing.
    ExitCancelled,
    /// A delayed disposal fired and handed the asset to the coordinator.
    ExitFired,
}

/// A lifecycle event for one asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeEvent {
    /// Event ID.
    pub id: String,
    pub event_type: TradeEventType,
    pub asset_id: AssetId,
    pub timestamp: DateTime<Utc>,
    /// Event-specific data.
    pub data: EventData,
}

impl TradeEvent {
    /// Creates a new event stamped now.
    pub fn new(event_type: TradeEventType, asset_id: AssetId, data: EventData) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_type,
            asset_id,
            timestamp: Utc::now(),
            data,
        }
    }

    /// Event describing the current state of `record`.
    pub fn from_record(record: &ExecutionRecord) -> Self {
        let event_type = match record.state {
            ExecutionState::Idle => TradeEventType::Admitted,
            s if s.is_terminal() => TradeEventType::Finished,
            _ => TradeEventType::StateChanged,
        };
        Self::new(
            event_type,
            record.asset_id.clone(),
            EventData::Execution(ExecutionData::from(record)),
        )
    }

    /// Whether this event closes an execution.
    pub fn is_terminal(&self) -> bool {
        self.event_type == TradeEventType::Finished
    }
}

/// Event-specific data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventData {
    /// Execution progress.
    Execution(ExecutionData),
    /// Rejected admission.
    Rejected { direction: TradeDirection },
    /// Scheduled exit bookkeeping.
    Exit(ExitData),
}

/// Snapshot of an execution record at the time of the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionData {
    pub intent_id: Uuid,
    pub direction: TradeDirection,
    pub state: ExecutionState,
    pub attempts: u32,
    pub transaction_id: Option<String>,
    pub last_error: Option<String>,
}

impl From<&ExecutionRecord> for ExecutionData {
    fn from(record: &ExecutionRecord) -> Self {
        Self {
            intent_id: record.intent_id,
            direction: record.direction,
            state: record.state,
            attempts: record.attempts,
            transaction_id: record.transaction_id.clone(),
            last_error: record.last_error.clone(),
        }
    }
}

/// Data for scheduled exit events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitData {
    /// When the exit fires (or would have fired).
    pub fire_at: DateTime<Utc>,
    /// Delay requested at arm time.
    pub delay_secs: u64,
}
