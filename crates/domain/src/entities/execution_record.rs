use crate::entities::TradeIntent;
use crate::enums::{ExecutionState, TradeDirection};
use crate::errors::{TradeError, TransitionError};
use crate::value_objects::AssetId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Progress of one execution, as reported by `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub asset_id: AssetId,
    /// Intent this record belongs to.
    pub intent_id: Uuid,
    pub direction: TradeDirection,
    pub state: ExecutionState,
    /// Admissions for this asset while earlier records were retained.
    pub attempts: u32,
    pub transaction_id: Option<String>,
    pub last_error: Option<String>,
    pub admitted_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ExecutionRecord {
    /// Creates an `Idle` record for a freshly admitted intent.
    pub fn new(intent: &TradeIntent, attempts: u32) -> Self {
        Self {
            asset_id: intent.asset_id.clone(),
            intent_id: intent.id,
            direction: intent.direction,
            state: ExecutionState::Idle,
            attempts,
            transaction_id: None,
            last_error: None,
            admitted_at: intent.detected_at,
            finished_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Moves to `next` if the transition is legal.
    ///
    /// # Errors
    /// Returns `TransitionError` and leaves the record untouched otherwise.
    pub fn advance(&mut self, next: ExecutionState) -> Result<(), TransitionError> {
        if !self.state.can_transition_to(next) {
            return Err(TransitionError {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        if next.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Records a successful broadcast.
    pub fn confirm(&mut self, transaction_id: String) -> Result<(), TransitionError> {
        self.advance(ExecutionState::Confirmed)?;
        self.transaction_id = Some(transaction_id);
        Ok(())
    }

    /// Terminates with the state implied by `error`.
    pub fn terminate(&mut self, error: &TradeError) -> Result<(), TransitionError> {
        self.advance(error.terminal_state())?;
        self.last_error = Some(error.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::Settings;

    fn intent() -> TradeIntent {
        TradeIntent::new(
            AssetId::new("So11111111111111111111111111111111111111112"),
            TradeDirection::Acquire,
            Settings::default(),
        )
    }

    #[test]
    fn test_happy_path() {
        let mut record = ExecutionRecord::new(&intent(), 1);
        assert_eq!(record.state, ExecutionState::Idle);
        record.advance(ExecutionState::Quoting).unwrap();
        record.advance(ExecutionState::Signing).unwrap();
        record.advance(ExecutionState::Broadcasting).unwrap();
        record.confirm("5sig".to_string()).unwrap();
        assert!(record.is_terminal());
        assert_eq!(record.transaction_id.as_deref(), Some("5sig"));
        assert!(record.finished_at.is_some());
    }

    #[test]
    fn test_illegal_transition_leaves_record_unchanged() {
        let mut record = ExecutionRecord::new(&intent(), 1);
        let err = record.advance(ExecutionState::Broadcasting).unwrap_err();
        assert_eq!(err.from, ExecutionState::Idle);
        assert_eq!(record.state, ExecutionState::Idle);
    }

    #[test]
    fn test_terminate_classifies() {
        let mut record = ExecutionRecord::new(&intent(), 1);
        record.advance(ExecutionState::Quoting).unwrap();
        record
            .terminate(&TradeError::NotTradable("no route".into()))
            .unwrap();
        assert_eq!(record.state, ExecutionState::Skipped);
        assert!(record.last_error.unwrap().contains("no route"));

        let mut record = ExecutionRecord::new(&intent(), 1);
        record.advance(ExecutionState::Quoting).unwrap();
        record.advance(ExecutionState::Signing).unwrap();
        record
            .terminate(&TradeError::Signing("bad key".into()))
            .unwrap();
        assert_eq!(record.state, ExecutionState::Failed);
    }

    #[test]
    fn test_terminal_is_final() {
        let mut record = ExecutionRecord::new(&intent(), 1);
        record.terminate(&TradeError::Venue("down".into())).unwrap();
        assert!(record.advance(ExecutionState::Quoting).is_err());
        assert!(record.terminate(&TradeError::Venue("again".into())).is_err());
    }
}
