//! Per-asset registry of executions.
//!
//! The registry is the only mutual-exclusion point of the engine. Claiming a
//! slot is a single `entry` operation on the shard that owns the asset, so
//! "no live record exists" and "insert mine" can never interleave with
//! another claim. Shard locks are only held for the duration of a map
//! operation, never across an `.await`.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use sniper_domain::{AdmissionError, AssetId, ExecutionRecord, TradeIntent, TransitionError};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

/// Failure to update a claimed record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The slot is gone or now belongs to another intent.
    #[error("no live record of intent {intent_id} for {asset_id}")]
    NotOwner { asset_id: AssetId, intent_id: Uuid },
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

#[derive(Debug, Clone)]
struct Slot {
    record: ExecutionRecord,
    /// Set once the record reaches a terminal state.
    finished: Option<Instant>,
}

impl Slot {
    fn expired(&self, retention: Duration, now: Instant) -> bool {
        self.finished
            .is_some_and(|at| now.saturating_duration_since(at) >= retention)
    }
}

/// Execution records keyed by asset.
#[derive(Debug)]
pub struct ExecutionRegistry {
    slots: DashMap<AssetId, Slot>,
    retention: Duration,
}

impl ExecutionRegistry {
    /// Creates a registry keeping terminal records for `retention`.
    #[must_use]
    pub fn new(retention: Duration) -> Self {
        Self {
            slots: DashMap::new(),
            retention,
        }
    }

    /// Atomically claims the slot for `intent`'s asset.
    ///
    /// A retained terminal record is replaced; its attempt count carries over.
    ///
    /// # Errors
    /// `DuplicateInFlight` if a non-terminal record exists.
    pub fn claim(&self, intent: &TradeIntent) -> Result<ExecutionRecord, AdmissionError> {
        self.prune_expired();

        match self.slots.entry(intent.asset_id.clone()) {
            Entry::Occupied(mut occupied) => {
                if !occupied.get().record.is_terminal() {
                    return Err(AdmissionError::DuplicateInFlight(intent.asset_id.clone()));
                }
                let attempts = occupied.get().record.attempts.saturating_add(1);
                let record = ExecutionRecord::new(intent, attempts);
                occupied.insert(Slot {
                    record: record.clone(),
                    finished: None,
                });
                Ok(record)
            }
            Entry::Vacant(vacant) => {
                let record = ExecutionRecord::new(intent, 1);
                vacant.insert(Slot {
                    record: record.clone(),
                    finished: None,
                });
                Ok(record)
            }
        }
    }

    /// Applies `update` to the live record of `intent_id` and returns the
    /// result.
    ///
    /// # Errors
    /// `NotOwner` if the slot no longer belongs to the intent, or the
    /// transition error returned by `update`. The record is untouched on
    /// error.
    pub fn update<F>(
        &self,
        asset_id: &AssetId,
        intent_id: Uuid,
        update: F,
    ) -> Result<ExecutionRecord, RegistryError>
    where
        F: FnOnce(&mut ExecutionRecord) -> Result<(), TransitionError>,
    {
        let not_owner = || RegistryError::NotOwner {
            asset_id: asset_id.clone(),
            intent_id,
        };
        let mut slot = self.slots.get_mut(asset_id).ok_or_else(not_owner)?;
        if slot.record.intent_id != intent_id {
            return Err(not_owner());
        }

        let mut next = slot.record.clone();
        update(&mut next)?;
        if next.is_terminal() && slot.finished.is_none() {
            slot.finished = Some(Instant::now());
        }
        slot.record = next.clone();
        Ok(next)
    }

    /// Latest record for `asset_id`, if one is live or still retained.
    pub fn get(&self, asset_id: &AssetId) -> Option<ExecutionRecord> {
        let now = Instant::now();
        self.slots
            .get(asset_id)
            .filter(|slot| !slot.expired(self.retention, now))
            .map(|slot| slot.record.clone())
    }

    /// Non-terminal records.
    pub fn in_flight(&self) -> Vec<ExecutionRecord> {
        self.slots
            .iter()
            .filter(|slot| !slot.record.is_terminal())
            .map(|slot| slot.record.clone())
            .collect()
    }

    /// Drops terminal records older than the retention window. Returns how
    /// many were removed.
    pub fn prune_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.slots.len();
        self.slots
            .retain(|_, slot| !slot.expired(self.retention, now));
        let removed = before.saturating_sub(self.slots.len());
        if removed > 0 {
            debug!(removed, "Pruned expired execution records");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
