//! Delayed disposals armed after a successful acquisition.
//!
//! Every armed exit owns a sleeping task. When the sleep ends the task must
//! win a check-and-clear of its table entry before it may dispose, and
//! `cancel` removes the entry under the same lock, so whichever of the two
//! reaches the table first decides the outcome.

use crate::lifecycle::{EventBus, EventData, ExitData, TradeEvent, TradeEventType};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sniper_domain::{AdmissionError, AssetId, ExecutionRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Whatever the manager hands fired exits to.
#[async_trait]
pub trait DisposeTarget: Send + Sync {
    async fn dispose(&self, asset_id: AssetId) -> Result<ExecutionRecord, AdmissionError>;
}

/// Scheduling failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("exit already armed for {0}")]
    AlreadyArmed(AssetId),
    #[error("no exit armed for {0}")]
    NotArmed(AssetId),
}

/// A delayed disposal of one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledExit {
    pub asset_id: AssetId,
    /// Wall-clock estimate of the firing time, for display.
    pub fire_at: DateTime<Utc>,
    pub delay: Duration,
    pub cancelled: bool,
}

impl ScheduledExit {
    fn event(&self, event_type: TradeEventType) -> TradeEvent {
        TradeEvent::new(
            event_type,
            self.asset_id.clone(),
            EventData::Exit(ExitData {
                fire_at: self.fire_at,
                delay_secs: self.delay.as_secs(),
            }),
        )
    }
}

#[derive(Debug)]
struct ArmedExit {
    id: u64,
    exit: ScheduledExit,
    token: CancellationToken,
}

type ExitTable = Arc<Mutex<HashMap<AssetId, ArmedExit>>>;

/// Arms, cancels and fires delayed disposals. At most one exit per asset.
pub struct ScheduledExitManager {
    target: Weak<dyn DisposeTarget>,
    armed: ExitTable,
    next_id: AtomicU64,
    events: EventBus,
}

impl ScheduledExitManager {
    /// Creates a manager firing into `target`.
    ///
    /// The reference is weak because the target usually owns the manager.
    /// Exits that fire after the target is dropped do nothing.
    pub fn new(target: Weak<dyn DisposeTarget>, events: EventBus) -> Self {
        Self {
            target,
            armed: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
            events,
        }
    }

    /// Arms a disposal of `asset_id` after `delay_secs`, measured from now.
    /// A zero delay fires as soon as the runtime gets to it.
    ///
    /// # Errors
    /// `AlreadyArmed` if an exit for the asset is pending.
    pub fn arm(&self, asset_id: AssetId, delay_secs: u64) -> Result<ScheduledExit, ScheduleError> {
        let delay = Duration::from_secs(delay_secs);
        let deadline = deadline_after(delay);
        let exit = ScheduledExit {
            asset_id: asset_id.clone(),
            fire_at: chrono::Duration::from_std(delay)
                .ok()
                .and_then(|d| Utc::now().checked_add_signed(d))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            delay,
            cancelled: false,
        };
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        {
            let mut armed = lock(&self.armed);
            if armed.contains_key(&asset_id) {
                return Err(ScheduleError::AlreadyArmed(asset_id));
            }
            armed.insert(
                asset_id.clone(),
                ArmedExit {
                    id,
                    exit: exit.clone(),
                    token: token.clone(),
                },
            );
        }

        info!(asset = %asset_id, delay_secs, fire_at = %exit.fire_at, "Scheduled exit armed");
        self.events.publish(exit.event(TradeEventType::ExitArmed));

        let table = self.armed.clone();
        let target = self.target.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep_until(deadline) => {}
            }

            // Check-and-clear: only the entry this task armed may fire.
            let fired = {
                let mut armed = lock(&table);
                match armed.get(&asset_id) {
                    Some(entry) if entry.id == id && !entry.token.is_cancelled() => {
                        armed.remove(&asset_id).map(|entry| entry.exit)
                    }
                    _ => None,
                }
            };
            let Some(exit) = fired else {
                debug!(asset = %asset_id, "Scheduled exit lost race to cancel");
                return;
            };

            events.publish(exit.event(TradeEventType::ExitFired));
            let Some(target) = target.upgrade() else {
                warn!(asset = %asset_id, "Scheduled exit fired after shutdown");
                return;
            };
            info!(asset = %asset_id, "Scheduled exit fired, disposing");
            match target.dispose(asset_id.clone()).await {
                Ok(record) => {
                    info!(asset = %asset_id, state = %record.state, "Scheduled disposal finished");
                }
                Err(e) => {
                    warn!(asset = %asset_id, error = %e, "Scheduled disposal rejected");
                }
            }
        });

        Ok(exit)
    }

    /// Cancels the pending exit for `asset_id`.
    ///
    /// # Errors
    /// `NotArmed` if nothing is pending, including when the exit already
    /// fired.
    pub fn cancel(&self, asset_id: &AssetId) -> Result<ScheduledExit, ScheduleError> {
        let entry = lock(&self.armed)
            .remove(asset_id)
            .ok_or_else(|| ScheduleError::NotArmed(asset_id.clone()))?;
        entry.token.cancel();

        let mut exit = entry.exit;
        exit.cancelled = true;
        info!(asset = %asset_id, "Scheduled exit cancelled");
        self.events.publish(exit.event(TradeEventType::ExitCancelled));
        Ok(exit)
    }

    /// Pending exit for `asset_id`.
    pub fn armed(&self, asset_id: &AssetId) -> Option<ScheduledExit> {
        lock(&self.armed).get(asset_id).map(|entry| entry.exit.clone())
    }

    pub fn armed_count(&self) -> usize {
        lock(&self.armed).len()
    }

    /// Cancels every pending exit. Returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<ArmedExit> = lock(&self.armed).drain().map(|(_, e)| e).collect();
        for entry in &drained {
            entry.token.cancel();
        }
        if !drained.is_empty() {
            info!(count = drained.len(), "Cancelled all scheduled exits");
        }
        drained.len()
    }
}

impl Drop for ScheduledExitManager {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Stand-in deadline for delays that overflow the clock.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

fn deadline_after(delay: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(delay).unwrap_or(now + FAR_FUTURE)
}

/// Locks the table, recovering from poisoning.
fn lock(table: &Mutex<HashMap<AssetId, ArmedExit>>) -> MutexGuard<'_, HashMap<AssetId, ArmedExit>> {
    table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
