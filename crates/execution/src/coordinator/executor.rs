//! Execution coordinator driving the per-asset trade state machine.

use super::{CoordinatorConfig, ExecutionRegistry, RegistryError};
use crate::lifecycle::{EventBus, EventData, TradeEvent, TradeEventType};
use crate::scheduler::{DisposeTarget, ScheduledExitManager};
use async_trait::async_trait;
use sniper_data::SettingsStore;
use sniper_domain::{
    AdmissionError, AssetId, ExecutionRecord, ExecutionState, TradeDirection, TradeError,
    TradeIntent,
};
use sniper_protocols::{
    Broadcaster, HoldingsSource, QuoteRequest, SwapError, SwapVenue, TransactionId,
    TransactionSigner,
};
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// The external services an execution calls out to.
#[derive(Clone)]
pub struct Capabilities {
    pub venue: Arc<dyn SwapVenue>,
    pub signer: Arc<dyn TransactionSigner>,
    pub broadcaster: Arc<dyn Broadcaster>,
    pub holdings: Arc<dyn HoldingsSource>,
}

/// Admits trade requests and runs each one through
/// `Idle -> Quoting -> Signing -> Broadcasting -> Confirmed`.
///
/// Executions for different assets run fully in parallel. For one asset at
/// most one execution is live; further requests are rejected until it ends.
pub struct ExecutionCoordinator {
    this: Weak<Self>,
    settings: Arc<SettingsStore>,
    capabilities: Capabilities,
    registry: ExecutionRegistry,
    exits: ScheduledExitManager,
    events: EventBus,
    config: CoordinatorConfig,
}

impl ExecutionCoordinator {
    /// Creates a coordinator and the exit manager that feeds disposals back
    /// into it.
    pub fn new(
        settings: Arc<SettingsStore>,
        capabilities: Capabilities,
        config: CoordinatorConfig,
    ) -> Arc<Self> {
        let events = EventBus::new(config.event_capacity);
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let target: Weak<dyn DisposeTarget> = weak.clone();
            Self {
                this: weak.clone(),
                settings,
                capabilities,
                registry: ExecutionRegistry::new(config.record_retention),
                exits: ScheduledExitManager::new(target, events.clone()),
                events,
                config,
            }
        })
    }

    /// Buys `asset_id` with the configured buy amount of the base asset.
    ///
    /// The execution runs on a task owned by the coordinator and reaches a
    /// terminal state even if this future is dropped. The outcome is in the
    /// returned record, not in the error.
    ///
    /// # Errors
    /// `DuplicateInFlight` if the asset already has a live execution.
    pub async fn acquire(&self, asset_id: AssetId) -> Result<ExecutionRecord, AdmissionError> {
        self.execute(asset_id, TradeDirection::Acquire).await
    }

    /// Sells the wallet's whole holding of `asset_id` back to the base asset.
    ///
    /// # Errors
    /// `DuplicateInFlight` if the asset already has a live execution.
    pub async fn dispose(&self, asset_id: AssetId) -> Result<ExecutionRecord, AdmissionError> {
        self.execute(asset_id, TradeDirection::Dispose).await
    }

    /// Latest record for `asset_id`. Repeated calls return the same record
    /// until a new execution is admitted or the retention window lapses.
    pub fn status(&self, asset_id: &AssetId) -> Option<ExecutionRecord> {
        self.registry.get(asset_id)
    }

    /// Records of executions still running.
    pub fn in_flight(&self) -> Vec<ExecutionRecord> {
        self.registry.in_flight()
    }

    pub fn exits(&self) -> &ScheduledExitManager {
        &self.exits
    }

    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TradeEvent> {
        self.events.subscribe()
    }

    /// Drops expired terminal records.
    pub fn prune_expired(&self) -> usize {
        self.registry.prune_expired()
    }

    /// Prunes expired records every `interval` until `cancel` fires.
    pub fn spawn_pruner(
        self: &Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let Some(coordinator) = weak.upgrade() else {
                    break;
                };
                coordinator.prune_expired();
            }
            debug!("Record pruner stopped");
        })
    }

    async fn execute(
        &self,
        asset_id: AssetId,
        direction: TradeDirection,
    ) -> Result<ExecutionRecord, AdmissionError> {
        let intent = TradeIntent::new(asset_id, direction, self.settings.get());
        let record = match self.registry.claim(&intent) {
            Ok(record) => record,
            Err(e) => {
                warn!(asset = %intent.asset_id, direction = %direction, "Execution already in flight, ignoring request");
                self.events.publish(TradeEvent::new(
                    TradeEventType::DuplicateRejected,
                    intent.asset_id.clone(),
                    EventData::Rejected { direction },
                ));
                return Err(e);
            }
        };

        info!(
            asset = %intent.asset_id,
            direction = %direction,
            intent = %intent.id,
            attempts = record.attempts,
            "Execution admitted"
        );
        self.events.publish(TradeEvent::from_record(&record));

        let Some(this) = self.this.upgrade() else {
            return Ok(self.abandon(&intent, "coordinator shutting down"));
        };
        let task = {
            let intent = intent.clone();
            tokio::spawn(async move { this.run(&intent).await })
        };
        match task.await {
            Ok(record) => Ok(record),
            Err(e) => {
                error!(asset = %intent.asset_id, error = %e, "Execution task ended abnormally");
                Ok(self.abandon(&intent, "execution aborted"))
            }
        }
    }

    /// Drives an admitted intent to a terminal state.
    async fn run(&self, intent: &TradeIntent) -> ExecutionRecord {
        let mut guard = Unfinished {
            coordinator: self,
            intent,
            armed: true,
        };
        let outcome = self.drive(intent).await;
        guard.armed = false;

        let finished = match &outcome {
            Ok(tx) => self.update(intent, |r| r.confirm(tx.to_string())),
            Err(e) => self.update(intent, |r| r.terminate(e)),
        };
        let record = match finished {
            Ok(record) => record,
            Err(e) => {
                // Only reachable if the state machine itself is broken.
                error!(asset = %intent.asset_id, error = %e, "Could not record outcome");
                self.abandon(intent, &e.to_string())
            }
        };

        match &outcome {
            Ok(tx) => info!(
                asset = %intent.asset_id,
                direction = %intent.direction,
                transaction = %tx,
                "Execution confirmed"
            ),
            Err(e) if e.is_skip() => warn!(
                asset = %intent.asset_id,
                direction = %intent.direction,
                reason = %e,
                "Execution skipped"
            ),
            Err(e) => error!(
                asset = %intent.asset_id,
                direction = %intent.direction,
                error = %e,
                "Execution failed"
            ),
        }

        if outcome.is_ok() {
            self.schedule_exit(intent);
        }
        record
    }

    async fn drive(&self, intent: &TradeIntent) -> Result<TransactionId, TradeError> {
        let settings = &intent.settings;
        let base = &self.config.base_asset;

        self.advance(intent, ExecutionState::Quoting)?;
        if intent.asset_id == *base {
            return Err(TradeError::NotTradable(format!(
                "{} is the base asset",
                intent.asset_id
            )));
        }
        let request = match intent.direction {
            TradeDirection::Acquire => QuoteRequest {
                input: base.clone(),
                output: intent.asset_id.clone(),
                amount: settings.buy_amount_lamports().ok_or_else(|| {
                    TradeError::Internal(format!(
                        "buy amount {} does not fit in lamports",
                        settings.buy_amount
                    ))
                })?,
                slippage_bps: settings.slippage_pct.to_bps(),
            },
            TradeDirection::Dispose => {
                let held = self
                    .bounded(
                        "holdings",
                        self.capabilities.holdings.balance(&intent.asset_id),
                    )
                    .await?
                    .map_err(|e| TradeError::Holdings(e.to_string()))?;
                if held == 0 {
                    return Err(TradeError::EmptyHolding);
                }
                QuoteRequest {
                    input: intent.asset_id.clone(),
                    output: base.clone(),
                    amount: held,
                    slippage_bps: settings.slippage_pct.to_bps(),
                }
            }
        };
        debug!(
            asset = %intent.asset_id,
            amount = request.amount,
            slippage_bps = request.slippage_bps,
            "Quoting"
        );
        let unsigned = self
            .bounded("quote", self.capabilities.venue.quote(&request))
            .await?
            .map_err(|e| match e {
                SwapError::NotTradable(reason) => TradeError::NotTradable(reason),
                SwapError::Other(reason) => TradeError::Venue(reason),
            })?;

        self.advance(intent, ExecutionState::Signing)?;
        let signed = self
            .bounded("sign", self.capabilities.signer.sign(unsigned))
            .await?
            .map_err(|e| TradeError::Signing(e.to_string()))?;

        self.advance(intent, ExecutionState::Broadcasting)?;
        self.bounded("broadcast", self.capabilities.broadcaster.submit(&signed))
            .await?
            .map_err(|e| TradeError::Broadcast(e.to_string()))
    }

    /// Fails the intent's record with an internal error unless it already
    /// ended, and returns the record as it now stands.
    fn abandon(&self, intent: &TradeIntent, reason: &str) -> ExecutionRecord {
        let internal = TradeError::Internal(reason.to_string());
        if let Ok(record) = self.update(intent, |r| r.terminate(&internal)) {
            warn!(asset = %intent.asset_id, reason, "Execution abandoned");
            return record;
        }
        self.registry
            .get(&intent.asset_id)
            .filter(|record| record.intent_id == intent.id)
            .unwrap_or_else(|| {
                let mut record = ExecutionRecord::new(intent, 0);
                record.state = ExecutionState::Failed;
                record.last_error = Some(internal.to_string());
                record
            })
    }

    /// Arms the automatic sell after a confirmed acquisition, using the
    /// settings captured at admission.
    fn schedule_exit(&self, intent: &TradeIntent) {
        if intent.direction != TradeDirection::Acquire || !intent.settings.auto_sell_enabled {
            return;
        }
        if let Err(e) = self
            .exits
            .arm(intent.asset_id.clone(), intent.settings.sell_after_seconds)
        {
            warn!(asset = %intent.asset_id, error = %e, "Auto-sell not armed");
        }
    }

    /// Awaits `call` for at most the configured call timeout.
    async fn bounded<T>(
        &self,
        stage: &'static str,
        call: impl Future<Output = T>,
    ) -> Result<T, TradeError> {
        tokio::time::timeout(self.config.call_timeout, call)
            .await
            .map_err(|_| TradeError::Timeout {
                stage,
                secs: self.config.call_timeout.as_secs(),
            })
    }

    fn advance(&self, intent: &TradeIntent, next: ExecutionState) -> Result<(), TradeError> {
        self.update(intent, |r| r.advance(next))
            .map(|_| ())
            .map_err(|e| TradeError::Internal(e.to_string()))
    }

    fn update<F>(&self, intent: &TradeIntent, update: F) -> Result<ExecutionRecord, RegistryError>
    where
        F: FnOnce(&mut ExecutionRecord) -> Result<(), sniper_domain::TransitionError>,
    {
        let record = self.registry.update(&intent.asset_id, intent.id, update)?;
        debug!(asset = %record.asset_id, state = %record.state, "Execution state changed");
        self.events.publish(TradeEvent::from_record(&record));
        Ok(record)
    }
}

/// Fails the record if `run` is unwound or cancelled before it records an
/// outcome.
struct Unfinished<'a> {
    coordinator: &'a ExecutionCoordinator,
    intent: &'a TradeIntent,
    armed: bool,
}

impl Drop for Unfinished<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let reason = if std::thread::panicking() {
            "execution panicked"
        } else {
            "execution aborted"
        };
        self.coordinator.abandon(self.intent, reason);
    }
}

#[async_trait]
impl DisposeTarget for ExecutionCoordinator {
    async fn dispose(&self, asset_id: AssetId) -> Result<ExecutionRecord, AdmissionError> {
        ExecutionCoordinator::dispose(self, asset_id).await
    }
}
