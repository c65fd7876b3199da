//! In-memory capabilities and a wired coordinator for tests.

use crate::coordinator::{Capabilities, CoordinatorConfig, ExecutionCoordinator};
use async_trait::async_trait;
use sniper_data::{InMemorySettingsRepository, SettingsStore};
use sniper_domain::{AssetId, ExecutionRecord, ExecutionState, Settings, TradeDirection};
use sniper_protocols::{
    BroadcastError, Broadcaster, HoldingsError, HoldingsSource, QuoteRequest, SignedTransaction,
    SignerError, SwapError, SwapVenue, TransactionId, TransactionSigner, UnsignedTransaction,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

pub(crate) const BONK: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";
pub(crate) const JUP: &str = "JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN";
pub(crate) const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

/// Venue that records every request and can be held or told to fail.
#[derive(Default)]
pub(crate) struct FakeVenue {
    requests: Mutex<Vec<QuoteRequest>>,
    failures: Mutex<VecDeque<SwapError>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    panic_next: AtomicBool,
}

impl FakeVenue {
    /// Quotes block until [`FakeVenue::open`].
    pub(crate) fn hold(&self) {
        *self.gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    pub(crate) fn open(&self) {
        if let Some(gate) = self.gate.lock().unwrap().take() {
            gate.close();
        }
    }

    pub(crate) fn fail_next(&self, error: SwapError) {
        self.failures.lock().unwrap().push_back(error);
    }

    /// The next quote panics instead of returning.
    pub(crate) fn panic_next(&self) {
        self.panic_next.store(true, Ordering::SeqCst);
    }

    pub(crate) fn requests(&self) -> Vec<QuoteRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SwapVenue for FakeVenue {
    async fn quote(&self, request: &QuoteRequest) -> Result<UnsignedTransaction, SwapError> {
        let n = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            // Resolves once the gate is closed.
            let _ = gate.acquire().await;
        }
        if self.panic_next.swap(false, Ordering::SeqCst) {
            panic!("venue blew up");
        }
        match self.failures.lock().unwrap().pop_front() {
            Some(error) => Err(error),
            None => Ok(UnsignedTransaction(vec![n as u8])),
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeSigner {
    calls: AtomicUsize,
    failures: Mutex<VecDeque<String>>,
    hang: AtomicBool,
}

impl FakeSigner {
    /// Every later call never returns.
    pub(crate) fn hang(&self) {
        self.hang.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_next(&self, reason: &str) {
        self.failures.lock().unwrap().push_back(reason.to_string());
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransactionSigner for FakeSigner {
    async fn sign(&self, tx: UnsignedTransaction) -> Result<SignedTransaction, SignerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        match self.failures.lock().unwrap().pop_front() {
            Some(reason) => Err(SignerError(reason)),
            None => Ok(SignedTransaction(tx.0)),
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeBroadcaster {
    calls: AtomicUsize,
    failures: Mutex<VecDeque<String>>,
    hang: AtomicBool,
}

impl FakeBroadcaster {
    pub(crate) fn hang(&self) {
        self.hang.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_next(&self, reason: &str) {
        self.failures.lock().unwrap().push_back(reason.to_string());
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Broadcaster for FakeBroadcaster {
    async fn submit(&self, _tx: &SignedTransaction) -> Result<TransactionId, BroadcastError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        match self.failures.lock().unwrap().pop_front() {
            Some(reason) => Err(BroadcastError(reason)),
            None => Ok(TransactionId(format!("sig-{n}"))),
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeHoldings {
    balances: Mutex<HashMap<AssetId, u64>>,
    failures: Mutex<VecDeque<String>>,
    hang: AtomicBool,
}

impl FakeHoldings {
    pub(crate) fn set(&self, asset_id: AssetId, amount: u64) {
        self.balances.lock().unwrap().insert(asset_id, amount);
    }

    pub(crate) fn fail_next(&self, reason: &str) {
        self.failures.lock().unwrap().push_back(reason.to_string());
    }

    pub(crate) fn hang(&self) {
        self.hang.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl HoldingsSource for FakeHoldings {
    async fn balance(&self, asset_id: &AssetId) -> Result<u64, HoldingsError> {
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if let Some(reason) = self.failures.lock().unwrap().pop_front() {
            return Err(HoldingsError(reason));
        }
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(asset_id)
            .copied()
            .unwrap_or(0))
    }
}

/// A coordinator over fakes, with handles to each fake.
pub(crate) struct Harness {
    pub coordinator: Arc<ExecutionCoordinator>,
    pub store: Arc<SettingsStore>,
    pub venue: Arc<FakeVenue>,
    pub signer: Arc<FakeSigner>,
    pub broadcaster: Arc<FakeBroadcaster>,
    pub holdings: Arc<FakeHoldings>,
}

impl Harness {
    /// Default settings: auto-sell on, 180 seconds.
    pub(crate) async fn new() -> Self {
        Self::with_settings(Settings::default()).await
    }

    pub(crate) async fn with_auto_sell(enabled: bool) -> Self {
        Self::with_settings(Settings {
            auto_sell_enabled: enabled,
            ..Settings::default()
        })
        .await
    }

    pub(crate) async fn with_settings(settings: Settings) -> Self {
        let repository = Arc::new(InMemorySettingsRepository::with_settings(settings));
        let store = Arc::new(SettingsStore::open(repository).await.unwrap());
        let venue = Arc::new(FakeVenue::default());
        let signer = Arc::new(FakeSigner::default());
        let broadcaster = Arc::new(FakeBroadcaster::default());
        let holdings = Arc::new(FakeHoldings::default());

        let coordinator = ExecutionCoordinator::new(
            store.clone(),
            Capabilities {
                venue: venue.clone(),
                signer: signer.clone(),
                broadcaster: broadcaster.clone(),
                holdings: holdings.clone(),
            },
            CoordinatorConfig::default(),
        );

        Self {
            coordinator,
            store,
            venue,
            signer,
            broadcaster,
            holdings,
        }
    }

    pub(crate) async fn wait_for_state(&self, asset: &str, state: ExecutionState) -> ExecutionRecord {
        self.wait_until(asset, |r| r.state == state).await
    }

    pub(crate) async fn wait_for_direction(
        &self,
        asset: &str,
        direction: TradeDirection,
    ) -> ExecutionRecord {
        self.wait_until(asset, |r| r.direction == direction).await
    }

    pub(crate) async fn wait_for_terminal(&self, asset: &str) -> ExecutionRecord {
        self.wait_until(asset, ExecutionRecord::is_terminal).await
    }

    async fn wait_until<F>(&self, asset: &str, predicate: F) -> ExecutionRecord
    where
        F: Fn(&ExecutionRecord) -> bool,
    {
        let asset = AssetId::new(asset);
        for _ in 0..10_000 {
            if let Some(record) = self.coordinator.status(&asset)
                && predicate(&record)
            {
                return record;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition never met for {asset}");
    }
}
