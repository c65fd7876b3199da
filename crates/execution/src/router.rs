//! Routes inbound signal messages into acquisitions.

use crate::coordinator::ExecutionCoordinator;
use sniper_domain::{AdmissionError, AssetId, ExecutionRecord};
use sniper_protocols::{InboundMessage, MessageFeed};
use sniper_signal::SignalExtractor;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Handle to an acquisition started by a signal.
pub type SignalTask = JoinHandle<Result<ExecutionRecord, AdmissionError>>;

/// Extracts an asset from each message and starts an acquisition for it.
///
/// Each acquisition runs on its own task, so a slow trade never delays the
/// next message.
pub struct SignalRouter {
    extractor: SignalExtractor,
    coordinator: Arc<ExecutionCoordinator>,
}

impl SignalRouter {
    pub fn new(extractor: SignalExtractor, coordinator: Arc<ExecutionCoordinator>) -> Self {
        Self {
            extractor,
            coordinator,
        }
    }

    /// Starts an acquisition for the asset found in `text`, if any.
    pub fn handle_text(&self, text: &str) -> Option<(AssetId, SignalTask)> {
        let Some(asset_id) = self.extractor.extract(text) else {
            debug!(len = text.len(), "No asset in message");
            return None;
        };
        info!(asset = %asset_id, "Signal detected");

        let coordinator = self.coordinator.clone();
        let target = asset_id.clone();
        let task = tokio::spawn(async move { coordinator.acquire(target).await });
        Some((asset_id, task))
    }

    pub fn handle_message(&self, message: &InboundMessage) -> Option<(AssetId, SignalTask)> {
        if let Some(source) = &message.source {
            debug!(source = %source, "Message received");
        }
        self.handle_text(&message.text)
    }

    /// Consumes `feed` until it closes or `cancel` fires. Returns the number
    /// of acquisitions started.
    pub async fn run<F>(&self, feed: &mut F, cancel: CancellationToken) -> usize
    where
        F: MessageFeed + ?Sized,
    {
        let mut started = 0;
        loop {
            let message = tokio::select! {
                _ = cancel.cancelled() => break,
                message = feed.next_message() => message,
            };
            let Some(message) = message else {
                warn!("Signal feed closed");
                break;
            };
            if self.handle_message(&message).is_some() {
                started += 1;
            }
        }
        info!(started, "Signal router stopped");
        started
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{BONK, Harness, JUP};
    use async_trait::async_trait;
    use sniper_domain::ExecutionState;
    use std::collections::VecDeque;

    struct ScriptedFeed(VecDeque<&'static str>);

    #[async_trait]
    impl MessageFeed for ScriptedFeed {
        async fn next_message(&mut self) -> Option<InboundMessage> {
            self.0
                .pop_front()
                .map(|text| InboundMessage::new(text).with_source("test"))
        }
    }

    fn router(h: &Harness) -> SignalRouter {
        SignalRouter::new(SignalExtractor::default(), h.coordinator.clone())
    }

    #[tokio::test]
    async fn test_message_with_asset_acquires() {
        let h = Harness::with_auto_sell(false).await;
        let (asset, task) = router(&h)
            .handle_text(&format!("🚀 new call: {BONK} ape now"))
            .unwrap();
        assert_eq!(asset, AssetId::new(BONK));
        let record = task.await.unwrap().unwrap();
        assert_eq!(record.state, ExecutionState::Confirmed);
    }

    #[tokio::test]
    async fn test_message_without_asset_is_ignored() {
        let h = Harness::new().await;
        assert!(router(&h).handle_text("gm, nothing today").is_none());
        assert!(router(&h).handle_text("").is_none());
        assert!(h.venue.requests().is_empty());
    }

    #[tokio::test]
    async fn test_run_drains_feed() {
        let h = Harness::with_auto_sell(false).await;
        let mut feed = ScriptedFeed(VecDeque::from([
            "first: DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263",
            "chatter",
            "second: JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN",
        ]));
        let started = router(&h).run(&mut feed, CancellationToken::new()).await;
        assert_eq!(started, 2);

        h.wait_for_terminal(BONK).await;
        h.wait_for_terminal(JUP).await;
        assert_eq!(h.venue.requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_signal_is_a_noop_while_in_flight() {
        let h = Harness::with_auto_sell(false).await;
        h.venue.hold();
        let router = router(&h);

        let (_, first) = router.handle_text(BONK).unwrap();
        h.wait_for_state(BONK, ExecutionState::Quoting).await;
        let (_, second) = router.handle_text(BONK).unwrap();
        assert_eq!(
            second.await.unwrap(),
            Err(AdmissionError::DuplicateInFlight(AssetId::new(BONK)))
        );

        h.venue.open();
        assert_eq!(
            first.await.unwrap().unwrap().state,
            ExecutionState::Confirmed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_aborted_signal_task_does_not_lock_asset() {
        let h = Harness::with_auto_sell(false).await;
        h.venue.hold();
        let router = router(&h);

        let (_, task) = router.handle_text(BONK).unwrap();
        h.wait_for_state(BONK, ExecutionState::Quoting).await;
        task.abort();
        h.venue.open();

        let record = h.wait_for_terminal(BONK).await;
        assert_eq!(record.state, ExecutionState::Confirmed);
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        h.coordinator.prune_expired();

        let (_, again) = router.handle_text(BONK).unwrap();
        assert_eq!(again.await.unwrap().unwrap().state, ExecutionState::Confirmed);
    }
}
