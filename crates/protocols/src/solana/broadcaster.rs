//! RPC transaction broadcaster.

use crate::capabilities::{BroadcastError, Broadcaster, SignedTransaction, TransactionId};
use crate::rpc::RpcProvider;
use async_trait::async_trait;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_commitment_config::CommitmentLevel;
use solana_sdk::transaction::VersionedTransaction;
use std::sync::Arc;
use tracing::{debug, info};

/// Sends signed transactions through an RPC node.
///
/// Preflight is skipped: swap transactions race other buyers and a failed
/// simulation costs more time than a failed landing.
pub struct RpcBroadcaster {
    provider: Arc<RpcProvider>,
    skip_preflight: bool,
}

impl RpcBroadcaster {
    pub fn new(provider: Arc<RpcProvider>) -> Self {
        Self {
            provider,
            skip_preflight: true,
        }
    }

    /// Enables preflight simulation.
    #[must_use]
    pub fn with_preflight(mut self) -> Self {
        self.skip_preflight = false;
        self
    }
}

#[async_trait]
impl Broadcaster for RpcBroadcaster {
    async fn submit(&self, tx: &SignedTransaction) -> Result<TransactionId, BroadcastError> {
        let transaction: VersionedTransaction = bincode::deserialize(&tx.0)
            .map_err(|e| BroadcastError(format!("undecodable transaction: {e}")))?;

        let config = RpcSendTransactionConfig {
            skip_preflight: self.skip_preflight,
            preflight_commitment: Some(CommitmentLevel::Processed),
            ..RpcSendTransactionConfig::default()
        };

        debug!(skip_preflight = self.skip_preflight, "Sending transaction...");
        let signature = self
            .provider
            .client()
            .send_transaction_with_config(&transaction, config)
            .await
            .map_err(|e| BroadcastError(e.to_string()))?;

        info!(signature = %signature, "Transaction submitted");
        Ok(TransactionId(signature.to_string()))
    }
}
