//! Thin wrapper around the nonblocking Solana RPC client.

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use std::time::Duration;

/// Default public mainnet endpoint.
pub const MAINNET_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// RPC provider shared by the Solana adapters.
pub struct RpcProvider {
    client: RpcClient,
}

impl RpcProvider {
    /// Creates a provider with `processed` commitment, matching how swap
    /// transactions are sent.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self::with_commitment(url, timeout, CommitmentConfig::processed())
    }

    pub fn with_commitment(
        url: impl Into<String>,
        timeout: Duration,
        commitment: CommitmentConfig,
    ) -> Self {
        Self {
            client: RpcClient::new_with_timeout_and_commitment(url.into(), timeout, commitment),
        }
    }

    /// Underlying client.
    pub fn client(&self) -> &RpcClient {
        &self.client
    }

    /// Endpoint URL.
    pub fn url(&self) -> String {
        self.client.url()
    }
}
