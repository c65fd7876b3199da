//! Capability interfaces consumed by the execution engine.
//!
//! All of them are treated as stateless, reentrant services: implementations
//! must be safe to call from many executions at once.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sniper_domain::AssetId;
use std::fmt;
use thiserror::Error;

/// Parameters for a swap quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    /// Asset being sold.
    pub input: AssetId,
    /// Asset being bought.
    pub output: AssetId,
    /// Raw amount of `input`.
    pub amount: u64,
    /// Slippage tolerance in basis points.
    pub slippage_bps: u16,
}

/// Serialized transaction as returned by the venue, not yet signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction(pub Vec<u8>);

/// Serialized, fully signed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction(pub Vec<u8>);

/// Identifier of a submitted transaction (a signature on Solana).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionId(pub String);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Venue failure, classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwapError {
    /// The venue cannot route the asset at all.
    #[error("not tradable: {0}")]
    NotTradable(String),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SignerError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct BroadcastError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HoldingsError(pub String);

/// Quotes a swap and builds the unsigned transaction for it.
#[async_trait]
pub trait SwapVenue: Send + Sync {
    async fn quote(&self, request: &QuoteRequest) -> Result<UnsignedTransaction, SwapError>;
}

/// Signs a venue-built transaction.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn sign(&self, tx: UnsignedTransaction) -> Result<SignedTransaction, SignerError>;
}

/// Submits a signed transaction to the network.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn submit(&self, tx: &SignedTransaction) -> Result<TransactionId, BroadcastError>;
}

/// Reports how much of an asset the trading wallet holds.
#[async_trait]
pub trait HoldingsSource: Send + Sync {
    /// Raw balance of `asset`; zero if the wallet has no account for it.
    async fn balance(&self, asset: &AssetId) -> Result<u64, HoldingsError>;
}

/// A text event from the signal source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub text: String,
    /// Channel or chat the message came from, if known.
    pub source: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: None,
            received_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Stream of inbound text events.
#[async_trait]
pub trait MessageFeed: Send {
    /// Next message, `None` once the feed is closed.
    async fn next_message(&mut self) -> Option<InboundMessage>;
}
