//! Prelude module for convenient imports.
//!
//! ```rust
//! use sniper_protocols::prelude::*;
//! ```

pub use crate::capabilities::{
    BroadcastError, Broadcaster, HoldingsError, HoldingsSource, InboundMessage, MessageFeed,
    QuoteRequest, SignedTransaction, SignerError, SwapError, SwapVenue, TransactionId,
    TransactionSigner, UnsignedTransaction,
};
pub use crate::jupiter::{JupiterClient, JupiterConfig};
pub use crate::rpc::RpcProvider;
pub use crate::solana::{KeypairSigner, RpcBroadcaster, RpcHoldings};
