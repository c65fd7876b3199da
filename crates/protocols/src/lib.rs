//! Capabilities the execution engine depends on, and their Solana
//! implementations.
//!
//! The engine only sees the traits in [`capabilities`]; the adapters here
//! wire them to Jupiter for routing and to a Solana RPC node for signing
//! inputs, broadcasting and balance lookups.

/// Capability traits and payload types.
pub mod capabilities;
/// Jupiter swap API adapter.
pub mod jupiter;
/// Prelude module for convenient imports.
pub mod prelude;
/// RPC provider shared by the Solana adapters.
pub mod rpc;
/// Solana signer, broadcaster and holdings adapters.
pub mod solana;

pub use capabilities::*;
