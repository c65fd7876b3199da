//! Trade execution engine for the signal sniper.
//!
//! This crate turns detected signals and operator requests into swaps:
//! - Per-asset execution state machine with an atomic in-flight registry
//! - Scheduled automatic sells after a confirmed buy
//! - Lifecycle events for every admission, transition and exit
//! - Signal routing from a message feed
//! - Operator control surface

/// Prelude module for convenient imports.
pub mod prelude;

/// Operator control surface.
pub mod control;
/// Execution coordinator and in-flight registry.
pub mod coordinator;
/// Trade lifecycle events.
pub mod lifecycle;
/// Signal routing.
pub mod router;
/// Scheduled exits.
pub mod scheduler;

#[cfg(test)]
pub(crate) mod test_support;
