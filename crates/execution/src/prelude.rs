//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use sniper_execution::prelude::*;
//! ```

// Control
pub use crate::control::ControlSurface;

// Coordinator
pub use crate::coordinator::{
    Capabilities, CoordinatorConfig, ExecutionCoordinator, ExecutionRegistry, RegistryError,
};

// Lifecycle
pub use crate::lifecycle::{
    DEFAULT_EVENT_CAPACITY, EventBus, EventData, ExecutionData, ExitData, TradeEvent,
    TradeEventType,
};

// Router
pub use crate::router::{SignalRouter, SignalTask};

// Scheduler
pub use crate::scheduler::{DisposeTarget, ScheduleError, ScheduledExit, ScheduledExitManager};
