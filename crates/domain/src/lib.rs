//! Core domain types for the signal sniper.
//!
//! Holds the operator settings, trade intents and execution records shared
//! by every other crate in the workspace, plus the error taxonomy used to
//! classify trade outcomes.

/// Trade entities.
pub mod entities;
/// Domain enums.
pub mod enums;
/// Error taxonomy.
pub mod errors;
/// Value objects.
pub mod value_objects;

pub use entities::{ExecutionRecord, TradeIntent};
pub use enums::{ExecutionState, TradeDirection};
pub use errors::{AdmissionError, SettingError, TradeError, TransitionError, ValidationError};
pub use value_objects::{Amount, AssetId, Percentage, SettingKey, Settings, WSOL_MINT};
