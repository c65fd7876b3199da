//! Settings persistence and the hot-reloadable settings store.
//!
//! Settings live in a flat JSON object on disk. The [`SettingsStore`] keeps
//! the current snapshot in memory, validates every update before committing
//! it, and can pick up edits made to the file while the process runs.

/// Error types.
pub mod error;
/// Persisted settings record.
pub mod record;
/// Repository implementations.
pub mod repositories;
/// The settings store.
pub mod store;

pub use error::SettingsError;
pub use record::SettingsRecord;
pub use repositories::{InMemorySettingsRepository, JsonSettingsRepository, SettingsRepository};
pub use store::SettingsStore;
