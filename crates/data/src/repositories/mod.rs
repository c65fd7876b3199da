//! Repository implementations for settings persistence.

mod json_repository;
mod memory_repository;

pub use json_repository::JsonSettingsRepository;
pub use memory_repository::InMemorySettingsRepository;

use crate::SettingsError;
use async_trait::async_trait;
use sniper_domain::Settings;
use std::time::SystemTime;

/// Durable storage for the settings record.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Loads the persisted settings, `None` if nothing has been stored yet.
    async fn load(&self) -> Result<Option<Settings>, SettingsError>;

    /// Replaces the persisted settings. Must be all-or-nothing.
    async fn save(&self, settings: &Settings) -> Result<(), SettingsError>;

    /// Last modification time of the backing storage, if it has one.
    async fn modified(&self) -> Option<SystemTime> {
        None
    }
}
