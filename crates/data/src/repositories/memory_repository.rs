//! In-memory repository, for tests and ephemeral runs.

use super::SettingsRepository;
use crate::SettingsError;
use async_trait::async_trait;
use sniper_domain::Settings;
use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Keeps the settings in memory only.
#[derive(Debug, Default)]
pub struct InMemorySettingsRepository {
    stored: Mutex<Option<Settings>>,
    fail_saves: AtomicBool,
}

impl InMemorySettingsRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `settings` already persisted.
    #[must_use]
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            stored: Mutex::new(Some(settings)),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent `save` fail.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Overwrites the stored value, bypassing validation, as an external
    /// editor would.
    pub fn overwrite(&self, settings: Settings) {
        if let Ok(mut stored) = self.stored.lock() {
            *stored = Some(settings);
        }
    }

    /// Currently stored value.
    pub fn stored(&self) -> Option<Settings> {
        self.stored.lock().ok().and_then(|s| *s)
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn load(&self) -> Result<Option<Settings>, SettingsError> {
        match self.stored() {
            Some(stored) => {
                stored.validate()?;
                Ok(Some(stored))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(io::Error::other("save disabled").into());
        }
        let mut stored = self
            .stored
            .lock()
            .map_err(|_| io::Error::other("settings lock poisoned"))?;
        *stored = Some(*settings);
        Ok(())
    }
}
