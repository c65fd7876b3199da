//! Hot-reloadable settings store.

use crate::{SettingsError, SettingsRepository};
use arc_swap::ArcSwap;
use sniper_domain::{SettingKey, Settings};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Process-wide settings with snapshot reads.
///
/// Readers load the current `Arc<Settings>` without locking. Writers are
/// serialised and go through validate, persist, publish in that order, so a
/// failed validation or a failed write never changes what readers see.
pub struct SettingsStore {
    /// Published snapshot.
    current: ArcSwap<Settings>,
    /// Backing storage.
    repository: Arc<dyn SettingsRepository>,
    /// Serialises writers and reloads. Holds the last seen modification time.
    write_lock: Mutex<Option<SystemTime>>,
}

impl SettingsStore {
    /// Opens the store, persisting defaults if nothing is stored yet.
    ///
    /// # Errors
    /// Fails if the stored settings cannot be read or are invalid, or if the
    /// defaults cannot be written.
    pub async fn open(repository: Arc<dyn SettingsRepository>) -> Result<Self, SettingsError> {
        let settings = match repository.load().await? {
            Some(settings) => {
                info!("Loaded persisted settings");
                settings
            }
            None => {
                let defaults = Settings::default();
                repository.save(&defaults).await?;
                info!("No persisted settings found, wrote defaults");
                defaults
            }
        };
        let modified = repository.modified().await;

        Ok(Self {
            current: ArcSwap::from_pointee(settings),
            repository,
            write_lock: Mutex::new(modified),
        })
    }

    /// Current snapshot.
    pub fn get(&self) -> Settings {
        **self.current.load()
    }

    /// Renders a single value.
    pub fn get_value(&self, key: SettingKey) -> String {
        self.get().value_of(key)
    }

    /// Sets `key` (any accepted spelling) to the parsed `value`.
    ///
    /// # Errors
    /// Unknown key, unparsable value, violated bound, or persistence
    /// failure. The store is unchanged in every error case.
    pub async fn set(&self, key: &str, value: &str) -> Result<Settings, SettingsError> {
        let key: SettingKey = key.parse()?;
        self.set_key(key, value).await
    }

    /// Typed variant of [`SettingsStore::set`].
    pub async fn set_key(&self, key: SettingKey, value: &str) -> Result<Settings, SettingsError> {
        let mut last_modified = self.write_lock.lock().await;

        let next = match self.get().with_value(key, value) {
            Ok(next) => next,
            Err(e) => {
                warn!(key = %key, value = %value, error = %e, "Rejected settings update");
                return Err(e.into());
            }
        };
        self.repository.save(&next).await?;
        self.current.store(Arc::new(next));
        *last_modified = self.repository.modified().await;

        info!(key = %key, value = %next.value_of(key), "Setting updated");
        Ok(next)
    }

    /// Re-reads the repository and publishes its contents if they validate.
    ///
    /// Returns `true` if the published snapshot changed.
    ///
    /// # Errors
    /// Fails if the stored settings cannot be read or are invalid; the
    /// current snapshot is kept in that case.
    pub async fn reload(&self) -> Result<bool, SettingsError> {
        let mut last_modified = self.write_lock.lock().await;
        self.reload_locked(&mut last_modified).await
    }

    async fn reload_locked(
        &self,
        last_modified: &mut Option<SystemTime>,
    ) -> Result<bool, SettingsError> {
        let Some(loaded) = self.repository.load().await? else {
            return Ok(false);
        };
        *last_modified = self.repository.modified().await;

        if loaded == self.get() {
            return Ok(false);
        }
        self.current.store(Arc::new(loaded));
        info!(settings = ?loaded, "Settings reloaded");
        Ok(true)
    }

    /// Polls the repository every `interval` and reloads when its modification
    /// time moves. Stops when `cancel` fires.
    pub fn spawn_reload_watcher(
        self: Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let modified = self.repository.modified().await;
                let mut last_modified = self.write_lock.lock().await;
                if modified.is_none() || modified == *last_modified {
                    continue;
                }
                debug!("Settings file changed on disk");
                if let Err(e) = self.reload_locked(&mut last_modified).await {
                    // Remember the bad version so it is not retried every tick.
                    *last_modified = modified;
                    warn!(error = %e, "Ignoring invalid settings file");
                }
            }
            debug!("Settings watcher stopped");
        })
    }
}
