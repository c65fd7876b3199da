//! JSON file repository.

use super::SettingsRepository;
use crate::{SettingsError, SettingsRecord};
use async_trait::async_trait;
use sniper_domain::Settings;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Stores settings as a pretty-printed JSON object.
#[derive(Debug, Clone)]
pub struct JsonSettingsRepository {
    path: PathBuf,
}

impl JsonSettingsRepository {
    /// Creates a repository backed by `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the settings file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SettingsRepository for JsonSettingsRepository {
    async fn load(&self) -> Result<Option<Settings>, SettingsError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: SettingsRecord = serde_json::from_slice(&bytes)?;
        Ok(Some(record.into_settings()?))
    }

    async fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let json = serde_json::to_vec_pretty(&SettingsRecord::from(settings))?;
        let temp = self.temp_path();

        // Write the sibling file first so readers never see a torn file.
        tokio::fs::write(&temp, &json).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        debug!(path = %self.path.display(), "Settings persisted");
        Ok(())
    }

    async fn modified(&self) -> Option<SystemTime> {
        tokio::fs::metadata(&self.path)
            .await
            .and_then(|m| m.modified())
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonSettingsRepository::new(dir.path().join("config.json"));
        assert!(repo.load().await.unwrap().is_none());
        assert!(repo.modified().await.is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonSettingsRepository::new(dir.path().join("config.json"));

        let settings = Settings {
            buy_amount: dec!(0.5),
            ..Settings::default()
        };
        repo.save(&settings).await.unwrap();

        assert_eq!(repo.load().await.unwrap(), Some(settings));
        assert!(!repo.temp_path().exists());
        assert!(repo.modified().await.is_some());
    }

    #[tokio::test]
    async fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let repo = JsonSettingsRepository::new(&path);
        assert!(matches!(repo.load().await, Err(SettingsError::Serde(_))));
    }
}
