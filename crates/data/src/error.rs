use sniper_domain::{SettingError, ValidationError};
use thiserror::Error;

/// Errors raised by the settings store and its repositories.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Rejected update or invalid persisted value.
    #[error(transparent)]
    Setting(#[from] SettingError),
    #[error("settings file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings file: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<ValidationError> for SettingsError {
    fn from(err: ValidationError) -> Self {
        Self::Setting(SettingError::Validation(err))
    }
}

impl SettingsError {
    /// The violated bound, if this is a validation failure.
    #[must_use]
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Setting(SettingError::Validation(v)) => Some(v),
            _ => None,
        }
    }
}
