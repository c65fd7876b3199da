//! Operator control surface.
//!
//! A thin facade that forwards settings reads and writes to the settings
//! store and manual trade requests to the coordinator. Whatever drives it
//! (a chat bot, a terminal, an HTTP handler) only needs this type.

use crate::coordinator::ExecutionCoordinator;
use crate::scheduler::{ScheduleError, ScheduledExit};
use sniper_data::SettingsError;
use sniper_domain::{AdmissionError, AssetId, ExecutionRecord, SettingKey, Settings};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct ControlSurface {
    coordinator: Arc<ExecutionCoordinator>,
}

impl ControlSurface {
    pub fn new(coordinator: Arc<ExecutionCoordinator>) -> Self {
        Self { coordinator }
    }

    /// Current value of `key` (any accepted spelling), rendered as text.
    ///
    /// # Errors
    /// Unknown key.
    pub fn get_setting(&self, key: &str) -> Result<String, SettingsError> {
        let key: SettingKey = key.parse()?;
        Ok(self.coordinator.settings().get_value(key))
    }

    /// Validates, persists and publishes a new value for `key`.
    ///
    /// # Errors
    /// Unknown key, unparsable value, violated bound, or persistence
    /// failure. Settings are unchanged on error.
    pub async fn set_setting(&self, key: &str, value: &str) -> Result<Settings, SettingsError> {
        self.coordinator.settings().set(key, value).await
    }

    pub fn settings(&self) -> Settings {
        self.coordinator.settings().get()
    }

    /// Buys `asset_id` now, as if a signal had named it.
    ///
    /// # Errors
    /// `DuplicateInFlight` if the asset already has a live execution.
    pub async fn manual_trigger(&self, asset_id: AssetId) -> Result<ExecutionRecord, AdmissionError> {
        info!(asset = %asset_id, "Manual buy requested");
        self.coordinator.acquire(asset_id).await
    }

    /// Sells the whole holding of `asset_id` now. A pending automatic sell
    /// for the asset is cancelled first so it cannot fire afterwards.
    ///
    /// # Errors
    /// `DuplicateInFlight` if the asset already has a live execution.
    pub async fn manual_dispose(&self, asset_id: AssetId) -> Result<ExecutionRecord, AdmissionError> {
        info!(asset = %asset_id, "Manual sell requested");
        let _ = self.coordinator.exits().cancel(&asset_id);
        self.coordinator.dispose(asset_id).await
    }

    /// Cancels the pending automatic sell for `asset_id`.
    ///
    /// # Errors
    /// `NotArmed` if none is pending.
    pub fn cancel_exit(&self, asset_id: &AssetId) -> Result<ScheduledExit, ScheduleError> {
        self.coordinator.exits().cancel(asset_id)
    }

    pub fn pending_exit(&self, asset_id: &AssetId) -> Option<ScheduledExit> {
        self.coordinator.exits().armed(asset_id)
    }

    pub fn status(&self, asset_id: &AssetId) -> Option<ExecutionRecord> {
        self.coordinator.status(asset_id)
    }

    pub fn in_flight(&self) -> Vec<ExecutionRecord> {
        self.coordinator.in_flight()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{BONK, Harness};
    use rust_decimal_macros::dec;
    use sniper_domain::{ExecutionState, SettingError, TradeDirection, ValidationError};
    use std::time::Duration;

    #[tokio::test]
    async fn test_settings_round_trip() {
        let h = Harness::new().await;
        let control = ControlSurface::new(h.coordinator.clone());

        assert_eq!(control.get_setting("buyAmount").unwrap(), "0.05");
        control.set_setting("buyAmount", "0.1").await.unwrap();
        assert_eq!(control.settings().buy_amount, dec!(0.1));
        assert_eq!(control.get_setting("BUY_AMOUNT_SOL").unwrap(), "0.1");
    }

    #[tokio::test]
    async fn test_invalid_setting_reports_bound() {
        let h = Harness::new().await;
        let control = ControlSurface::new(h.coordinator.clone());

        let err = control.set_setting("slippagePct", "150").await.unwrap_err();
        assert!(matches!(
            err.validation(),
            Some(ValidationError::PercentOutOfRange { .. })
        ));
        assert!(matches!(
            control.get_setting("takeProfit"),
            Err(SettingsError::Setting(SettingError::UnknownKey(_)))
        ));
        assert_eq!(control.settings(), Settings::default());
    }

    #[tokio::test]
    async fn test_manual_trigger_and_status() {
        let h = Harness::new().await;
        let control = ControlSurface::new(h.coordinator.clone());

        let record = control.manual_trigger(AssetId::new(BONK)).await.unwrap();
        assert_eq!(record.state, ExecutionState::Confirmed);
        assert_eq!(control.status(&AssetId::new(BONK)), Some(record));
        assert!(control.pending_exit(&AssetId::new(BONK)).is_some());

        let cancelled = control.cancel_exit(&AssetId::new(BONK)).unwrap();
        assert!(cancelled.cancelled);
        assert_eq!(
            control.cancel_exit(&AssetId::new(BONK)),
            Err(ScheduleError::NotArmed(AssetId::new(BONK)))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_dispose_disarms_auto_sell() {
        let h = Harness::new().await;
        h.holdings.set(AssetId::new(BONK), 500);
        let control = ControlSurface::new(h.coordinator.clone());

        control.manual_trigger(AssetId::new(BONK)).await.unwrap();
        let record = control.manual_dispose(AssetId::new(BONK)).await.unwrap();
        assert_eq!(record.direction, TradeDirection::Dispose);
        assert_eq!(record.state, ExecutionState::Confirmed);
        assert!(control.pending_exit(&AssetId::new(BONK)).is_none());

        tokio::time::sleep(Duration::from_secs(400)).await;
        assert_eq!(h.venue.requests().len(), 2);
    }
}
