use crate::enums::TradeDirection;
use crate::value_objects::{AssetId, Settings};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An admitted request to trade one asset.
///
/// The settings snapshot is copied in at admission and never refreshed, so
/// later settings changes cannot leak into a running execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeIntent {
    pub id: Uuid,
    pub asset_id: AssetId,
    pub direction: TradeDirection,
    pub detected_at: DateTime<Utc>,
    pub settings: Settings,
}

impl TradeIntent {
    pub fn new(asset_id: AssetId, direction: TradeDirection, settings: Settings) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset_id,
            direction,
            detected_at: Utc::now(),
            settings,
        }
    }
}
