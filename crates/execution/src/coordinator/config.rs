use crate::lifecycle::DEFAULT_EVENT_CAPACITY;
use sniper_domain::AssetId;
use std::time::Duration;

/// Configuration for the execution coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Asset spent on Acquire and received on Dispose.
    pub base_asset: AssetId,
    /// Upper bound for each venue, holdings, signer and broadcaster call.
    pub call_timeout: Duration,
    /// How long terminal records stay visible to `status`.
    pub record_retention: Duration,
    /// Events buffered per subscriber.
    pub event_capacity: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            base_asset: AssetId::wrapped_sol(),
            call_timeout: Duration::from_secs(30),
            record_retention: Duration::from_secs(600),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}
