pub mod amount;
pub mod asset_id;
pub mod percentage;
pub mod settings;

pub use amount::Amount;
pub use asset_id::{AssetId, WSOL_MINT};
pub use percentage::Percentage;
pub use settings::{SettingKey, Settings};
