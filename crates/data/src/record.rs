//! On-disk shape of the settings.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use sniper_domain::{Percentage, SettingError, SettingKey, Settings, ValidationError};
use std::str::FromStr;

/// Flat key/value record as stored in `config.json`.
///
/// Every field is optional so that older files with missing keys still load;
/// gaps are filled from [`Settings::default`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsRecord {
    #[serde(rename = "BUY_AMOUNT_SOL", default, skip_serializing_if = "Option::is_none")]
    pub buy_amount_sol: Option<Number>,
    #[serde(rename = "SLIPPAGE_PCT", default, skip_serializing_if = "Option::is_none")]
    pub slippage_pct: Option<Number>,
    #[serde(rename = "STOP_LOSS_PCT", default, skip_serializing_if = "Option::is_none")]
    pub stop_loss_pct: Option<Number>,
    #[serde(rename = "AUTO_SELL_ENABLED", default, skip_serializing_if = "Option::is_none")]
    pub auto_sell_enabled: Option<bool>,
    #[serde(rename = "SELL_AFTER_SECONDS", default, skip_serializing_if = "Option::is_none")]
    pub sell_after_seconds: Option<Number>,
}

impl SettingsRecord {
    /// Converts into validated settings.
    ///
    /// # Errors
    /// Fails if a value is not representable or breaks a bound.
    pub fn into_settings(self) -> Result<Settings, SettingError> {
        let defaults = Settings::default();

        let buy_amount = match self.buy_amount_sol {
            Some(n) => to_decimal(SettingKey::BuyAmount, &n)?,
            None => defaults.buy_amount,
        };
        let slippage_pct = match self.slippage_pct {
            Some(n) => Percentage::new(to_decimal(SettingKey::SlippagePct, &n)?),
            None => defaults.slippage_pct,
        };
        let stop_loss_pct = match self.stop_loss_pct {
            Some(n) => Percentage::new(to_decimal(SettingKey::StopLossPct, &n)?),
            None => defaults.stop_loss_pct,
        };
        let sell_after_seconds = match self.sell_after_seconds {
            Some(n) => {
                let key = SettingKey::SellAfterSeconds;
                let value = to_decimal(key, &n)?;
                if value < Decimal::ZERO {
                    return Err(ValidationError::Negative { key, value }.into());
                }
                // Older files may hold whole seconds written as floats (180.0).
                if !value.fract().is_zero() {
                    return Err(invalid(key, &n));
                }
                value.to_u64().ok_or_else(|| invalid(key, &n))?
            }
            None => defaults.sell_after_seconds,
        };

        let settings = Settings {
            buy_amount,
            slippage_pct,
            stop_loss_pct,
            auto_sell_enabled: self.auto_sell_enabled.unwrap_or(defaults.auto_sell_enabled),
            sell_after_seconds,
        };
        settings.validate()?;
        Ok(settings)
    }
}

impl From<&Settings> for SettingsRecord {
    fn from(settings: &Settings) -> Self {
        Self {
            buy_amount_sol: to_number(settings.buy_amount),
            slippage_pct: to_number(settings.slippage_pct.0),
            stop_loss_pct: to_number(settings.stop_loss_pct.0),
            auto_sell_enabled: Some(settings.auto_sell_enabled),
            sell_after_seconds: Some(Number::from(settings.sell_after_seconds)),
        }
    }
}

fn invalid(key: SettingKey, n: &Number) -> SettingError {
    SettingError::InvalidValue {
        key,
        value: n.to_string(),
    }
}

fn to_decimal(key: SettingKey, n: &Number) -> Result<Decimal, SettingError> {
    Decimal::from_str(&n.to_string())
        .or_else(|_| Decimal::from_scientific(&n.to_string()))
        .map_err(|_| invalid(key, n))
}

fn to_number(value: Decimal) -> Option<Number> {
    if value.fract().is_zero()
        && let Some(whole) = value.to_i64()
    {
        return Some(Number::from(whole));
    }
    value.to_f64().and_then(Number::from_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_file_layout() {
        let record = SettingsRecord::from(&Settings::default());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "BUY_AMOUNT_SOL": 0.05,
                "SLIPPAGE_PCT": 10,
                "STOP_LOSS_PCT": 30,
                "AUTO_SELL_ENABLED": true,
                "SELL_AFTER_SECONDS": 180
            })
        );
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let record: SettingsRecord =
            serde_json::from_str(r#"{"BUY_AMOUNT_SOL": 0.2}"#).unwrap();
        let settings = record.into_settings().unwrap();
        assert_eq!(settings.buy_amount, dec!(0.2));
        assert_eq!(settings.sell_after_seconds, 180);
    }

    #[test]
    fn test_float_seconds_are_accepted() {
        let record: SettingsRecord =
            serde_json::from_str(r#"{"SELL_AFTER_SECONDS": 60.0, "SLIPPAGE_PCT": 12.5}"#).unwrap();
        let settings = record.into_settings().unwrap();
        assert_eq!(settings.sell_after_seconds, 60);
        assert_eq!(settings.slippage_pct.to_bps(), 1250);
    }

    #[test]
    fn test_out_of_bounds_file_is_rejected() {
        let record: SettingsRecord =
            serde_json::from_str(r#"{"STOP_LOSS_PCT": 120}"#).unwrap();
        assert!(matches!(
            record.into_settings(),
            Err(SettingError::Validation(ValidationError::PercentOutOfRange { .. }))
        ));
    }
}
