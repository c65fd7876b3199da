//! Operator-tunable execution settings.

use super::{Amount, Percentage};
use crate::errors::{SettingError, ValidationError};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key of a single setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettingKey {
    BuyAmount,
    SlippagePct,
    StopLossPct,
    AutoSellEnabled,
    SellAfterSeconds,
}

impl SettingKey {
    /// All keys, in display order.
    pub const ALL: [SettingKey; 5] = [
        Self::BuyAmount,
        Self::SlippagePct,
        Self::StopLossPct,
        Self::AutoSellEnabled,
        Self::SellAfterSeconds,
    ];

    /// Name used in the persisted settings file.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BuyAmount => "BUY_AMOUNT_SOL",
            Self::SlippagePct => "SLIPPAGE_PCT",
            Self::StopLossPct => "STOP_LOSS_PCT",
            Self::AutoSellEnabled => "AUTO_SELL_ENABLED",
            Self::SellAfterSeconds => "SELL_AFTER_SECONDS",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = SettingError;

    /// Accepts the persisted name, camelCase and snake_case, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "buyamount" | "buyamountsol" => Ok(Self::BuyAmount),
            "slippagepct" | "slippage" => Ok(Self::SlippagePct),
            "stoplosspct" | "stoploss" => Ok(Self::StopLossPct),
            "autosellenabled" | "autosell" => Ok(Self::AutoSellEnabled),
            "sellafterseconds" | "sellafter" => Ok(Self::SellAfterSeconds),
            _ => Err(SettingError::UnknownKey(s.trim().to_string())),
        }
    }
}

/// Immutable settings snapshot read by every execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Amount of base asset (SOL) spent per acquisition.
    pub buy_amount: Decimal,
    pub slippage_pct: Percentage,
    /// Stored for the operator; no price monitoring acts on it.
    pub stop_loss_pct: Percentage,
    pub auto_sell_enabled: bool,
    pub sell_after_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            buy_amount: Decimal::new(5, 2),
            slippage_pct: Percentage::new(Decimal::from(10)),
            stop_loss_pct: Percentage::new(Decimal::from(30)),
            auto_sell_enabled: true,
            sell_after_seconds: 180,
        }
    }
}

impl Settings {
    /// Checks every bound.
    ///
    /// # Errors
    /// Returns the first violated bound.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.buy_amount <= Decimal::ZERO {
            return Err(ValidationError::NotPositive {
                key: SettingKey::BuyAmount,
                value: self.buy_amount,
            });
        }
        if !matches!(self.buy_amount_lamports(), Some(lamports) if lamports > 0) {
            return Err(ValidationError::NotInLamports {
                key: SettingKey::BuyAmount,
                value: self.buy_amount,
            });
        }
        for (key, pct) in [
            (SettingKey::SlippagePct, self.slippage_pct),
            (SettingKey::StopLossPct, self.stop_loss_pct),
        ] {
            if !pct.is_within_unit_range() {
                return Err(ValidationError::PercentOutOfRange { key, value: pct.0 });
            }
        }
        Ok(())
    }

    /// Returns a copy with `key` set to the parsed `raw` value.
    ///
    /// The receiver is never modified; the copy is validated before it is
    /// returned.
    ///
    /// # Errors
    /// `InvalidValue` if `raw` does not parse for the key's type,
    /// `Validation` if the parsed value breaks a bound.
    pub fn with_value(&self, key: SettingKey, raw: &str) -> Result<Settings, SettingError> {
        let raw = raw.trim();
        let invalid = || SettingError::InvalidValue {
            key,
            value: raw.to_string(),
        };
        let mut next = *self;
        match key {
            SettingKey::BuyAmount => {
                next.buy_amount = Decimal::from_str(raw).map_err(|_| invalid())?;
            }
            SettingKey::SlippagePct => {
                next.slippage_pct = Percentage::new(Decimal::from_str(raw).map_err(|_| invalid())?);
            }
            SettingKey::StopLossPct => {
                next.stop_loss_pct =
                    Percentage::new(Decimal::from_str(raw).map_err(|_| invalid())?);
            }
            SettingKey::AutoSellEnabled => {
                next.auto_sell_enabled = match raw.to_lowercase().as_str() {
                    "true" | "on" | "yes" | "1" => true,
                    "false" | "off" | "no" | "0" => false,
                    _ => return Err(invalid()),
                };
            }
            SettingKey::SellAfterSeconds => {
                let value = Decimal::from_str(raw).map_err(|_| invalid())?;
                if value < Decimal::ZERO {
                    return Err(ValidationError::Negative { key, value }.into());
                }
                if !value.fract().is_zero() {
                    return Err(invalid());
                }
                next.sell_after_seconds = value.to_u64().ok_or_else(invalid)?;
            }
        }
        next.validate()?;
        Ok(next)
    }

    /// Renders a single value for display.
    #[must_use]
    pub fn value_of(&self, key: SettingKey) -> String {
        match key {
            SettingKey::BuyAmount => self.buy_amount.normalize().to_string(),
            SettingKey::SlippagePct => self.slippage_pct.to_string(),
            SettingKey::StopLossPct => self.stop_loss_pct.to_string(),
            SettingKey::AutoSellEnabled => self.auto_sell_enabled.to_string(),
            SettingKey::SellAfterSeconds => self.sell_after_seconds.to_string(),
        }
    }

    /// All `(key, value)` pairs in display order.
    #[must_use]
    pub fn entries(&self) -> Vec<(SettingKey, String)> {
        SettingKey::ALL
            .iter()
            .map(|key| (*key, self.value_of(*key)))
            .collect()
    }

    /// Buy amount in lamports, `None` if it does not fit.
    #[must_use]
    pub fn buy_amount_lamports(&self) -> Option<u64> {
        Amount::from_decimal(self.buy_amount, Amount::SOL_DECIMALS).map(|a| a.raw)
    }
}
