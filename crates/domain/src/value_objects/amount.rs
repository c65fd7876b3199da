use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Raw on-chain token amount together with its decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount {
    pub raw: u64,
    pub decimals: u8,
}

impl Amount {
    /// Decimals of native SOL (lamports).
    pub const SOL_DECIMALS: u8 = 9;

    pub fn new(raw: u64, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// Converts a UI amount into raw units, truncating extra precision.
    /// Returns `None` when the value is negative or does not fit in `u64`.
    pub fn from_decimal(d: Decimal, decimals: u8) -> Option<Self> {
        let multiplier = Decimal::from(10u64.checked_pow(decimals as u32)?);
        let raw = d.checked_mul(multiplier)?.trunc().to_u64()?;
        Some(Self { raw, decimals })
    }

    pub fn to_decimal(&self) -> Decimal {
        Decimal::from(self.raw) / Decimal::from(10u64.pow(self.decimals as u32))
    }

    pub fn is_zero(&self) -> bool {
        self.raw == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sol_to_lamports() {
        let amount = Amount::from_decimal(dec!(0.05), Amount::SOL_DECIMALS).unwrap();
        assert_eq!(amount.raw, 50_000_000);
        assert_eq!(amount.to_decimal(), dec!(0.05));
    }

    #[test]
    fn test_negative_is_rejected() {
        assert!(Amount::from_decimal(dec!(-1), 9).is_none());
    }
}
