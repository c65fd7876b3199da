use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A percentage expressed in percent points (`12.5` means 12.5%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(pub Decimal);

impl Percentage {
    pub fn new(pct: Decimal) -> Self {
        Self(pct)
    }

    pub fn from_bps(bps: u32) -> Self {
        Self(Decimal::from(bps) / Decimal::from(100))
    }

    /// Basis points, truncated. Out of range values saturate to 0.
    pub fn to_bps(&self) -> u16 {
        (self.0 * Decimal::from(100)).trunc().to_u16().unwrap_or(0)
    }

    pub fn is_within_unit_range(&self) -> bool {
        self.0 >= Decimal::ZERO && self.0 <= Decimal::ONE_HUNDRED
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_bps_conversion() {
        assert_eq!(Percentage::new(dec!(10)).to_bps(), 1000);
        assert_eq!(Percentage::new(dec!(0.5)).to_bps(), 50);
        assert_eq!(Percentage::from_bps(250).0, dec!(2.5));
    }

    #[test]
    fn test_unit_range() {
        assert!(Percentage::new(dec!(0)).is_within_unit_range());
        assert!(Percentage::new(dec!(100)).is_within_unit_range());
        assert!(!Percentage::new(dec!(150)).is_within_unit_range());
        assert!(!Percentage::new(dec!(-1)).is_within_unit_range());
    }
}
