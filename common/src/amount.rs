//! Amounts: non-negative quantities of a specific asset.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::asset::Asset;
use crate::error::{Result, SystemError};

/// Convert a decimal quantity to its most compact human-readable form.
///
/// A value with a fractional part has its trailing zeros stripped
/// (`0.50` becomes `0.5`); the original value is returned when stripping
/// changes nothing. A zero-scale value is returned unchanged. Scaled
/// whole numbers (negative scales such as `2×10²`) cannot be represented
/// by [`Decimal`] and therefore always arrive already at scale zero.
///
/// Normalization never changes the numeric value, only its scale.
pub fn normalize(value: Decimal) -> Decimal {
    if value.scale() == 0 {
        return value;
    }
    let stripped = value.normalize();
    if stripped.scale() == value.scale() {
        value
    } else {
        stripped
    }
}

/// A non-negative quantity of a specific asset.
///
/// Amounts are immutable and safe to use in collections. The quantity is
/// normalized on construction, so amounts differing only in scale
/// representation compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    asset: Asset,
    quantity: Decimal,
}

impl Amount {
    /// Create an amount of an asset.
    ///
    /// Negative quantities are rejected, never silently negated.
    pub fn new(asset: Asset, quantity: Decimal) -> Result<Self> {
        if quantity < Decimal::ZERO {
            return Err(SystemError::Validation {
                what: "amount quantity",
                input: quantity.to_string(),
            });
        }
        Ok(Self {
            asset,
            quantity: normalize(quantity),
        })
    }

    /// Create an amount from a whole-unit count of a discrete asset.
    pub fn integral(asset: Asset, count: u64) -> Self {
        Self {
            asset,
            quantity: Decimal::from(count),
        }
    }

    /// Create a zero amount of an asset.
    pub fn zero(asset: Asset) -> Self {
        Self {
            asset,
            quantity: Decimal::ZERO,
        }
    }

    /// Get the base asset of this amount.
    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    /// Get the quantity.
    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Get the quantity as a whole-unit count, if it is one.
    pub fn to_integral(&self) -> Option<u64> {
        if self.quantity.fract().is_zero() {
            self.quantity.to_u64()
        } else {
            None
        }
    }

    /// Check whether the quantity is zero.
    pub fn is_zero(&self) -> bool {
        self.quantity.is_zero()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.quantity, self.asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gold() -> Asset {
        Asset::currency("gold").unwrap()
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let minus_one = Decimal::from(-1);
        assert!(Amount::new(gold(), minus_one).is_err());
        let tiny = Decimal::from_str_exact("-0.0001").unwrap();
        assert!(Amount::new(gold(), tiny).is_err());
    }

    #[test]
    fn test_zero_and_positive_accepted() {
        assert!(Amount::new(gold(), Decimal::ZERO).is_ok());
        assert!(Amount::new(gold(), Decimal::from(30)).is_ok());
    }

    #[test]
    fn test_normalize_strips_trailing_zeros() {
        let half = Decimal::from_str_exact("0.50").unwrap();
        let normalized = normalize(half);
        assert_eq!(normalized.to_string(), "0.5");
        assert_eq!(normalized, half);
    }

    #[test]
    fn test_normalize_scaled_whole_number() {
        let two_hundred = Decimal::from_scientific("2e2").unwrap();
        let normalized = normalize(two_hundred);
        assert_eq!(normalized, Decimal::from(200));
        assert_eq!(normalized.scale(), 0);
    }

    #[test]
    fn test_normalize_leaves_zero_scale_unchanged() {
        let whole = Decimal::from(42);
        assert_eq!(normalize(whole).scale(), 0);
    }

    #[test]
    fn test_amounts_equal_across_scales() {
        let a = Amount::new(gold(), Decimal::from_str_exact("1.50").unwrap()).unwrap();
        let b = Amount::new(gold(), Decimal::from_str_exact("1.5").unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_integral_round_trip() {
        let stack = Amount::integral(Asset::item("stone").unwrap(), 64);
        assert_eq!(stack.to_integral(), Some(64));

        let fractional =
            Amount::new(gold(), Decimal::from_str_exact("0.5").unwrap()).unwrap();
        assert_eq!(fractional.to_integral(), None);
    }

    proptest! {
        #[test]
        fn prop_normalize_idempotent(mantissa in any::<i64>(), scale in 0u32..28) {
            let value = Decimal::new(mantissa, scale);
            let once = normalize(value);
            prop_assert_eq!(normalize(once), once);
        }

        #[test]
        fn prop_normalize_preserves_value(mantissa in any::<i64>(), scale in 0u32..28) {
            let value = Decimal::new(mantissa, scale);
            prop_assert_eq!(normalize(value), value);
        }
    }
}
