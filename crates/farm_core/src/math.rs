//! Fixed-point time math for deterministic simulation.
//!
//! Durations are expressed in minutes using fixed-point arithmetic so
//! that readiness calculations produce identical results on every
//! platform and for every partition of an elapsed interval. Instants are
//! caller-supplied [`Timestamp`]s; the core never reads a clock.

use std::fmt;

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all duration math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647 minutes
/// Precision: approximately 0.00000000023 minutes
pub type Fixed = I32F32;

/// Milliseconds in one minute.
pub const MILLIS_PER_MINUTE: i64 = 60_000;

/// Equipment speed-up granted per tier above the first, in tenths.
pub const BONUS_TENTHS_PER_TIER: u32 = 1;

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Convert a configuration value in minutes to fixed-point.
///
/// Non-finite and non-positive values map to zero, which every readiness
/// query treats as "never ready".
#[must_use]
pub fn minutes_from_f64(minutes: f64) -> Fixed {
    if !minutes.is_finite() || minutes <= 0.0 {
        return Fixed::ZERO;
    }
    Fixed::saturating_from_num(minutes)
}

/// Whole milliseconds in a fixed-point minute span, rounded down.
///
/// Computed from the raw bits so that no precision is lost for spans
/// longer than the fixed-point integer range allows after scaling.
#[must_use]
pub fn millis_floor(minutes: Fixed) -> i64 {
    if minutes <= Fixed::ZERO {
        return 0;
    }
    let scaled = (i128::from(minutes.to_bits()) * i128::from(MILLIS_PER_MINUTE)) >> Fixed::FRAC_NBITS;
    i64::try_from(scaled).unwrap_or(i64::MAX)
}

/// An instant supplied by the host, in milliseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// The zero instant. Snapshots carrying it are treated as unset.
    pub const ZERO: Self = Self(0);

    /// Create a timestamp from milliseconds since the epoch.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Create a timestamp from whole seconds since the epoch.
    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    /// Milliseconds since the epoch.
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Whether this is the unset zero instant.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// This instant shifted by a whole number of minutes.
    #[must_use]
    pub const fn add_minutes(self, minutes: i64) -> Self {
        Self(self.0.saturating_add(minutes.saturating_mul(MILLIS_PER_MINUTE)))
    }

    /// This instant shifted by a whole number of seconds.
    #[must_use]
    pub const fn add_secs(self, secs: i64) -> Self {
        Self(self.0.saturating_add(secs.saturating_mul(1000)))
    }

    /// This instant moved back by a fixed-point minute span.
    ///
    /// The span is rounded down to whole milliseconds, so the result is
    /// never earlier than the exact instant.
    #[must_use]
    pub fn rewind(self, minutes: Fixed) -> Self {
        Self(self.0.saturating_sub(millis_floor(minutes)))
    }

    /// Minutes elapsed from `earlier` to `self`, clamped at zero.
    ///
    /// Whole minutes and the sub-minute remainder are converted separately
    /// so that multi-year gaps saturate instead of overflowing.
    #[must_use]
    pub fn minutes_since(self, earlier: Self) -> Fixed {
        let millis = self.0.saturating_sub(earlier.0);
        if millis <= 0 {
            return Fixed::ZERO;
        }
        let whole = Fixed::saturating_from_num(millis / MILLIS_PER_MINUTE);
        let rem = Fixed::from_num(millis % MILLIS_PER_MINUTE) / Fixed::from_num(MILLIS_PER_MINUTE);
        whole.saturating_add(rem)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Fractional speed-up applied to every cycle duration.
///
/// A bonus of `0.1` turns a 10 minute cycle into `10 / 1.1` minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EquipmentBonus(Fixed);

impl EquipmentBonus {
    /// No speed-up.
    pub const NONE: Self = Self(Fixed::ZERO);

    /// Bonus for an equipment tier: `(tier - 1) * 0.1`.
    ///
    /// Tier 0 is treated as tier 1.
    #[must_use]
    pub fn from_tier(tier: u32) -> Self {
        let tenths = tier.saturating_sub(1).saturating_mul(BONUS_TENTHS_PER_TIER);
        Self(Fixed::saturating_from_num(tenths) / Fixed::from_num(10))
    }

    /// The bonus as a fraction.
    #[must_use]
    pub const fn fraction(self) -> Fixed {
        self.0
    }

    /// Apply the bonus to a base duration.
    ///
    /// Returns zero for non-positive base durations so callers can treat
    /// malformed configuration as "never ready".
    #[must_use]
    pub fn effective_duration(self, base: Fixed) -> Fixed {
        if base <= Fixed::ZERO {
            return Fixed::ZERO;
        }
        base.checked_div(Fixed::ONE.saturating_add(self.0))
            .unwrap_or(Fixed::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_since_whole_and_fractional() {
        let t0 = Timestamp::from_secs(1_000);
        assert_eq!(t0.add_minutes(30).minutes_since(t0), Fixed::from_num(30));
        assert_eq!(t0.add_secs(90).minutes_since(t0), Fixed::from_num(1.5));
    }

    #[test]
    fn test_minutes_since_clamps_backwards_time() {
        let t0 = Timestamp::from_secs(1_000);
        assert_eq!(t0.minutes_since(t0.add_minutes(5)), Fixed::ZERO);
    }

    #[test]
    fn test_minutes_since_saturates_on_huge_gap() {
        let elapsed = Timestamp(i64::MAX).minutes_since(Timestamp(0));
        assert_eq!(elapsed, Fixed::MAX);
    }

    #[test]
    fn test_bonus_from_tier() {
        assert_eq!(EquipmentBonus::from_tier(1), EquipmentBonus::NONE);
        assert_eq!(EquipmentBonus::from_tier(0), EquipmentBonus::NONE);
        let tier3 = EquipmentBonus::from_tier(3).fraction();
        assert!((tier3 - Fixed::from_num(0.2)).abs() < Fixed::from_num(0.0001));
    }

    #[test]
    fn test_effective_duration() {
        let bonus = EquipmentBonus::from_tier(2);
        let d = bonus.effective_duration(Fixed::from_num(10));
        assert!((d - Fixed::from_num(9.0909)).abs() < Fixed::from_num(0.001));
        assert_eq!(bonus.effective_duration(Fixed::ZERO), Fixed::ZERO);
        assert_eq!(bonus.effective_duration(Fixed::from_num(-3)), Fixed::ZERO);
    }

    #[test]
    fn test_millis_floor_rounds_down() {
        assert_eq!(millis_floor(Fixed::from_num(1.5)), 90_000);
        assert_eq!(millis_floor(Fixed::from_num(-2)), 0);
        assert_eq!(millis_floor(Fixed::from_bits(1)), 0);
        assert_eq!(millis_floor(Fixed::MAX), 128_849_018_879_999);
    }

    #[test]
    fn test_rewind_is_never_earlier_than_exact() {
        let t0 = Timestamp::from_secs(1_000);
        let span = Fixed::from_num(10) / Fixed::from_num(3);
        let back = t0.rewind(span);
        assert_eq!(back, Timestamp(t0.0 - 199_999));
        assert!(t0.minutes_since(back) <= span);
    }

    #[test]
    fn test_minutes_from_f64_rejects_garbage() {
        assert_eq!(minutes_from_f64(f64::NAN), Fixed::ZERO);
        assert_eq!(minutes_from_f64(-1.0), Fixed::ZERO);
        assert_eq!(minutes_from_f64(f64::INFINITY), Fixed::ZERO);
        assert_eq!(minutes_from_f64(2.5), Fixed::from_num(2.5));
    }
}
