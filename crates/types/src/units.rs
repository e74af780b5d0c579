//! Fixed-point price and capacity units.

use derive_more::{Add, AddAssign, From, Into, Sub, SubAssign, Sum};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Price scale factor: 10,000 means 4 decimal places.
/// - `10000` = 1.0 cost units
/// - `1` = 0.0001 (smallest representable increment)
pub const PRICE_SCALE: i64 = 10_000;

// =============================================================================
// Price
// =============================================================================

/// Fixed-point bid price with 4 decimal places.
///
/// # Examples
/// - `Price(90_000)` = 9.0
/// - `Price(10_000)` = 1.0
/// - `Price(1)` = 0.0001
///
/// Zero is meaningful in the protocol: a zero-price bid signals "cannot
/// serve", so `is_positive` is the serving check, not a sign test.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Default,
    Add,
    Sub,
    AddAssign,
    SubAssign,
    From,
    Into,
)]
pub struct Price(pub i64);

impl Price {
    pub const ZERO: Price = Price(0);

    /// One whole cost unit, the minimal outbid increment.
    pub const ONE: Price = Price(PRICE_SCALE);

    /// Create a Price from a floating-point value.
    #[inline]
    pub fn from_float(v: f64) -> Self {
        Self((v * PRICE_SCALE as f64).round() as i64)
    }

    /// Convert to floating-point for display/calculations.
    #[inline]
    pub fn to_float(self) -> f64 {
        self.0 as f64 / PRICE_SCALE as f64
    }

    /// Raw internal value.
    #[inline]
    pub fn raw(self) -> i64 {
        self.0
    }

    /// Check if price is positive.
    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Debug for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Price({:.4})", self.to_float())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.to_float())
    }
}

// =============================================================================
// Capacity
// =============================================================================

/// Capacity units (newtype for type safety).
///
/// Used both for an agent's total capacity and for a task's demand, so the
/// two are directly comparable.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Default,
    Add,
    Sub,
    AddAssign,
    SubAssign,
    Sum,
    From,
    Into,
)]
pub struct Capacity(pub u64);

impl Capacity {
    pub const ZERO: Capacity = Capacity(0);

    /// Get raw value.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Check if zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Saturating subtraction.
    #[inline]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Capacity(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Debug for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cap({})", self.0)
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Allow `capacity == 50` comparisons
impl PartialEq<u64> for Capacity {
    fn eq(&self, other: &u64) -> bool {
        self.0 == *other
    }
}

// =============================================================================
// Tests
// =============================================================================
