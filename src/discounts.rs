//! Discount Percentages
//!
//! Earned discounts are whole-number percentages in `[0, 100]`. Values that
//! reach this module from the client-held reward store are untrusted, so
//! construction is fallible and never clamps: an out-of-range value is an
//! input error. Clamping to the cart cap happens later, at application time
//! (see [`crate::carts`]).

use std::fmt;

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::MoneyError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// A percent value was outside `[0, 100]`.
    #[error("discount percent {0} is outside the valid range 0-100")]
    PercentOutOfRange(u8),

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A whole-number discount percentage in `[0, 100]`.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct DiscountPercent(u8);

/// The system-wide ceiling on any cart discount.
///
/// Enforced after best-record selection so that an honestly earned at-cap
/// record passes through untouched while any larger value is clamped.
pub const DISCOUNT_CAP: DiscountPercent = DiscountPercent(15);

impl DiscountPercent {
    /// The zero percent value.
    pub const ZERO: Self = Self(0);

    /// Build a percent from a statically known in-range value, clamping to
    /// 100 rather than failing. Untrusted input must go through
    /// [`TryFrom<u8>`] instead.
    #[must_use]
    pub const fn saturating(points: u8) -> Self {
        Self(if points > 100 { 100 } else { points })
    }

    /// Return the percent as whole points.
    #[must_use]
    pub fn points(self) -> u8 {
        self.0
    }

    /// Whether this is the zero percent.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Convert to a decimal [`Percentage`] (15 points -> 0.15).
    #[must_use]
    pub fn as_percentage(self) -> Percentage {
        Percentage::from(Decimal::new(i64::from(self.0), 2))
    }

    /// Calculate this percent of an amount in minor units.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::PercentConversion`] if the calculation
    /// overflows or cannot be safely represented.
    pub fn amount_of_minor(self, minor: i64) -> Result<i64, DiscountError> {
        percent_of_minor(&self.as_percentage(), minor)
    }
}

impl TryFrom<u8> for DiscountPercent {
    type Error = DiscountError;

    fn try_from(points: u8) -> Result<Self, Self::Error> {
        if points > 100 {
            Err(DiscountError::PercentOutOfRange(points))
        } else {
            Ok(Self(points))
        }
    }
}

impl From<DiscountPercent> for u8 {
    fn from(percent: DiscountPercent) -> Self {
        percent.0
    }
}

impl fmt::Display for DiscountPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// # Errors
///
/// Returns an error if:
/// - The percentage calculation overflows or cannot be safely represented (`DiscountError::PercentConversion`).
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage crate doesn't actually expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}
