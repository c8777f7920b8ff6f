//! # Monetary Amounts
//!
//! Money is stored as non-negative integer minor units (kobo). There is no
//! floating-point path into or out of this type.
//!
//! ## Security Invariant
//!
//! Financial amounts must never be represented as floating-point numbers.
//! Integer minor units make precision loss structurally impossible, and all
//! arithmetic is checked.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Number of minor units per major unit (kobo per naira).
const MINOR_PER_MAJOR: u64 = 100;

/// A non-negative monetary amount in minor units.
///
/// Ordering and equality compare the underlying minor-unit value, so
/// "restitution amount ≤ guarantee price" is a plain `<=`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Zero amount.
    pub const ZERO: Money = Money(0);

    /// Create an amount from minor units (kobo).
    pub fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    /// Create an amount from whole major units (naira).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAmount`] if the conversion to
    /// minor units would overflow.
    pub fn from_major(major: u64) -> Result<Self, ValidationError> {
        major
            .checked_mul(MINOR_PER_MAJOR)
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidAmount(format!("{major} overflows minor units")))
    }

    /// The amount in minor units.
    pub fn as_minor(&self) -> u64 {
        self.0
    }

    /// Whether the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Checked subtraction.
    pub fn checked_sub(&self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.0 / MINOR_PER_MAJOR,
            self.0 % MINOR_PER_MAJOR
        )
    }
}
