//! # Money Module
//!
//! Provides the `Money` type for currency amounts (Brazilian reais).
//!
//! ## Why Floating Point Here?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE MARKUP DIVISOR PROBLEM                                             │
//! │                                                                         │
//! │  Selling price = cost / (1 - Σ percentage charges)                     │
//! │    12.00 / 0.6172 = 19.4426...                                         │
//! │                                                                         │
//! │  The divisor is an arbitrary fraction, so the result is never an       │
//! │  exact number of centavos. Integer cents would force a rounding step   │
//! │  in the middle of the formula and break Σ(price × qty) == total.       │
//! │                                                                         │
//! │  OUR SOLUTION: f64 end to end, rounding only at presentation           │
//! │    Money::round_cents() exists for the display layer, the engine       │
//! │    itself never rounds.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use precifica_core::money::Money;
//!
//! let cost = Money::from_reais(10.0);
//! let with_fixed = cost + Money::from_reais(2.0);
//! assert_eq!(with_fixed.value(), 12.0);
//!
//! // Per inner unit (a box of 12)
//! assert_eq!(with_fixed.per_unit(12.0).value(), 1.0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Percent;

// =============================================================================
// Money Type
// =============================================================================

/// A currency amount in reais.
///
/// ## Design Decisions
/// - **f64**: the markup divisor method divides by arbitrary fractions
/// - **Signed**: effective cost and internal net tax lines may go negative
/// - **Single field tuple struct**: serializes as a plain JSON number
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  LineItem.acquisition_cost ──┬──► base cost ──► selling price          │
/// │  fixed expenses / stock ─────┘          │                               │
/// │                                         ▼                               │
/// │                          debits, credits, composition                   │
/// │                                         │                               │
/// │                                         ▼                               │
/// │                      GlobalSummary totals (Σ value × quantity)          │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(f64);

impl Money {
    /// Creates a Money value from an amount in reais.
    ///
    /// ## Example
    /// ```rust
    /// use precifica_core::money::Money;
    ///
    /// let price = Money::from_reais(19.44);
    /// assert_eq!(price.value(), 19.44);
    /// ```
    #[inline]
    pub const fn from_reais(amount: f64) -> Self {
        Money(amount)
    }

    /// Returns the raw amount in reais.
    #[inline]
    pub const fn value(&self) -> f64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0.0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > 0.0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < 0.0
    }

    /// Checks that the amount is neither NaN nor infinite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    /// Clamps negative amounts to zero.
    ///
    /// Net tax lines are computed signed (credit may exceed debit) but a
    /// negative "tax owed" is never surfaced.
    ///
    /// ## Example
    /// ```rust
    /// use precifica_core::money::Money;
    ///
    /// assert_eq!(Money::from_reais(-0.3).floor_zero(), Money::zero());
    /// assert_eq!(Money::from_reais(1.5).floor_zero().value(), 1.5);
    /// ```
    #[inline]
    pub fn floor_zero(&self) -> Self {
        if self.0 > 0.0 {
            *self
        } else {
            Money::zero()
        }
    }

    /// Divides the amount across `units` inner units.
    ///
    /// A divisor that is not a positive finite number is treated as 1,
    /// so this never produces NaN or infinity.
    #[inline]
    pub fn per_unit(&self, units: f64) -> Self {
        if units.is_finite() && units > 0.0 {
            Money(self.0 / units)
        } else {
            *self
        }
    }

    /// Multiplies a unit amount by an invoice quantity.
    ///
    /// ## Example
    /// ```rust
    /// use precifica_core::money::Money;
    ///
    /// let line = Money::from_reais(2.5).multiply_quantity(4.0);
    /// assert_eq!(line.value(), 10.0);
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: f64) -> Self {
        Money(self.0 * qty)
    }

    /// Applies a percentage (0-100 domain) to this amount.
    ///
    /// ## Example
    /// ```rust
    /// use precifica_core::money::Money;
    /// use precifica_core::types::Percent;
    ///
    /// let price = Money::from_reais(200.0);
    /// let expense = price.apply_rate(Percent::from_percentage(5.0));
    /// assert_eq!(expense.value(), 10.0);
    /// ```
    #[inline]
    pub fn apply_rate(&self, rate: Percent) -> Self {
        Money(self.0 * rate.fraction())
    }

    /// Applies a rate already expressed as a fraction (0-1 domain),
    /// such as [`crate::CBS_RATE`].
    #[inline]
    pub fn apply_fraction(&self, fraction: f64) -> Self {
        Money(self.0 * fraction)
    }

    /// Rounds to centavos, half away from zero.
    ///
    /// For presentation only: the engine keeps full precision so that
    /// totals equal the sum of their parts.
    ///
    /// ## Example
    /// ```rust
    /// use precifica_core::money::Money;
    ///
    /// assert_eq!(Money::from_reais(19.4426).round_cents().value(), 19.44);
    /// assert_eq!(Money::from_reais(0.125).round_cents().value(), 0.13);
    /// ```
    pub fn round_cents(&self) -> Self {
        Money((self.0 * 100.0).round() / 100.0)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money as `R$ 10.99`.
///
/// ## Note
/// This is for debugging and logs. Locale formatting (`R$ 10,99`) belongs
/// to the presentation layer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0.0 { "-" } else { "" };
        write!(f, "{}R$ {:.2}", sign, self.0.abs())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by a scalar (quantities, fractions).
impl Mul<f64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, factor: f64) -> Self {
        Money(self.0 * factor)
    }
}

/// Division by a scalar (markup divisor, inner units).
///
/// Callers are responsible for guarding against a zero divisor; the
/// pricing engine does so explicitly before every division.
impl Div<f64> for Money {
    type Output = Self;

    #[inline]
    fn div(self, divisor: f64) -> Self {
        Money(self.0 / divisor)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
