//! Fixed-point currency amounts.
//!
//! Amounts are held as integer minor units (cents) so that sums of many
//! line items never accumulate binary floating-point error. JSON carries
//! them as decimal numbers (`500`, `99.99`); conversion happens only at
//! the serde boundary and when multiplying by a quantity or rate.
//!
//! Arithmetic saturates at [`Money::MAX`] / [`Money::MIN`]. Quantities come
//! straight from public form input, so an absurd value must clamp rather
//! than overflow.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Minor units per major unit.
pub const CENTS_PER_UNIT: i64 = 100;

/// A currency amount in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);
    pub const MAX: Money = Money(i64::MAX);
    pub const MIN: Money = Money(i64::MIN);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Whole major units, e.g. `Money::from_major(500)` is $500.00.
    pub const fn from_major(units: i64) -> Self {
        Self(units.saturating_mul(CENTS_PER_UNIT))
    }

    /// Convert a decimal amount, rounding half away from zero to the cent.
    /// Out-of-range amounts saturate.
    pub fn from_decimal(amount: f64) -> Self {
        Self(to_cents(amount * CENTS_PER_UNIT as f64))
    }

    /// Like [`Money::from_decimal`], but `None` for non-finite amounts and
    /// amounts outside the representable range.
    pub fn checked_from_decimal(amount: f64) -> Option<Self> {
        let cents = (amount * CENTS_PER_UNIT as f64).round();
        (cents.is_finite() && cents >= i64::MIN as f64 && cents < i64::MAX as f64)
            .then(|| Self(cents as i64))
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Decimal representation for display and JSON output.
    pub fn as_decimal(self) -> f64 {
        self.0 as f64 / CENTS_PER_UNIT as f64
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Multiply by a (possibly fractional) quantity, rounding to the cent.
    pub fn times_quantity(self, quantity: f64) -> Self {
        Self(to_cents(self.0 as f64 * quantity))
    }

    /// Apply a fractional rate such as a tax rate of `0.08`.
    pub fn apply_rate(self, rate: f64) -> Self {
        self.times_quantity(rate)
    }

    /// Render with a currency symbol and two decimals: `$1500.00`.
    pub fn format_with(self, symbol: &str) -> String {
        format!("{symbol}{self}")
    }
}

/// Round to whole cents, clamping to the `i64` range. NaN maps to zero.
fn to_cents(cents: f64) -> i64 {
    if cents.is_nan() {
        return 0;
    }
    // `as` saturates at the i64 bounds.
    cents.round() as i64
}

/// Format an amount for display, e.g. `format_currency(m, "$")` → `"$500.00"`.
pub fn format_currency(amount: Money, symbol: &str) -> String {
    amount.format_with(symbol)
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per = CENTS_PER_UNIT as u64;
        write!(f, "{sign}{}.{:02}", abs / per, abs % per)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        if !amount.is_finite() {
            return Err(serde::de::Error::custom("amount must be a finite number"));
        }
        Money::checked_from_decimal(amount)
            .ok_or_else(|| serde::de::Error::custom("amount is out of range"))
    }
}
