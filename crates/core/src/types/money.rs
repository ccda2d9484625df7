//! Rupiah money type backed by decimal arithmetic.
//!
//! All prices on the platform are IDR. Amounts are stored in the currency's
//! standard unit with two decimal places of precision, matching the
//! NUMERIC(14,2) columns in the schema.

use core::fmt;
use core::ops::{Add, Sub};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// An IDR amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero rupiah.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a `Money` from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a `Money` from a whole-rupiah amount.
    #[must_use]
    pub fn from_rupiah(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a line-item quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Take a percentage of this amount, rounded to two decimal places with
    /// half-away-from-zero rounding.
    ///
    /// Used for the flat 10% checkout tax.
    #[must_use]
    pub fn percent(&self, pct: u32) -> Self {
        Self(
            (self.0 * Decimal::from(pct) / Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Whether the amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl core::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    /// Format for display, e.g. `Rp126.500` or `Rp10.250,50`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let normalized = self.0.normalize();
        let whole = normalized.trunc();
        let frac = (normalized - whole).abs();

        let mut digits = whole.abs().to_string();
        let mut grouped = String::new();
        while digits.len() > 3 {
            let split = digits.len() - 3;
            grouped = format!(".{}{grouped}", digits.split_off(split));
        }
        grouped = format!("{digits}{grouped}");

        let sign = if self.is_negative() { "-" } else { "" };
        if frac.is_zero() {
            write!(f, "{sign}Rp{grouped}")
        } else {
            let cents = (frac * Decimal::ONE_HUNDRED).round().to_u32().unwrap_or(0);
            write!(f, "{sign}Rp{grouped},{cents:02}")
        }
    }
}

// SQLx support (with postgres feature): delegate to Decimal / NUMERIC.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_times_and_add() {
        let price = Money::from_rupiah(50_000);
        let subtotal = price.times(2);
        assert_eq!(subtotal, Money::from_rupiah(100_000));

        let total = subtotal + Money::from_rupiah(15_000);
        assert_eq!(total, Money::from_rupiah(115_000));
    }

    #[test]
    fn test_ten_percent_tax() {
        let base = Money::from_rupiah(115_000);
        assert_eq!(base.percent(10), Money::from_rupiah(11_500));
        assert_eq!(base + base.percent(10), Money::from_rupiah(126_500));
    }

    #[test]
    fn test_percent_rounds_to_cents() {
        let base = Money::new(Decimal::new(10_005, 2)); // 100.05
        assert_eq!(base.percent(10).amount(), Decimal::new(1001, 2)); // 10.01
    }

    #[test]
    fn test_display_grouping() {
        assert_eq!(Money::from_rupiah(0).to_string(), "Rp0");
        assert_eq!(Money::from_rupiah(950).to_string(), "Rp950");
        assert_eq!(Money::from_rupiah(50_000).to_string(), "Rp50.000");
        assert_eq!(Money::from_rupiah(126_500).to_string(), "Rp126.500");
        assert_eq!(Money::from_rupiah(1_250_000).to_string(), "Rp1.250.000");
    }

    #[test]
    fn test_display_fractional() {
        let m = Money::new(Decimal::new(1_025_050, 2)); // 10250.50
        assert_eq!(m.to_string(), "Rp10.250,50");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(Money::from_rupiah(-5_000).to_string(), "-Rp5.000");
    }

    #[test]
    fn test_sum() {
        let total: Money = [10_000, 20_000, 5_000]
            .into_iter()
            .map(Money::from_rupiah)
            .sum();
        assert_eq!(total, Money::from_rupiah(35_000));
    }

    #[test]
    fn test_serde_as_string() {
        let m = Money::from_rupiah(50_000);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "\"50000\"");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
