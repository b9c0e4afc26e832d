//! Monetary amounts as integer minor units.
//!
//! All money in the application is stored and summed as whole cents. Binary
//! floating point is only used at the presentation edge (chart values and
//! ratios such as the savings rate), never for accumulating amounts, since
//! repeated addition of currency in `f64` drifts at the cent level.

use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// An amount of money in whole cents.
///
/// The sign of a transaction is carried by its kind (income or expense), so
/// transaction amounts are always positive. `Cents` itself is signed because
/// derived figures such as the net balance can be negative.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    /// Zero dollars and zero cents.
    pub const ZERO: Cents = Cents(0);

    /// Create an amount from a count of cents.
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// The raw count of cents.
    pub const fn count(&self) -> i64 {
        self.0
    }

    /// The amount in dollars as a float.
    ///
    /// Only intended for chart values and ratios, not for arithmetic.
    pub fn as_dollars(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// The amount with the sign dropped.
    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// The amount as a plain decimal string such as "12.34", suitable for
    /// pre-filling number form inputs.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.abs();

        format!("{sign}{}.{:02}", cents / 100, cents % 100)
    }

    /// Whether the amount is greater than zero.
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl FromStr for Cents {
    type Err = Error;

    /// Parse a decimal dollar amount such as "12", "12.3" or "12.34".
    ///
    /// At most two decimal places are accepted. Leading and trailing
    /// whitespace is ignored. A leading minus sign is accepted so the same
    /// parser can be reused for signed fields, but the transaction and goal
    /// endpoints reject non-positive amounts.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidAmount(raw.to_owned());
        let text = raw.trim();

        let (negative, text) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let (dollars, fraction) = match text.split_once('.') {
            Some((dollars, fraction)) => (dollars, fraction),
            None => (text, ""),
        };

        if dollars.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }

        if !dollars.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let dollars: i64 = if dollars.is_empty() {
            0
        } else {
            dollars.parse().map_err(|_| invalid())?
        };

        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        let total = dollars
            .checked_mul(100)
            .and_then(|d| d.checked_add(cents))
            .ok_or_else(invalid)?;

        Ok(Self(if negative { -total } else { total }))
    }
}

impl Display for Cents {
    /// Format as a dollar amount with thousands separators, e.g. "$1,234.56".
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.abs();
        let dollars = cents / 100;
        let fraction = cents % 100;

        let digits = dollars.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }

        write!(f, "{sign}${grouped}.{fraction:02}")
    }
}

impl Add for Cents {
    type Output = Cents;

    fn add(self, rhs: Self) -> Self::Output {
        Cents(self.0 + rhs.0)
    }
}

impl Sub for Cents {
    type Output = Cents;

    fn sub(self, rhs: Self) -> Self::Output {
        Cents(self.0 - rhs.0)
    }
}

impl Neg for Cents {
    type Output = Cents;

    fn neg(self) -> Self::Output {
        Cents(-self.0)
    }
}

impl AddAssign for Cents {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Cents {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Cents>>(iter: I) -> Self {
        iter.fold(Cents::ZERO, |acc, amount| acc + amount)
    }
}

impl<'a> Sum<&'a Cents> for Cents {
    fn sum<I: Iterator<Item = &'a Cents>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl ToSql for Cents {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for Cents {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Cents)
    }
}
