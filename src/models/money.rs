//! Money type for representing currency amounts
//!
//! Internally stores amounts in cents (i64) to avoid floating-point precision
//! issues. Amounts are displayed the es-AR way: whole units, `.` as the
//! thousands separator (`$ 5.000`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Represents a monetary amount stored as cents (hundredths of the currency unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use cifra::models::Money;
    /// let amount = Money::from_cents(1050); // $ 10,50
    /// assert_eq!(amount.units(), 10);
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a Money amount from whole currency units
    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    /// Create a Money amount from a decimal number of units, rounding to the
    /// nearest cent. `None` for non-finite values and values that do not fit.
    pub fn try_from_decimal(value: f64) -> Option<Self> {
        let cents = (value * 100.0).round();
        if !cents.is_finite() || cents.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Self(cents as i64))
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in cents
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Get the whole units portion (truncated toward zero)
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Get the cents portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// The amount as a decimal number of units
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Check if the amount is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Check if the amount is positive
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Check if the amount is negative
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Get the absolute value
    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// This amount as a percentage of `base`, or `None` when `base` is not
    /// positive.
    pub fn percentage_of(&self, base: Money) -> Option<f64> {
        if base.is_positive() {
            Some(self.0 as f64 * 100.0 / base.0 as f64)
        } else {
            None
        }
    }

    /// Parse a money amount from a string
    ///
    /// Accepts formats: "5000", "5000.50", "5000,50", "$5000", "$ 5.000",
    /// "$ 5.000,50". Without a comma, dots between groups of three digits
    /// separate thousands; otherwise a dot marks decimals.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let original = s.trim();
        let invalid = || MoneyParseError::InvalidFormat(original.to_string());

        let (negative, s) = match original.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, original),
        };

        let s = s.strip_prefix('$').unwrap_or(s).trim();

        let (units, fraction) = match s.split_once(',') {
            Some((units, fraction)) => {
                if units.contains('.') && !is_grouped(units) {
                    return Err(invalid());
                }
                (units.replace('.', ""), fraction)
            }
            None if is_grouped(s) => (s.replace('.', ""), ""),
            None => match s.split_once('.') {
                Some((units, fraction)) => (units.to_string(), fraction),
                None => (s.to_string(), ""),
            },
        };

        if units.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let units = if units.is_empty() {
            0
        } else {
            parse_digits(&units).ok_or_else(invalid)?
        };
        // Only ASCII digits are left, so byte slicing is safe
        let fraction_cents = match fraction.len() {
            0 => 0,
            1 => parse_digits(fraction).ok_or_else(invalid)? * 10,
            _ => parse_digits(&fraction[..2]).ok_or_else(invalid)?,
        };

        let cents = units
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction_cents))
            .ok_or_else(invalid)?;

        Ok(Self(if negative { -cents } else { cents }))
    }

    /// Format with a currency symbol, es-AR style without decimals
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let rounded = (self.0.abs() + 50) / 100;
        let grouped = group_thousands(rounded);
        if self.is_negative() && rounded != 0 {
            format!("-{} {}", symbol, grouped)
        } else {
            format!("{} {}", symbol, grouped)
        }
    }
}

fn parse_digits(s: &str) -> Option<i64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// "5.000" or "1.234.567": a leading group of one to three digits, then
/// groups of exactly three
fn is_grouped(s: &str) -> bool {
    let mut groups = s.split('.');
    let lead_ok = groups.next().is_some_and(|g| {
        (1..=3).contains(&g.len()) && !g.starts_with('0') && g.bytes().all(|b| b.is_ascii_digit())
    });
    let mut rest = groups.peekable();
    lead_ok
        && rest.peek().is_some()
        && rest.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()))
}

fn group_thousands(value: i64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_with_symbol("$"))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> std::iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}
