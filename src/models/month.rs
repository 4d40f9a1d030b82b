//! Month key representation
//!
//! Every expense lives in exactly one monthly bucket identified by a
//! `YYYY-MM` key.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const MONTH_NAMES_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

const MONTH_ABBREVIATIONS_ES: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

/// A validated `YYYY-MM` month bucket key
///
/// Ordering is chronological, so sorting keys sorts months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Create a month key, validating the month number
    pub fn new(year: i32, month: u32) -> Result<Self, MonthKeyParseError> {
        if !(1..=12).contains(&month) {
            return Err(MonthKeyParseError::InvalidMonth(month));
        }
        if !(1..=9999).contains(&year) {
            return Err(MonthKeyParseError::InvalidYear(year));
        }
        Ok(Self { year, month })
    }

    /// The month key of today's local date
    pub fn current() -> Self {
        Self::from_date(chrono::Local::now().date_naive())
    }

    /// The month key containing `date`
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse a `YYYY-MM` string
    pub fn parse(s: &str) -> Result<Self, MonthKeyParseError> {
        let s = s.trim();
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| MonthKeyParseError::InvalidFormat(s.to_string()))?;

        if year.len() != 4 || month.len() != 2 {
            return Err(MonthKeyParseError::InvalidFormat(s.to_string()));
        }

        let year: i32 = year
            .parse()
            .map_err(|_| MonthKeyParseError::InvalidFormat(s.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| MonthKeyParseError::InvalidFormat(s.to_string()))?;

        Self::new(year, month)
    }

    /// Whether `s` is a valid month key
    pub fn is_valid(s: &str) -> bool {
        Self::parse(s).is_ok()
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        // year and month are validated on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// The following month
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The preceding month
    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Spanish long label, e.g. "octubre 2026"
    pub fn label(&self) -> String {
        format!("{} {}", MONTH_NAMES_ES[(self.month - 1) as usize], self.year)
    }

    /// Spanish short label, e.g. "oct 26"
    pub fn short_label(&self) -> String {
        format!(
            "{} {:02}",
            MONTH_ABBREVIATIONS_ES[(self.month - 1) as usize],
            self.year % 100
        )
    }

    /// Spanish month abbreviation only, e.g. "oct"
    pub fn month_abbreviation(&self) -> &'static str {
        MONTH_ABBREVIATIONS_ES[(self.month - 1) as usize]
    }
}

impl Default for MonthKey {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = MonthKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Error type for month key parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthKeyParseError {
    InvalidFormat(String),
    InvalidMonth(u32),
    InvalidYear(i32),
}

impl fmt::Display for MonthKeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat(s) => write!(f, "Invalid month key '{}', expected YYYY-MM", s),
            Self::InvalidMonth(m) => write!(f, "Invalid month number: {}", m),
            Self::InvalidYear(y) => write!(f, "Invalid year: {}", y),
        }
    }
}

impl std::error::Error for MonthKeyParseError {}
