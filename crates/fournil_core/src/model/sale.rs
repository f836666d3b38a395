//! Daily sales observation model.
//!
//! # Responsibility
//! - Define the calendar-day key (`SaleDate`) exchanged as `YYYY-MM-DD`.
//! - Define the sold/unsold quantity pair and its validation rules.
//! - Define persisted observations and the gap-filled working record.
//!
//! # Invariants
//! - `SaleDate` text is always exactly `YYYY-MM-DD`, no time, no timezone.
//! - Quantities are non-negative integers that fit in `u32`.

use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::IntErrorKind;
use std::str::FromStr;

use crate::model::product::ProductId;

const SALE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Calendar day without time-of-day precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SaleDate(NaiveDate);

impl SaleDate {
    /// Parses strict `YYYY-MM-DD` text.
    ///
    /// Rejects non-padded parts, surrounding whitespace and anything carrying a
    /// time or timezone suffix (`2024-06-01T08:00`, `2024-06-01Z`).
    pub fn parse(value: &str) -> Result<Self, SaleDateError> {
        let bytes = value.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes.iter().enumerate().all(|(index, byte)| match index {
                4 | 7 => *byte == b'-',
                _ => byte.is_ascii_digit(),
            });
        if !well_formed {
            return Err(SaleDateError::Malformed(value.to_string()));
        }

        NaiveDate::parse_from_str(value, SALE_DATE_FORMAT)
            .map(Self)
            .map_err(|_| SaleDateError::OutOfRange(value.to_string()))
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Today in the operator's local timezone.
    pub fn today_local() -> Self {
        Self(Local::now().date_naive())
    }

    /// Default day offered for sales entry: the day before `today`.
    pub fn yesterday_of(today: Self) -> Self {
        today.days_before(1).unwrap_or(today)
    }

    pub fn days_before(self, days: u64) -> Option<Self> {
        self.0.checked_sub_days(Days::new(days)).map(Self)
    }

    pub fn days_after(self, days: u64) -> Option<Self> {
        self.0.checked_add_days(Days::new(days)).map(Self)
    }
}

impl Display for SaleDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(SALE_DATE_FORMAT))
    }
}

impl FromStr for SaleDate {
    type Err = SaleDateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for SaleDate {
    type Error = SaleDateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SaleDate> for String {
    fn from(value: SaleDate) -> Self {
        value.to_string()
    }
}

/// Rejected calendar-day text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaleDateError {
    /// Not shaped like `YYYY-MM-DD`.
    Malformed(String),
    /// Shaped correctly but not a real calendar day (e.g. `2024-02-30`).
    OutOfRange(String),
}

impl Display for SaleDateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(value) => {
                write!(f, "sale date `{value}` must be formatted as YYYY-MM-DD")
            }
            Self::OutOfRange(value) => write!(f, "sale date `{value}` is not a calendar day"),
        }
    }
}

impl Error for SaleDateError {}

/// Sold/unsold pair recorded for one product on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Quantities {
    pub sold: u32,
    pub unsold: u32,
}

impl Quantities {
    pub fn new(sold: u32, unsold: u32) -> Self {
        Self { sold, unsold }
    }

    /// Whether this pair carries operator input worth persisting.
    ///
    /// An all-zero pair means "nothing entered" and is never written.
    pub fn is_write_worthy(self) -> bool {
        self.sold > 0 || self.unsold > 0
    }
}

/// Rejected quantity input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    Negative(String),
    TooLarge(String),
    NotAnInteger(String),
}

impl Display for QuantityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Negative(value) => write!(f, "quantity `{value}` must not be negative"),
            Self::TooLarge(value) => write!(f, "quantity `{value}` is too large"),
            Self::NotAnInteger(value) => write!(f, "quantity `{value}` is not a whole number"),
        }
    }
}

impl Error for QuantityError {}

/// Validates a signed quantity.
pub fn quantity_from_i64(value: i64) -> Result<u32, QuantityError> {
    if value < 0 {
        return Err(QuantityError::Negative(value.to_string()));
    }
    u32::try_from(value).map_err(|_| QuantityError::TooLarge(value.to_string()))
}

/// Parses raw operator text into a quantity.
///
/// A blank field reads as zero. Anything else must be a whole number.
pub fn parse_quantity(raw: &str) -> Result<u32, QuantityError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }

    match trimmed.parse::<i64>() {
        Ok(value) => quantity_from_i64(value),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Err(QuantityError::TooLarge(trimmed.to_string())),
            IntErrorKind::NegOverflow => Err(QuantityError::Negative(trimmed.to_string())),
            _ => Err(QuantityError::NotAnInteger(trimmed.to_string())),
        },
    }
}

/// Persisted quantities for one product on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleObservation {
    pub product_id: ProductId,
    pub date: SaleDate,
    pub quantities: Quantities,
}

impl SaleObservation {
    pub fn new(product_id: ProductId, date: SaleDate, sold: u32, unsold: u32) -> Self {
        Self {
            product_id,
            date,
            quantities: Quantities::new(sold, unsold),
        }
    }
}

/// Gap-filled editable record; one per catalog product for the selected day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkingRecord {
    pub product_id: ProductId,
    pub name: String,
    pub quantities: Quantities,
}
