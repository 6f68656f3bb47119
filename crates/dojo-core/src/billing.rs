//! Payments and the monthly billing batch.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result};

/// Due day used when the caller does not pick one.
pub const DEFAULT_DUE_DAY: u32 = 10;

/// Latest due day accepted; every month has a 28th.
pub const MAX_DUE_DAY: u32 = 28;

/// Years a reference month may fall in. Stored dates are `YYYY-MM-DD` text
/// and only sort correctly while the year has exactly four digits.
pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

// ─── Reference month ─────────────────────────────────────────────────────────

/// The calendar month a payment represents, independent of when it was
/// generated or paid. Serialised as `"YYYY-MM"`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct ReferenceMonth {
  year:  i32,
  month: u32,
}

impl ReferenceMonth {
  pub fn new(year: i32, month: u32) -> Result<Self> {
    if !(1..=12).contains(&month) {
      return Err(Error::Validation(format!("invalid month: {month}")));
    }
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
      return Err(Error::Validation(format!(
        "year must be between {MIN_YEAR} and {MAX_YEAR}, got {year}"
      )));
    }
    Ok(Self { year, month })
  }

  /// The month containing `date`.
  pub fn of(date: NaiveDate) -> Result<Self> {
    Self::new(date.year(), date.month())
  }

  pub fn year(&self) -> i32 { self.year }

  pub fn month(&self) -> u32 { self.month }

  /// First day of the month; this is the value stored in
  /// `payments.reference_month`.
  pub fn first_day(&self) -> NaiveDate {
    // Every month of years 1..=9999 has a first day.
    NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
  }

  /// The due date for this month on `due_day`.
  pub fn due_date(&self, due_day: u32) -> Result<NaiveDate> {
    if !(1..=MAX_DUE_DAY).contains(&due_day) {
      return Err(Error::Validation(format!(
        "due day must be between 1 and {MAX_DUE_DAY}, got {due_day}"
      )));
    }
    NaiveDate::from_ymd_opt(self.year, self.month, due_day).ok_or_else(|| {
      Error::Validation(format!("{self} has no day {due_day}"))
    })
  }
}

impl fmt::Display for ReferenceMonth {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:04}-{:02}", self.year, self.month)
  }
}

impl FromStr for ReferenceMonth {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let invalid =
      || Error::Validation(format!("reference month must be YYYY-MM, got {s:?}"));
    let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
    let year = year.parse().map_err(|_| invalid())?;
    let month = month.parse().map_err(|_| invalid())?;
    Self::new(year, month)
  }
}

impl TryFrom<String> for ReferenceMonth {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<ReferenceMonth> for String {
  fn from(m: ReferenceMonth) -> Self { m.to_string() }
}

// ─── Payments ────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentStatus {
  #[default]
  Pending,
  Paid,
  Overdue,
  Cancelled,
}

impl PaymentStatus {
  pub fn as_str(self) -> &'static str { self.into() }

  /// Whether a payment in this status can still be settled.
  pub fn is_payable(self) -> bool {
    matches!(self, Self::Pending | Self::Overdue)
  }
}

/// A billing record. At most one exists per (student, reference month).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
  pub payment_id:      Uuid,
  pub student_id:      Uuid,
  pub amount_cents:    i64,
  pub due_date:        NaiveDate,
  pub reference_month: ReferenceMonth,
  pub status:          PaymentStatus,
  pub paid_at:         Option<DateTime<Utc>>,
  pub created_at:      DateTime<Utc>,
}

// ─── Billing batch ───────────────────────────────────────────────────────────

/// One line of a [`BillingReport`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BilledStudent {
  pub student_id:   Uuid,
  pub student_name: String,
  pub amount_cents: i64,
}

/// Summary returned by [`crate::store::AcademyStore::generate_monthly`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingReport {
  pub reference_month: ReferenceMonth,
  pub due_date:        NaiveDate,
  pub generated:       usize,
  pub total_cents:     i64,
  pub payments:        Vec<BilledStudent>,
}

impl BillingReport {
  pub fn is_empty(&self) -> bool { self.generated == 0 }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_and_display() {
    let m: ReferenceMonth = "2025-03".parse().unwrap();
    assert_eq!(m.year(), 2025);
    assert_eq!(m.month(), 3);
    assert_eq!(m.to_string(), "2025-03");
    assert_eq!(m.first_day(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
  }

  #[test]
  fn rejects_malformed_months() {
    assert!("2025-13".parse::<ReferenceMonth>().is_err());
    assert!("2025".parse::<ReferenceMonth>().is_err());
    assert!("march".parse::<ReferenceMonth>().is_err());
  }

  #[test]
  fn years_outside_four_digits_are_rejected() {
    assert!(ReferenceMonth::new(9999, 12).is_ok());
    assert!(ReferenceMonth::new(1, 1).is_ok());
    assert!(ReferenceMonth::new(10_000, 1).is_err());
    assert!(ReferenceMonth::new(0, 6).is_err());
    assert!(ReferenceMonth::new(-44, 3).is_err());
    assert!("10000-01".parse::<ReferenceMonth>().is_err());
    assert!(ReferenceMonth::of(NaiveDate::from_ymd_opt(12_000, 5, 9).unwrap()).is_err());
  }

  #[test]
  fn due_day_bounds() {
    let feb = ReferenceMonth::new(2025, 2).unwrap();
    assert_eq!(
      feb.due_date(28).unwrap(),
      NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
    );
    assert!(feb.due_date(0).is_err());
    assert!(feb.due_date(29).is_err());
  }

  #[test]
  fn serde_uses_month_string() {
    let m = ReferenceMonth::new(2025, 3).unwrap();
    assert_eq!(serde_json::to_value(m).unwrap(), serde_json::json!("2025-03"));
    let back: ReferenceMonth = serde_json::from_str("\"2025-03\"").unwrap();
    assert_eq!(back, m);
  }
}
