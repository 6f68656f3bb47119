//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and calendar dates as
//! `YYYY-MM-DD`, so both sort lexicographically. Enums are stored as their
//! lowercase names. UUIDs are stored as hyphenated lowercase strings.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use dojo_core::{
  belt::{Belt, BeltColor},
  billing::{Payment, ReferenceMonth},
  class::{Class, Enrollment},
  promotion::BeltPromotion,
  student::Student,
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

/// Parse an enum stored by its lowercase name.
pub fn decode_enum<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  s.parse().map_err(|_| Error::Decode { column, value: s.to_owned() })
}

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

// ─── Belt ────────────────────────────────────────────────────────────────────

pub fn encode_belt(belt: Option<Belt>) -> (Option<&'static str>, Option<i64>) {
  match belt {
    Some(b) => (Some(b.color.as_str()), Some(i64::from(b.degree))),
    None => (None, None),
  }
}

fn decode_belt(
  column: &'static str,
  color: Option<String>,
  degree: Option<i64>,
) -> Result<Option<Belt>> {
  match (color, degree) {
    (Some(color), Some(degree)) => {
      let color: BeltColor = decode_enum(column, &color)?;
      let degree = u8::try_from(degree).map_err(|_| Error::Decode {
        column,
        value: degree.to_string(),
      })?;
      Ok(Some(Belt { color, degree }))
    }
    (None, None) => Ok(None),
    (color, degree) => Err(Error::Decode {
      column,
      value: format!("{color:?}/{degree:?}"),
    }),
  }
}

// ─── Raw rows ────────────────────────────────────────────────────────────────
//
// Each `Raw*` struct mirrors a SELECT column list exactly; `from_row` reads the
// columns by position and `into_*` decodes them outside rusqlite's error type.

pub const STUDENT_COLUMNS: &str = "student_id, name, email, status, \
   monthly_fee_cents, belt, belt_degree, created_at, updated_at";

pub struct RawStudent {
  pub student_id:        String,
  pub name:              String,
  pub email:             Option<String>,
  pub status:            String,
  pub monthly_fee_cents: Option<i64>,
  pub belt:              Option<String>,
  pub belt_degree:       Option<i64>,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawStudent {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      student_id:        row.get(0)?,
      name:              row.get(1)?,
      email:             row.get(2)?,
      status:            row.get(3)?,
      monthly_fee_cents: row.get(4)?,
      belt:              row.get(5)?,
      belt_degree:       row.get(6)?,
      created_at:        row.get(7)?,
      updated_at:        row.get(8)?,
    })
  }

  pub fn into_student(self) -> Result<Student> {
    Ok(Student {
      student_id:        decode_uuid(&self.student_id)?,
      name:              self.name,
      email:             self.email,
      status:            decode_enum("students.status", &self.status)?,
      monthly_fee_cents: self.monthly_fee_cents,
      belt:              decode_belt("students.belt", self.belt, self.belt_degree)?,
      created_at:        decode_dt(&self.created_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}

pub const PROMOTION_COLUMNS: &str = "promotion_id, student_id, promoted_by, \
   previous_belt, previous_degree, new_belt, new_degree, promotion_date, \
   promotion_type, notes, recorded_at";

pub struct RawPromotion {
  pub promotion_id:    String,
  pub student_id:      String,
  pub promoted_by:     String,
  pub previous_belt:   Option<String>,
  pub previous_degree: Option<i64>,
  pub new_belt:        String,
  pub new_degree:      i64,
  pub promotion_date:  String,
  pub promotion_type:  String,
  pub notes:           Option<String>,
  pub recorded_at:     String,
}

impl RawPromotion {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      promotion_id:    row.get(0)?,
      student_id:      row.get(1)?,
      promoted_by:     row.get(2)?,
      previous_belt:   row.get(3)?,
      previous_degree: row.get(4)?,
      new_belt:        row.get(5)?,
      new_degree:      row.get(6)?,
      promotion_date:  row.get(7)?,
      promotion_type:  row.get(8)?,
      notes:           row.get(9)?,
      recorded_at:     row.get(10)?,
    })
  }

  pub fn into_promotion(self) -> Result<BeltPromotion> {
    let new_belt = decode_belt(
      "belt_promotions.new_belt",
      Some(self.new_belt),
      Some(self.new_degree),
    )?
    .ok_or(Error::Decode {
      column: "belt_promotions.new_belt",
      value:  String::new(),
    })?;

    Ok(BeltPromotion {
      promotion_id: decode_uuid(&self.promotion_id)?,
      student_id: decode_uuid(&self.student_id)?,
      promoted_by: decode_uuid(&self.promoted_by)?,
      previous_belt: decode_belt(
        "belt_promotions.previous_belt",
        self.previous_belt,
        self.previous_degree,
      )?,
      new_belt,
      promotion_date: decode_date(&self.promotion_date)?,
      promotion_type: decode_enum(
        "belt_promotions.promotion_type",
        &self.promotion_type,
      )?,
      notes: self.notes,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

pub const CLASS_COLUMNS: &str =
  "class_id, name, teacher_id, max_students, status, created_at";

pub struct RawClass {
  pub class_id:     String,
  pub name:         String,
  pub teacher_id:   Option<String>,
  pub max_students: i64,
  pub status:       String,
  pub created_at:   String,
}

impl RawClass {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      class_id:     row.get(0)?,
      name:         row.get(1)?,
      teacher_id:   row.get(2)?,
      max_students: row.get(3)?,
      status:       row.get(4)?,
      created_at:   row.get(5)?,
    })
  }

  pub fn into_class(self) -> Result<Class> {
    Ok(Class {
      class_id:     decode_uuid(&self.class_id)?,
      name:         self.name,
      teacher_id:   decode_opt_uuid(self.teacher_id)?,
      max_students: u32::try_from(self.max_students).map_err(|_| {
        Error::Decode {
          column: "classes.max_students",
          value:  self.max_students.to_string(),
        }
      })?,
      status:       decode_enum("classes.status", &self.status)?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

pub const ENROLLMENT_COLUMNS: &str =
  "enrollment_id, class_id, student_id, status, enrolled_at";

pub struct RawEnrollment {
  pub enrollment_id: String,
  pub class_id:      String,
  pub student_id:    String,
  pub status:        String,
  pub enrolled_at:   String,
}

impl RawEnrollment {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      enrollment_id: row.get(0)?,
      class_id:      row.get(1)?,
      student_id:    row.get(2)?,
      status:        row.get(3)?,
      enrolled_at:   row.get(4)?,
    })
  }

  pub fn into_enrollment(self) -> Result<Enrollment> {
    Ok(Enrollment {
      enrollment_id: decode_uuid(&self.enrollment_id)?,
      class_id:      decode_uuid(&self.class_id)?,
      student_id:    decode_uuid(&self.student_id)?,
      status:        decode_enum("class_enrollments.status", &self.status)?,
      enrolled_at:   decode_dt(&self.enrolled_at)?,
    })
  }
}

pub const PAYMENT_COLUMNS: &str = "payment_id, student_id, amount_cents, \
   due_date, reference_month, status, paid_at, created_at";

pub struct RawPayment {
  pub payment_id:      String,
  pub student_id:      String,
  pub amount_cents:    i64,
  pub due_date:        String,
  pub reference_month: String,
  pub status:          String,
  pub paid_at:         Option<String>,
  pub created_at:      String,
}

impl RawPayment {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      payment_id:      row.get(0)?,
      student_id:      row.get(1)?,
      amount_cents:    row.get(2)?,
      due_date:        row.get(3)?,
      reference_month: row.get(4)?,
      status:          row.get(5)?,
      paid_at:         row.get(6)?,
      created_at:      row.get(7)?,
    })
  }

  pub fn into_payment(self) -> Result<Payment> {
    Ok(Payment {
      payment_id:      decode_uuid(&self.payment_id)?,
      student_id:      decode_uuid(&self.student_id)?,
      amount_cents:    self.amount_cents,
      due_date:        decode_date(&self.due_date)?,
      reference_month: ReferenceMonth::of(decode_date(&self.reference_month)?)?,
      status:          decode_enum("payments.status", &self.status)?,
      paid_at:         self.paid_at.as_deref().map(decode_dt).transpose()?,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}
