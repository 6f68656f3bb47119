//! Students.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result, belt::Belt};

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
pub enum StudentStatus {
  #[default]
  Active,
  Inactive,
  Suspended,
}

impl StudentStatus {
  pub fn as_str(self) -> &'static str { self.into() }
}

/// A student. `belt` is derived from promotion history and is only ever
/// written by the promotion operations of the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
  pub student_id:        Uuid,
  pub name:              String,
  pub email:             Option<String>,
  pub status:            StudentStatus,
  /// Monthly fee in cents; students without one are never billed.
  pub monthly_fee_cents: Option<i64>,
  pub belt:              Option<Belt>,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

impl Student {
  pub fn is_active(&self) -> bool { self.status == StudentStatus::Active }
}

/// Input to [`crate::store::AcademyStore::add_student`].
#[derive(Debug, Clone)]
pub struct NewStudent {
  pub name:              String,
  pub email:             Option<String>,
  /// PHC string; students without one cannot log in.
  pub password_hash:     Option<String>,
  pub status:            StudentStatus,
  pub monthly_fee_cents: Option<i64>,
}

impl NewStudent {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name:              name.into(),
      email:             None,
      password_hash:     None,
      status:            StudentStatus::default(),
      monthly_fee_cents: None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::Validation("student name must not be empty".into()));
    }
    if let Some(fee) = self.monthly_fee_cents
      && fee < 0
    {
      return Err(Error::Validation("monthly fee must not be negative".into()));
    }
    if let Some(email) = &self.email
      && !email.contains('@')
    {
      return Err(Error::Validation(format!("invalid email address: {email}")));
    }
    Ok(())
  }
}
