//! Classes and enrollments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result};

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
pub enum ClassStatus {
  #[default]
  Active,
  Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
  pub class_id:     Uuid,
  pub name:         String,
  pub teacher_id:   Option<Uuid>,
  /// Maximum number of concurrently active enrollments.
  pub max_students: u32,
  pub status:       ClassStatus,
  pub created_at:   DateTime<Utc>,
}

impl Class {
  pub fn is_active(&self) -> bool { self.status == ClassStatus::Active }
}

/// Input to [`crate::store::AcademyStore::add_class`].
#[derive(Debug, Clone)]
pub struct NewClass {
  pub name:         String,
  pub teacher_id:   Option<Uuid>,
  pub max_students: u32,
  pub status:       ClassStatus,
}

impl NewClass {
  pub fn new(name: impl Into<String>, max_students: u32) -> Self {
    Self {
      name: name.into(),
      teacher_id: None,
      max_students,
      status: ClassStatus::default(),
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::Validation("class name must not be empty".into()));
    }
    if self.max_students == 0 {
      return Err(Error::Validation(
        "max_students must be at least 1".into(),
      ));
    }
    Ok(())
  }
}

// ─── Enrollment ──────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EnrollmentStatus {
  Active,
  Inactive,
}

/// Links a student to a class. Rows are never deleted by unenrolling; they
/// are marked inactive so the history survives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
  pub enrollment_id: Uuid,
  pub class_id:      Uuid,
  pub student_id:    Uuid,
  pub status:        EnrollmentStatus,
  pub enrolled_at:   DateTime<Utc>,
}
