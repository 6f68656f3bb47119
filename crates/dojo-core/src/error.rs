//! Error types for `dojo-core`.
//!
//! These are the domain failures every store backend reports. The HTTP layer
//! maps each variant to a status code without reinterpreting it.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Validation(String),

  #[error("student not found: {0}")]
  StudentNotFound(Uuid),

  #[error("class not found: {0}")]
  ClassNotFound(Uuid),

  #[error("promotion not found: {0}")]
  PromotionNotFound(Uuid),

  #[error("payment not found: {0}")]
  PaymentNotFound(Uuid),

  #[error("no active enrollment of student {student_id} in class {class_id}")]
  EnrollmentNotFound { class_id: Uuid, student_id: Uuid },

  #[error("{0}")]
  InvalidState(String),

  #[error("class {class_id} is full ({max_students} students)")]
  CapacityExceeded { class_id: Uuid, max_students: u32 },

  #[error("{0}")]
  Conflict(String),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Whether this error names a missing entity.
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::StudentNotFound(_)
        | Self::ClassNotFound(_)
        | Self::PromotionNotFound(_)
        | Self::PaymentNotFound(_)
        | Self::EnrollmentNotFound { .. }
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
