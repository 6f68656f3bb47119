//! Class enrollment transactions.

use chrono::{DateTime, Utc};
use dojo_core::{
  Error as CoreError,
  class::{Enrollment, EnrollmentStatus},
};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior, params};
use uuid::Uuid;

use crate::{
  Result,
  encode::{ENROLLMENT_COLUMNS, RawEnrollment, encode_dt, encode_uuid},
  error::is_unique_violation,
  people::{get_class, get_student},
};

fn active_count(conn: &Connection, class_id: Uuid) -> Result<u32> {
  let count: i64 = conn.query_row(
    "SELECT COUNT(*) FROM class_enrollments WHERE class_id = ?1 AND status = 'active'",
    params![encode_uuid(class_id)],
    |r| r.get(0),
  )?;
  Ok(u32::try_from(count).unwrap_or(u32::MAX))
}

fn load_pair(
  conn: &Connection,
  class_id: Uuid,
  student_id: Uuid,
) -> Result<Option<Enrollment>> {
  let raw = conn
    .query_row(
      &format!(
        "SELECT {ENROLLMENT_COLUMNS} FROM class_enrollments
         WHERE class_id = ?1 AND student_id = ?2"
      ),
      params![encode_uuid(class_id), encode_uuid(student_id)],
      RawEnrollment::from_row,
    )
    .optional()?;

  raw.map(RawEnrollment::into_enrollment).transpose()
}

/// Checks run in a fixed order (class, capacity, student, duplicate) so the
/// caller always sees the same error for the same state.
pub fn enroll(
  conn: &mut Connection,
  class_id: Uuid,
  student_id: Uuid,
  now: DateTime<Utc>,
) -> Result<Enrollment> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let class = get_class(&tx, class_id)?.ok_or(CoreError::ClassNotFound(class_id))?;
  if !class.is_active() {
    return Err(
      CoreError::InvalidState(format!("class {class_id} is not active")).into(),
    );
  }
  if active_count(&tx, class_id)? >= class.max_students {
    return Err(
      CoreError::CapacityExceeded { class_id, max_students: class.max_students }
        .into(),
    );
  }

  let student =
    get_student(&tx, student_id)?.ok_or(CoreError::StudentNotFound(student_id))?;
  if !student.is_active() {
    return Err(
      CoreError::InvalidState(format!(
        "student {student_id} is {} and cannot be enrolled",
        student.status.as_str()
      ))
      .into(),
    );
  }

  if let Some(existing) = load_pair(&tx, class_id, student_id)? {
    let message = match existing.status {
      EnrollmentStatus::Active => {
        format!("student {student_id} is already enrolled in class {class_id}")
      }
      EnrollmentStatus::Inactive => format!(
        "student {student_id} has a previous enrollment in class {class_id}"
      ),
    };
    return Err(CoreError::Conflict(message).into());
  }

  let enrollment = Enrollment {
    enrollment_id: Uuid::new_v4(),
    class_id,
    student_id,
    status: EnrollmentStatus::Active,
    enrolled_at: now,
  };

  insert(&tx, &enrollment)?;

  tx.commit()?;
  Ok(enrollment)
}

/// Insert `enrollment`. The pair's UNIQUE index is the final word when a
/// concurrent writer got past the duplicate check first.
pub fn insert(conn: &Connection, enrollment: &Enrollment) -> Result<()> {
  let inserted = conn.execute(
    "INSERT INTO class_enrollments (enrollment_id, class_id, student_id, status, enrolled_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    params![
      encode_uuid(enrollment.enrollment_id),
      encode_uuid(enrollment.class_id),
      encode_uuid(enrollment.student_id),
      <&str>::from(enrollment.status),
      encode_dt(enrollment.enrolled_at),
    ],
  );
  match inserted {
    Ok(_) => Ok(()),
    Err(e) if is_unique_violation(&e) => Err(
      CoreError::Conflict(format!(
        "student {} is already enrolled in class {}",
        enrollment.student_id, enrollment.class_id
      ))
      .into(),
    ),
    Err(e) => Err(e.into()),
  }
}

pub fn unenroll(
  conn: &mut Connection,
  class_id: Uuid,
  student_id: Uuid,
) -> Result<Enrollment> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let updated = tx.execute(
    "UPDATE class_enrollments SET status = 'inactive'
     WHERE class_id = ?1 AND student_id = ?2 AND status = 'active'",
    params![encode_uuid(class_id), encode_uuid(student_id)],
  )?;
  if updated == 0 {
    return Err(CoreError::EnrollmentNotFound { class_id, student_id }.into());
  }

  let enrollment = load_pair(&tx, class_id, student_id)?
    .ok_or(CoreError::EnrollmentNotFound { class_id, student_id })?;
  tx.commit()?;
  Ok(enrollment)
}

pub fn list_active(conn: &Connection, class_id: Uuid) -> Result<Vec<Enrollment>> {
  if get_class(conn, class_id)?.is_none() {
    return Err(CoreError::ClassNotFound(class_id).into());
  }

  let mut stmt = conn.prepare(&format!(
    "SELECT {ENROLLMENT_COLUMNS} FROM class_enrollments
     WHERE class_id = ?1 AND status = 'active'
     ORDER BY rowid"
  ))?;
  let raws = stmt
    .query_map(params![encode_uuid(class_id)], RawEnrollment::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws.into_iter().map(RawEnrollment::into_enrollment).collect()
}
