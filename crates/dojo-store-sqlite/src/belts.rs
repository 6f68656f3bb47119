//! Belt promotion transactions.
//!
//! Every write to `belt_promotions` is followed, in the same transaction, by a
//! recompute of `students.belt` via [`dojo_core::promotion::current_belt`].

use chrono::{DateTime, Utc};
use dojo_core::{
  Error as CoreError,
  belt::Belt,
  promotion::{
    BeltPromotion, NewPromotion, PromotionOutcome, PromotionPatch, current_belt,
    newest,
  },
  student::Student,
};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior, params};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    PROMOTION_COLUMNS, RawPromotion, encode_belt, encode_date, encode_dt,
    encode_uuid,
  },
  people::get_student,
};

// ─── Row helpers ─────────────────────────────────────────────────────────────

fn load_promotion(conn: &Connection, id: Uuid) -> Result<Option<BeltPromotion>> {
  let raw = conn
    .query_row(
      &format!("SELECT {PROMOTION_COLUMNS} FROM belt_promotions WHERE promotion_id = ?1"),
      params![encode_uuid(id)],
      RawPromotion::from_row,
    )
    .optional()?;

  raw.map(RawPromotion::into_promotion).transpose()
}

/// A student's promotions in recording order (oldest insert first), the order
/// [`newest`] expects.
fn history(conn: &Connection, student_id: Uuid) -> Result<Vec<BeltPromotion>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {PROMOTION_COLUMNS} FROM belt_promotions
     WHERE student_id = ?1
     ORDER BY rowid"
  ))?;
  let raws = stmt
    .query_map(params![encode_uuid(student_id)], RawPromotion::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws.into_iter().map(RawPromotion::into_promotion).collect()
}

fn insert_promotion(conn: &Connection, p: &BeltPromotion) -> Result<()> {
  let (previous_belt, previous_degree) = encode_belt(p.previous_belt);
  let (new_belt, new_degree) = encode_belt(Some(p.new_belt));

  conn.execute(
    "INSERT INTO belt_promotions (
       promotion_id, student_id, promoted_by, previous_belt, previous_degree,
       new_belt, new_degree, promotion_date, promotion_type, notes, recorded_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    params![
      encode_uuid(p.promotion_id),
      encode_uuid(p.student_id),
      encode_uuid(p.promoted_by),
      previous_belt,
      previous_degree,
      new_belt,
      new_degree,
      encode_date(p.promotion_date),
      p.promotion_type.as_str(),
      p.notes,
      encode_dt(p.recorded_at),
    ],
  )?;
  Ok(())
}

fn save_promotion(conn: &Connection, p: &BeltPromotion) -> Result<()> {
  let (new_belt, new_degree) = encode_belt(Some(p.new_belt));

  conn.execute(
    "UPDATE belt_promotions
     SET new_belt = ?2, new_degree = ?3, promotion_date = ?4,
         promotion_type = ?5, notes = ?6
     WHERE promotion_id = ?1",
    params![
      encode_uuid(p.promotion_id),
      new_belt,
      new_degree,
      encode_date(p.promotion_date),
      p.promotion_type.as_str(),
      p.notes,
    ],
  )?;
  Ok(())
}

fn write_student_belt(
  conn: &Connection,
  student_id: Uuid,
  belt: Option<Belt>,
  now: DateTime<Utc>,
) -> Result<()> {
  let (color, degree) = encode_belt(belt);
  conn.execute(
    "UPDATE students SET belt = ?2, belt_degree = ?3, updated_at = ?4
     WHERE student_id = ?1",
    params![encode_uuid(student_id), color, degree, encode_dt(now)],
  )?;
  Ok(())
}

fn reload_student(conn: &Connection, id: Uuid) -> Result<Student> {
  Ok(get_student(conn, id)?.ok_or(CoreError::StudentNotFound(id))?)
}

// ─── Operations ──────────────────────────────────────────────────────────────

pub fn promote(
  conn: &mut Connection,
  input: NewPromotion,
  now: DateTime<Utc>,
) -> Result<PromotionOutcome> {
  input.new_belt.validate()?;

  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let student = get_student(&tx, input.student_id)?
    .ok_or(CoreError::StudentNotFound(input.student_id))?;
  if !student.is_active() {
    return Err(
      CoreError::InvalidState(format!(
        "student {} is {} and cannot be promoted",
        student.student_id,
        student.status.as_str()
      ))
      .into(),
    );
  }

  let promotion = BeltPromotion {
    promotion_id:   Uuid::new_v4(),
    student_id:     student.student_id,
    promoted_by:    input.promoted_by,
    previous_belt:  student.belt,
    new_belt:       input.new_belt,
    promotion_date: input.promotion_date.unwrap_or_else(|| now.date_naive()),
    promotion_type: input.promotion_type,
    notes:          input.notes,
    recorded_at:    now,
  };
  insert_promotion(&tx, &promotion)?;

  // A back-dated promotion does not displace a later one.
  let belt = current_belt(&history(&tx, student.student_id)?);
  write_student_belt(&tx, student.student_id, belt, now)?;

  let student = reload_student(&tx, student.student_id)?;
  tx.commit()?;

  Ok(PromotionOutcome { promotion, student })
}

pub fn update(
  conn: &mut Connection,
  id: Uuid,
  patch: PromotionPatch,
  now: DateTime<Utc>,
) -> Result<PromotionOutcome> {
  patch.validate()?;

  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let mut promotion =
    load_promotion(&tx, id)?.ok_or(CoreError::PromotionNotFound(id))?;
  let student_id = promotion.student_id;

  let was_newest =
    newest(&history(&tx, student_id)?).map(|p| p.promotion_id) == Some(id);

  patch.apply(&mut promotion);
  save_promotion(&tx, &promotion)?;

  let after = history(&tx, student_id)?;
  let is_newest = newest(&after).map(|p| p.promotion_id) == Some(id);

  // Editing a historical record leaves the current belt alone; only the
  // record that determines (or determined) the view triggers a re-sync.
  if was_newest || is_newest {
    write_student_belt(&tx, student_id, current_belt(&after), now)?;
  }

  let student = reload_student(&tx, student_id)?;
  tx.commit()?;

  Ok(PromotionOutcome { promotion, student })
}

pub fn delete(conn: &mut Connection, id: Uuid, now: DateTime<Utc>) -> Result<Student> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let promotion =
    load_promotion(&tx, id)?.ok_or(CoreError::PromotionNotFound(id))?;

  tx.execute(
    "DELETE FROM belt_promotions WHERE promotion_id = ?1",
    params![encode_uuid(id)],
  )?;

  let remaining = history(&tx, promotion.student_id)?;
  write_student_belt(&tx, promotion.student_id, current_belt(&remaining), now)?;

  let student = reload_student(&tx, promotion.student_id)?;
  tx.commit()?;

  Ok(student)
}

/// Newest first: `promotion_date` descending, later recordings before earlier
/// ones on the same date.
pub fn list(conn: &Connection, student_id: Uuid) -> Result<Vec<BeltPromotion>> {
  if get_student(conn, student_id)?.is_none() {
    return Err(CoreError::StudentNotFound(student_id).into());
  }

  let mut stmt = conn.prepare(&format!(
    "SELECT {PROMOTION_COLUMNS} FROM belt_promotions
     WHERE student_id = ?1
     ORDER BY promotion_date DESC, rowid DESC"
  ))?;
  let raws = stmt
    .query_map(params![encode_uuid(student_id)], RawPromotion::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws.into_iter().map(RawPromotion::into_promotion).collect()
}
