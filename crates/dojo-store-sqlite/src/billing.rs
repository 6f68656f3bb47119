//! Monthly billing generation and payment settlement.

use chrono::{DateTime, Utc};
use dojo_core::{
  Error as CoreError,
  billing::{BilledStudent, BillingReport, Payment, PaymentStatus, ReferenceMonth},
};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior, params};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    PAYMENT_COLUMNS, RawPayment, decode_uuid, encode_date, encode_dt, encode_uuid,
  },
  error::is_unique_violation,
};

/// Bill every active, fee-paying student who has no payment in `month`.
///
/// `payments.reference_month` always holds the first day of the month, so
/// both the existence check and the UNIQUE index compare that one value.
///
/// The candidate query and the inserts share one immediate transaction, and
/// `UNIQUE (student_id, reference_month)` backs the existence check, so a
/// concurrent run cannot bill a student twice.
pub fn generate(
  conn: &mut Connection,
  month: ReferenceMonth,
  due_day: u32,
  now: DateTime<Utc>,
) -> Result<BillingReport> {
  let due_date = month.due_date(due_day)?;
  let month_start = encode_date(month.first_day());

  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let candidates: Vec<(String, String, i64)> = {
    let mut stmt = tx.prepare(
      "SELECT s.student_id, s.name, s.monthly_fee_cents
       FROM students s
       WHERE s.status = 'active'
         AND s.monthly_fee_cents > 0
         AND NOT EXISTS (
           SELECT 1 FROM payments p
           WHERE p.student_id = s.student_id
             AND p.reference_month = ?1
         )
       ORDER BY s.name, s.rowid",
    )?;
    stmt
      .query_map(params![month_start], |r| {
        Ok((r.get(0)?, r.get(1)?, r.get(2)?))
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };

  let mut billed = Vec::with_capacity(candidates.len());
  {
    let mut insert = tx.prepare(
      "INSERT INTO payments (
         payment_id, student_id, amount_cents, due_date,
         reference_month, status, created_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;

    let due_date_str = encode_date(due_date);
    let created_at = encode_dt(now);

    for (student_id, student_name, amount_cents) in candidates {
      let inserted = insert.execute(params![
        encode_uuid(Uuid::new_v4()),
        student_id,
        amount_cents,
        due_date_str,
        month_start,
        PaymentStatus::Pending.as_str(),
        created_at,
      ]);
      match inserted {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {
          return Err(
            CoreError::Conflict(format!(
              "student {student_id} is already billed for {month}"
            ))
            .into(),
          );
        }
        Err(e) => return Err(e.into()),
      }

      billed.push(BilledStudent {
        student_id: decode_uuid(&student_id)?,
        student_name,
        amount_cents,
      });
    }
  }

  tx.commit()?;

  Ok(BillingReport {
    reference_month: month,
    due_date,
    generated: billed.len(),
    total_cents: billed.iter().map(|b| b.amount_cents).sum(),
    payments: billed,
  })
}

pub fn for_month(conn: &Connection, month: ReferenceMonth) -> Result<Vec<Payment>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {PAYMENT_COLUMNS} FROM payments
     WHERE reference_month = ?1
     ORDER BY rowid"
  ))?;
  let raws = stmt
    .query_map(params![encode_date(month.first_day())], RawPayment::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws.into_iter().map(RawPayment::into_payment).collect()
}

fn load(conn: &Connection, id: Uuid) -> Result<Option<Payment>> {
  let raw = conn
    .query_row(
      &format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE payment_id = ?1"),
      params![encode_uuid(id)],
      RawPayment::from_row,
    )
    .optional()?;

  raw.map(RawPayment::into_payment).transpose()
}

pub fn mark_paid(conn: &mut Connection, id: Uuid, now: DateTime<Utc>) -> Result<Payment> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let payment = load(&tx, id)?.ok_or(CoreError::PaymentNotFound(id))?;
  if !payment.status.is_payable() {
    return Err(
      CoreError::InvalidState(format!(
        "payment {id} is {} and cannot be paid",
        payment.status.as_str()
      ))
      .into(),
    );
  }

  tx.execute(
    "UPDATE payments SET status = ?2, paid_at = ?3 WHERE payment_id = ?1",
    params![encode_uuid(id), PaymentStatus::Paid.as_str(), encode_dt(now)],
  )?;

  let payment = load(&tx, id)?.ok_or(CoreError::PaymentNotFound(id))?;
  tx.commit()?;
  Ok(payment)
}
