//! Handlers for `/payments` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/payments/generate-monthly` | Body: `{"reference_month":"2025-03","due_day":10}` |
//! | `GET`  | `/payments` | `?reference_month=2025-03` |
//! | `POST` | `/payments/:id/pay` | Pending or overdue only |

use axum::{http::StatusCode, response::Response};
use dojo_core::{billing::ReferenceMonth, store::AcademyStore};
use serde::Deserialize;

use crate::{
  AppState,
  dispatch::Call,
  envelope::{self, Envelope},
  error::{self, Error},
};

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
  pub reference_month: ReferenceMonth,
  /// Falls back to `[billing] default_due_day`.
  pub due_day:         Option<u32>,
}

/// `POST /payments/generate-monthly`
pub async fn generate<S: AcademyStore>(
  state: &AppState<S>,
  call: &Call,
) -> Result<Response, Error> {
  let body: GenerateBody = call.json()?;
  let due_day = body
    .due_day
    .unwrap_or(state.config.billing.default_due_day);

  let report = state
    .store
    .generate_monthly(body.reference_month, due_day)
    .await
    .map_err(error::store)?;

  if report.is_empty() {
    return Ok(
      Envelope::data(report)
        .with_message("no pending billing for this month")
        .respond(StatusCode::OK),
    );
  }

  tracing::info!(
    month = %report.reference_month,
    generated = report.generated,
    total_cents = report.total_cents,
    "monthly billing generated"
  );
  let message = format!("{} payments generated", report.generated);
  Ok(Envelope::data(report).with_message(message).respond(StatusCode::CREATED))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub reference_month: ReferenceMonth,
}

/// `GET /payments?reference_month=YYYY-MM`
pub async fn list<S: AcademyStore>(
  state: &AppState<S>,
  call: &Call,
) -> Result<Response, Error> {
  let params: ListParams = call.query()?;
  let payments = state
    .store
    .payments_for_month(params.reference_month)
    .await
    .map_err(error::store)?;
  Ok(envelope::ok(payments))
}

/// `POST /payments/:id/pay`
pub async fn mark_paid<S: AcademyStore>(
  state: &AppState<S>,
  call: &Call,
) -> Result<Response, Error> {
  let id = call.params.uuid("id")?;
  let payment = state.store.mark_paid(id).await.map_err(error::store)?;
  tracing::info!(payment = %id, student = %payment.student_id, "payment settled");
  Ok(envelope::ok(payment))
}
