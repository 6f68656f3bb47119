//! Handlers for belt promotions.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/belts/promote` | Records a promotion by the caller |
//! | `PUT`    | `/belts/promotions/:id` | Partial edit |
//! | `DELETE` | `/belts/promotions/:id` | Recomputes the student's belt |
//! | `GET`    | `/students/:id/promotions` | Newest first |

use axum::{http::StatusCode, response::Response};
use chrono::NaiveDate;
use dojo_core::{
  belt::{Belt, BeltColor},
  promotion::{NewPromotion, PromotionPatch, PromotionType},
  store::AcademyStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  dispatch::Call,
  envelope::{self, Envelope},
  error::{self, Error},
};

#[derive(Debug, Deserialize)]
pub struct PromoteBody {
  pub student_id:     Uuid,
  pub belt:           BeltColor,
  #[serde(default)]
  pub degree:         u8,
  pub promotion_date: Option<NaiveDate>,
  #[serde(default)]
  pub promotion_type: PromotionType,
  pub notes:          Option<String>,
}

/// `POST /belts/promote`
pub async fn promote<S: AcademyStore>(
  state: &AppState<S>,
  call: &Call,
) -> Result<Response, Error> {
  let promoted_by = call.principal()?.id;
  let body: PromoteBody = call.json()?;

  let input = NewPromotion {
    student_id: body.student_id,
    new_belt: Belt { color: body.belt, degree: body.degree },
    promoted_by,
    promotion_date: body.promotion_date,
    promotion_type: body.promotion_type,
    notes: body.notes,
  };

  let outcome = state.store.promote(input).await.map_err(error::store)?;
  tracing::info!(
    student = %outcome.student.student_id,
    promotion = %outcome.promotion.promotion_id,
    belt = outcome.promotion.new_belt.color.as_str(),
    degree = outcome.promotion.new_belt.degree,
    by = %promoted_by,
    "belt promotion recorded"
  );
  Ok(
    Envelope::data(outcome)
      .with_message("promotion recorded")
      .respond(StatusCode::CREATED),
  )
}

/// `PUT /belts/promotions/:id`
pub async fn update<S: AcademyStore>(
  state: &AppState<S>,
  call: &Call,
) -> Result<Response, Error> {
  let id = call.params.uuid("id")?;
  let patch: PromotionPatch = call.json()?;

  let outcome = state
    .store
    .update_promotion(id, patch)
    .await
    .map_err(error::store)?;
  tracing::info!(promotion = %id, student = %outcome.student.student_id, "belt promotion updated");
  Ok(envelope::ok(outcome))
}

/// `DELETE /belts/promotions/:id`
pub async fn delete<S: AcademyStore>(
  state: &AppState<S>,
  call: &Call,
) -> Result<Response, Error> {
  let id = call.params.uuid("id")?;
  let student = state.store.delete_promotion(id).await.map_err(error::store)?;
  tracing::info!(promotion = %id, student = %student.student_id, "belt promotion deleted");
  Ok(
    Envelope::data(student)
      .with_message("promotion deleted")
      .respond(StatusCode::OK),
  )
}

/// `GET /students/:id/promotions`
pub async fn list<S: AcademyStore>(
  state: &AppState<S>,
  call: &Call,
) -> Result<Response, Error> {
  let student_id = call.params.uuid("id")?;
  let history = state
    .store
    .list_promotions(student_id)
    .await
    .map_err(error::store)?;
  Ok(envelope::ok(history))
}
