//! Handlers for `/students` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/students` | `?page=&limit=`, limit capped at 100 |
//! | `POST`   | `/students` | Optional `password` enables student login |
//! | `GET`    | `/students/:id` | 404 if not found |
//! | `DELETE` | `/students/:id` | Removes promotions, payments, enrollments |

use axum::response::Response;
use dojo_core::{
  Error as CoreError,
  store::{AcademyStore, PageRequest},
  student::{NewStudent, StudentStatus},
};
use serde::Deserialize;

use crate::{
  AppState,
  auth::hash_password,
  dispatch::Call,
  envelope::{self, Envelope},
  error::{self, Error},
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /students`
pub async fn list<S: AcademyStore>(
  state: &AppState<S>,
  call: &Call,
) -> Result<Response, Error> {
  let page: PageRequest = call.query()?;
  let page = state
    .store
    .list_students(page.normalized())
    .await
    .map_err(error::store)?;
  Ok(envelope::paged(page))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:              String,
  pub email:             Option<String>,
  pub password:          Option<String>,
  #[serde(default)]
  pub status:            StudentStatus,
  pub monthly_fee_cents: Option<i64>,
}

/// `POST /students`
pub async fn create<S: AcademyStore>(
  state: &AppState<S>,
  call: &Call,
) -> Result<Response, Error> {
  let body: CreateBody = call.json()?;

  if body.password.is_some() && body.email.is_none() {
    return Err(
      CoreError::Validation("a student login needs an email address".into()).into(),
    );
  }
  let password_hash = body.password.as_deref().map(hash_password).transpose()?;

  let input = NewStudent {
    name: body.name,
    email: body.email,
    password_hash,
    status: body.status,
    monthly_fee_cents: body.monthly_fee_cents,
  };
  input.validate()?;

  let student = state.store.add_student(input).await.map_err(error::store)?;
  tracing::info!(student = %student.student_id, "student created");
  Ok(envelope::created(student))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /students/:id`
pub async fn get_one<S: AcademyStore>(
  state: &AppState<S>,
  call: &Call,
) -> Result<Response, Error> {
  let id = call.params.uuid("id")?;
  let student = state
    .store
    .get_student(id)
    .await
    .map_err(error::store)?
    .ok_or(CoreError::StudentNotFound(id))?;
  Ok(envelope::ok(student))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /students/:id`
pub async fn delete<S: AcademyStore>(
  state: &AppState<S>,
  call: &Call,
) -> Result<Response, Error> {
  let id = call.params.uuid("id")?;
  if !state.store.delete_student(id).await.map_err(error::store)? {
    return Err(CoreError::StudentNotFound(id).into());
  }
  tracing::info!(student = %id, "student deleted");
  Ok(Envelope::message("student deleted").respond(axum::http::StatusCode::OK))
}
