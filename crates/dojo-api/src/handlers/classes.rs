//! Handlers for classes and enrollment.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/classes` | Body: `{"name":"..","max_students":20}` |
//! | `GET`  | `/classes/:id` | |
//! | `GET`  | `/classes/:id/enrollments` | Active enrollments only |
//! | `POST` | `/classes/:id/enroll` | Body: `{"student_id":".."}` |
//! | `POST` | `/classes/:id/unenroll` | Body: `{"student_id":".."}` |
//! | `POST` | `/me/classes/:id/enroll` | The calling student |
//! | `POST` | `/me/classes/:id/unenroll` | The calling student |

use axum::response::Response;
use dojo_core::{
  Error as CoreError,
  class::{ClassStatus, NewClass},
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
pub struct CreateBody {
  pub name:         String,
  pub teacher_id:   Option<Uuid>,
  pub max_students: u32,
  #[serde(default)]
  pub status:       ClassStatus,
}

/// `POST /classes`
pub async fn create<S: AcademyStore>(
  state: &AppState<S>,
  call: &Call,
) -> Result<Response, Error> {
  let body: CreateBody = call.json()?;
  let input = NewClass {
    name:         body.name,
    teacher_id:   body.teacher_id,
    max_students: body.max_students,
    status:       body.status,
  };
  input.validate()?;

  let class = state.store.add_class(input).await.map_err(error::store)?;
  tracing::info!(class = %class.class_id, max = class.max_students, "class created");
  Ok(envelope::created(class))
}

/// `GET /classes/:id`
pub async fn get_one<S: AcademyStore>(
  state: &AppState<S>,
  call: &Call,
) -> Result<Response, Error> {
  let id = call.params.uuid("id")?;
  let class = state
    .store
    .get_class(id)
    .await
    .map_err(error::store)?
    .ok_or(CoreError::ClassNotFound(id))?;
  Ok(envelope::ok(class))
}

/// `GET /classes/:id/enrollments`
pub async fn enrollments<S: AcademyStore>(
  state: &AppState<S>,
  call: &Call,
) -> Result<Response, Error> {
  let id = call.params.uuid("id")?;
  let rows = state.store.list_enrollments(id).await.map_err(error::store)?;
  Ok(envelope::ok(rows))
}

// ─── Enrollment ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EnrollBody {
  pub student_id: Uuid,
}

async fn do_enroll<S: AcademyStore>(
  state: &AppState<S>,
  class_id: Uuid,
  student_id: Uuid,
) -> Result<Response, Error> {
  let enrollment = state
    .store
    .enroll(class_id, student_id)
    .await
    .map_err(error::store)?;
  tracing::info!(class = %class_id, student = %student_id, "enrollment created");
  Ok(
    Envelope::data(enrollment)
      .with_message("student enrolled")
      .respond(axum::http::StatusCode::CREATED),
  )
}

async fn do_unenroll<S: AcademyStore>(
  state: &AppState<S>,
  class_id: Uuid,
  student_id: Uuid,
) -> Result<Response, Error> {
  let enrollment = state
    .store
    .unenroll(class_id, student_id)
    .await
    .map_err(error::store)?;
  tracing::info!(class = %class_id, student = %student_id, "enrollment ended");
  Ok(
    Envelope::data(enrollment)
      .with_message("student unenrolled")
      .respond(axum::http::StatusCode::OK),
  )
}

/// `POST /classes/:id/enroll`
pub async fn enroll<S: AcademyStore>(
  state: &AppState<S>,
  call: &Call,
) -> Result<Response, Error> {
  let class_id = call.params.uuid("id")?;
  let body: EnrollBody = call.json()?;
  do_enroll(state, class_id, body.student_id).await
}

/// `POST /classes/:id/unenroll`
pub async fn unenroll<S: AcademyStore>(
  state: &AppState<S>,
  call: &Call,
) -> Result<Response, Error> {
  let class_id = call.params.uuid("id")?;
  let body: EnrollBody = call.json()?;
  do_unenroll(state, class_id, body.student_id).await
}

/// `POST /me/classes/:id/enroll`
pub async fn enroll_self<S: AcademyStore>(
  state: &AppState<S>,
  call: &Call,
) -> Result<Response, Error> {
  let class_id = call.params.uuid("id")?;
  let student_id = call.principal()?.id;
  do_enroll(state, class_id, student_id).await
}

/// `POST /me/classes/:id/unenroll`
pub async fn unenroll_self<S: AcademyStore>(
  state: &AppState<S>,
  call: &Call,
) -> Result<Response, Error> {
  let class_id = call.params.uuid("id")?;
  let student_id = call.principal()?.id;
  do_unenroll(state, class_id, student_id).await
}
