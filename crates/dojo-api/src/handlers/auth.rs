//! Login and identity.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/login` | Body: `{"username":"..","password":".."}` |
//! | `GET`  | `/auth/me` | The principal behind the bearer token |

use axum::response::Response;
use chrono::{DateTime, Utc};
use dojo_core::{principal::Principal, store::AcademyStore};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::verify_password,
  dispatch::Call,
  envelope,
  error::{self, Error},
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  /// Staff username or student email.
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub token:      String,
  pub expires_at: DateTime<Utc>,
  pub principal:  Principal,
}

/// `POST /auth/login`
///
/// Unknown users, inactive accounts and wrong passwords all produce the same
/// 401.
pub async fn login<S: AcademyStore>(
  state: &AppState<S>,
  call: &Call,
) -> Result<Response, Error> {
  let body: LoginBody = call.json()?;

  let record = state
    .store
    .find_login(&body.username)
    .await
    .map_err(error::store)?;

  let Some(record) = record else {
    tracing::debug!(username = %body.username, "login for unknown user");
    return Err(Error::Unauthenticated(INVALID_CREDENTIALS));
  };
  if !record.active || !verify_password(&body.password, &record.password_hash) {
    tracing::debug!(principal = %record.principal.id, "login rejected");
    return Err(Error::Unauthenticated(INVALID_CREDENTIALS));
  }

  let issued = state.tokens.issue(&record.principal)?;
  tracing::info!(
    principal = %record.principal.id,
    role = record.principal.role.as_str(),
    "login succeeded"
  );

  Ok(envelope::ok(LoginResponse {
    token:      issued.token,
    expires_at: issued.expires_at,
    principal:  record.principal,
  }))
}

/// `GET /auth/me`
pub fn me(call: &Call) -> Result<Response, Error> {
  Ok(envelope::ok(call.principal()?))
}
