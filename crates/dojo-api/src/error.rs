//! Error types and axum `IntoResponse` implementation.
//!
//! Every failure is rendered in the same envelope:
//! `{ "success": false, "error": <kind>, "message": <text>, "details"?: [..] }`.

use axum::{
  Json,
  http::{HeaderValue, Method, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain failure reported by the store, passed through unchanged.
  #[error(transparent)]
  Domain(#[from] dojo_core::Error),

  #[error("{0}")]
  Unauthenticated(&'static str),

  #[error("insufficient permissions")]
  Forbidden,

  #[error("no route for {method} {path}")]
  RouteNotFound { method: Method, path: String },

  #[error("{0}")]
  BadRequest(String),

  #[error("malformed request body")]
  MalformedBody(#[source] serde_json::Error),

  #[error("request body too large")]
  PayloadTooLarge,

  #[error("internal error: {0}")]
  Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
  success: bool,
  error:   &'a str,
  message: String,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  details: Vec<String>,
}

impl Error {
  fn status_and_kind(&self) -> (StatusCode, &'static str) {
    use dojo_core::Error as D;

    match self {
      Error::Domain(e) => match e {
        D::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        D::InvalidState(_) => (StatusCode::BAD_REQUEST, "invalid_state"),
        D::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
        D::CapacityExceeded { .. } => (StatusCode::CONFLICT, "capacity_exceeded"),
        D::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        e if e.is_not_found() => (StatusCode::NOT_FOUND, "not_found"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
      },
      Error::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "unauthenticated"),
      Error::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
      Error::RouteNotFound { .. } => (StatusCode::NOT_FOUND, "route_not_found"),
      Error::BadRequest(_) | Error::MalformedBody(_) => {
        (StatusCode::BAD_REQUEST, "bad_request")
      }
      Error::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
      Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    }
  }

  pub fn status(&self) -> StatusCode { self.status_and_kind().0 }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, kind) = self.status_and_kind();

    let (message, details) = match &self {
      _ if status == StatusCode::INTERNAL_SERVER_ERROR => {
        tracing::error!(error = %self, "request failed");
        ("internal server error".to_string(), Vec::new())
      }
      Error::MalformedBody(e) => (self.to_string(), vec![e.to_string()]),
      Error::Domain(dojo_core::Error::CapacityExceeded { max_students, .. }) => {
        (self.to_string(), vec![format!("max_students: {max_students}")])
      }
      _ => (self.to_string(), Vec::new()),
    };

    let body = ErrorBody { success: false, error: kind, message, details };
    let mut res = (status, Json(body)).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    res
  }
}

/// Lift a store error into the domain taxonomy.
pub fn store<E: Into<dojo_core::Error>>(err: E) -> Error { Error::Domain(err.into()) }
