//! Route handlers.
//!
//! Each handler receives the shared state and the routed [`Call`] and returns
//! a response in the success envelope, or an [`Error`] the dispatcher renders.
//!
//! [`Call`]: crate::dispatch::Call
//! [`Error`]: crate::error::Error

pub mod auth;
pub mod belts;
pub mod classes;
pub mod payments;
pub mod students;

use axum::response::Response;
use serde_json::json;

use crate::envelope;

/// `GET /health`
pub fn health() -> Response { envelope::ok(json!({ "status": "ok" })) }
