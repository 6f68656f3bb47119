//! The request dispatcher.
//!
//! Order of checks: public routes skip authentication; otherwise a missing or
//! invalid token is a 401 before any lookup, an unmatched (method, path) is a
//! 404, and a role outside the route's allowed set is a 403.

use axum::{
  body::Body,
  extract::{Query, Request, State},
  http::Uri,
  response::{IntoResponse, Response},
};
use bytes::Bytes;
use dojo_core::{principal::Principal, store::AcademyStore};
use serde::de::DeserializeOwned;

use crate::{
  AppState,
  error::Error,
  gate,
  handlers::{self, auth, belts, classes, payments, students},
  routes::{self, Access, PathParams, RouteId},
};

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Everything a handler needs from the request once it has been routed.
pub struct Call {
  pub principal: Option<Principal>,
  pub params:    PathParams,
  pub uri:       Uri,
  pub body:      Bytes,
}

impl Call {
  /// The authenticated caller. Only public routes lack one.
  pub fn principal(&self) -> Result<&Principal, Error> {
    self
      .principal
      .as_ref()
      .ok_or(Error::Unauthenticated("missing bearer token"))
  }

  pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
    serde_json::from_slice(&self.body).map_err(Error::MalformedBody)
  }

  pub fn query<T: DeserializeOwned>(&self) -> Result<T, Error> {
    Query::<T>::try_from_uri(&self.uri)
      .map(|Query(q)| q)
      .map_err(|e| Error::BadRequest(e.body_text()))
  }
}

async fn collect_body(req: Request<Body>) -> Result<Bytes, Error> {
  axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES)
    .await
    .map_err(|_| Error::PayloadTooLarge)
}

/// The single entry point for every request.
pub async fn dispatch<S>(State(state): State<AppState<S>>, req: Request<Body>) -> Response
where
  S: AcademyStore + 'static,
{
  match route(&state, req).await {
    Ok(res) => res,
    Err(e) => e.into_response(),
  }
}

async fn route<S>(state: &AppState<S>, req: Request<Body>) -> Result<Response, Error>
where
  S: AcademyStore + 'static,
{
  let method = req.method().clone();
  let uri = req.uri().clone();
  let resolved = routes::resolve(&method, uri.path());

  let principal = match resolved {
    Some((route, _)) if route.access == Access::Public => None,
    _ => Some(gate::authenticate(req.headers(), &state.tokens)?),
  };

  let (route, params) = resolved.ok_or_else(|| Error::RouteNotFound {
    method: method.clone(),
    path:   uri.path().to_string(),
  })?;

  if let Some(p) = &principal {
    gate::authorize(p, route.access)?;
  }

  let body = collect_body(req).await?;
  let call = Call { principal, params, uri, body };

  invoke(state, route.id, &call).await
}

async fn invoke<S>(state: &AppState<S>, id: RouteId, call: &Call) -> Result<Response, Error>
where
  S: AcademyStore + 'static,
{
  match id {
    RouteId::Health => Ok(handlers::health()),
    RouteId::Login => auth::login(state, call).await,
    RouteId::Me => auth::me(call),
    RouteId::ListStudents => students::list(state, call).await,
    RouteId::CreateStudent => students::create(state, call).await,
    RouteId::GetStudent => students::get_one(state, call).await,
    RouteId::DeleteStudent => students::delete(state, call).await,
    RouteId::ListPromotions => belts::list(state, call).await,
    RouteId::CreateClass => classes::create(state, call).await,
    RouteId::GetClass => classes::get_one(state, call).await,
    RouteId::ListEnrollments => classes::enrollments(state, call).await,
    RouteId::Enroll => classes::enroll(state, call).await,
    RouteId::Unenroll => classes::unenroll(state, call).await,
    RouteId::EnrollSelf => classes::enroll_self(state, call).await,
    RouteId::UnenrollSelf => classes::unenroll_self(state, call).await,
    RouteId::Promote => belts::promote(state, call).await,
    RouteId::UpdatePromotion => belts::update(state, call).await,
    RouteId::DeletePromotion => belts::delete(state, call).await,
    RouteId::GenerateMonthly => payments::generate(state, call).await,
    RouteId::ListPayments => payments::list(state, call).await,
    RouteId::MarkPaid => payments::mark_paid(state, call).await,
  }
}
