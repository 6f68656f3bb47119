//! Bearer-token authentication and role authorisation.

use axum::http::{HeaderMap, header};
use dojo_core::principal::Principal;

use crate::{error::Error, routes::Access, token::TokenIssuer};

/// The raw token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, Error> {
  let value = headers
    .get(header::AUTHORIZATION)
    .ok_or(Error::Unauthenticated("missing bearer token"))?
    .to_str()
    .map_err(|_| Error::Unauthenticated("malformed authorization header"))?;

  let token = value
    .strip_prefix("Bearer ")
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .ok_or(Error::Unauthenticated("malformed authorization header"))?;

  Ok(token)
}

/// Resolve the caller from request headers.
pub fn authenticate(headers: &HeaderMap, tokens: &TokenIssuer) -> Result<Principal, Error> {
  let token = bearer_token(headers)?;
  tokens.verify(token)
}

/// Accept or reject an authenticated principal against a route's access rule.
pub fn authorize(principal: &Principal, access: Access) -> Result<(), Error> {
  match access {
    Access::Public => Ok(()),
    Access::Roles(allowed) if principal.has_role(allowed) => Ok(()),
    Access::Roles(_) => {
      tracing::debug!(
        principal = %principal.id,
        role = principal.role.as_str(),
        "role not permitted for route"
      );
      Err(Error::Forbidden)
    }
  }
}
