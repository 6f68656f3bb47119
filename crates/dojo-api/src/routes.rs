//! The route table.
//!
//! Each route pairs a method and a path pattern with the roles allowed to call
//! it. Fixed segments match by string equality; `:name` segments capture any
//! non-empty segment. The table is scanned once, in order, per request.

use axum::http::Method;
use dojo_core::principal::Role;
use uuid::Uuid;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteId {
  Health,
  Login,
  Me,
  ListStudents,
  CreateStudent,
  GetStudent,
  DeleteStudent,
  ListPromotions,
  CreateClass,
  GetClass,
  ListEnrollments,
  Enroll,
  Unenroll,
  EnrollSelf,
  UnenrollSelf,
  Promote,
  UpdatePromotion,
  DeletePromotion,
  GenerateMonthly,
  ListPayments,
  MarkPaid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
  Public,
  Roles(&'static [Role]),
}

#[derive(Debug)]
pub struct Route {
  pub id:      RouteId,
  pub method:  Method,
  pub pattern: &'static str,
  pub access:  Access,
}

const ALL: &[Role] = &[Role::Admin, Role::Teacher, Role::Receptionist, Role::Student];
const STAFF: &[Role] = Role::STAFF;
const ADMIN: &[Role] = &[Role::Admin];
const FRONT_DESK: &[Role] = &[Role::Admin, Role::Receptionist];
const INSTRUCTORS: &[Role] = &[Role::Admin, Role::Teacher];
const STUDENT: &[Role] = &[Role::Student];

macro_rules! route {
  ($method:ident $pattern:literal => $id:ident, $access:expr) => {
    Route {
      id:      RouteId::$id,
      method:  Method::$method,
      pattern: $pattern,
      access:  $access,
    }
  };
}

pub static ROUTES: [Route; 21] = [
  route!(GET    "/health"                    => Health,          Access::Public),
  route!(POST   "/auth/login"                => Login,           Access::Public),
  route!(GET    "/auth/me"                   => Me,              Access::Roles(ALL)),
  route!(GET    "/students"                  => ListStudents,    Access::Roles(STAFF)),
  route!(POST   "/students"                  => CreateStudent,   Access::Roles(FRONT_DESK)),
  route!(GET    "/students/:id"              => GetStudent,      Access::Roles(STAFF)),
  route!(DELETE "/students/:id"              => DeleteStudent,   Access::Roles(ADMIN)),
  route!(GET    "/students/:id/promotions"   => ListPromotions,  Access::Roles(STAFF)),
  route!(POST   "/classes"                   => CreateClass,     Access::Roles(ADMIN)),
  route!(GET    "/classes/:id"               => GetClass,        Access::Roles(ALL)),
  route!(GET    "/classes/:id/enrollments"   => ListEnrollments, Access::Roles(STAFF)),
  route!(POST   "/classes/:id/enroll"        => Enroll,          Access::Roles(STAFF)),
  route!(POST   "/classes/:id/unenroll"      => Unenroll,        Access::Roles(STAFF)),
  route!(POST   "/me/classes/:id/enroll"     => EnrollSelf,      Access::Roles(STUDENT)),
  route!(POST   "/me/classes/:id/unenroll"   => UnenrollSelf,    Access::Roles(STUDENT)),
  route!(POST   "/belts/promote"             => Promote,         Access::Roles(INSTRUCTORS)),
  route!(PUT    "/belts/promotions/:id"      => UpdatePromotion, Access::Roles(INSTRUCTORS)),
  route!(DELETE "/belts/promotions/:id"      => DeletePromotion, Access::Roles(ADMIN)),
  route!(POST   "/payments/generate-monthly" => GenerateMonthly, Access::Roles(FRONT_DESK)),
  route!(GET    "/payments"                  => ListPayments,    Access::Roles(FRONT_DESK)),
  route!(POST   "/payments/:id/pay"          => MarkPaid,        Access::Roles(FRONT_DESK)),
];

// ─── Path parameters ─────────────────────────────────────────────────────────

/// Segments captured by `:name` placeholders.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PathParams(Vec<(&'static str, String)>);

impl PathParams {
  pub fn get(&self, name: &str) -> Option<&str> {
    self
      .0
      .iter()
      .find(|(k, _)| *k == name)
      .map(|(_, v)| v.as_str())
  }

  /// A captured identifier. Malformed ids are a 400, not a 404.
  pub fn uuid(&self, name: &str) -> Result<Uuid, Error> {
    let raw = self
      .get(name)
      .ok_or_else(|| Error::BadRequest(format!("missing path parameter {name}")))?;
    raw
      .parse()
      .map_err(|_| Error::BadRequest(format!("invalid {name}: {raw:?}")))
  }
}

// ─── Matching ────────────────────────────────────────────────────────────────

fn segments(path: &str) -> impl Iterator<Item = &str> {
  path.trim_matches('/').split('/').filter(|s| !s.is_empty())
}

fn match_pattern(pattern: &'static str, path: &str) -> Option<PathParams> {
  let mut want = segments(pattern);
  let mut have = segments(path);
  let mut params = PathParams::default();

  loop {
    match (want.next(), have.next()) {
      (None, None) => return Some(params),
      (Some(w), Some(h)) => {
        if let Some(name) = w.strip_prefix(':') {
          params.0.push((name, h.to_string()));
        } else if w != h {
          return None;
        }
      }
      _ => return None,
    }
  }
}

/// The first route matching `method` and `path`, with its captures.
pub fn resolve(method: &Method, path: &str) -> Option<(&'static Route, PathParams)> {
  ROUTES.iter().find_map(|route| {
    if route.method != *method {
      return None;
    }
    match_pattern(route.pattern, path).map(|params| (route, params))
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fixed_routes_match_exactly() {
    let (route, params) = resolve(&Method::GET, "/students").unwrap();
    assert_eq!(route.id, RouteId::ListStudents);
    assert_eq!(params, PathParams::default());

    let (route, _) = resolve(&Method::POST, "/payments/generate-monthly").unwrap();
    assert_eq!(route.id, RouteId::GenerateMonthly);
  }

  #[test]
  fn placeholders_capture_segments() {
    let id = Uuid::new_v4();
    let (route, params) =
      resolve(&Method::POST, &format!("/classes/{id}/enroll")).unwrap();
    assert_eq!(route.id, RouteId::Enroll);
    assert_eq!(params.uuid("id").unwrap(), id);
  }

  #[test]
  fn trailing_slash_is_ignored() {
    let (route, _) = resolve(&Method::GET, "/auth/me/").unwrap();
    assert_eq!(route.id, RouteId::Me);
  }

  #[test]
  fn method_is_part_of_the_key() {
    let id = Uuid::new_v4();
    let path = format!("/students/{id}");
    assert_eq!(resolve(&Method::GET, &path).unwrap().0.id, RouteId::GetStudent);
    assert_eq!(resolve(&Method::DELETE, &path).unwrap().0.id, RouteId::DeleteStudent);
    assert!(resolve(&Method::PATCH, &path).is_none());
  }

  #[test]
  fn unknown_paths_do_not_match() {
    assert!(resolve(&Method::GET, "/nope").is_none());
    assert!(resolve(&Method::GET, "/students/a/b/c").is_none());
    assert!(resolve(&Method::GET, "/").is_none());
  }

  #[test]
  fn malformed_uuid_is_bad_request() {
    let (_, params) = resolve(&Method::GET, "/students/not-a-uuid").unwrap();
    assert!(matches!(params.uuid("id"), Err(Error::BadRequest(_))));
  }

  #[test]
  fn public_routes() {
    let public: Vec<_> = ROUTES
      .iter()
      .filter(|r| r.access == Access::Public)
      .map(|r| r.id)
      .collect();
    assert_eq!(public, [RouteId::Health, RouteId::Login]);
  }
}
