//! Principals: the authenticated identities attached to a request.
//!
//! A principal is either a staff member or a student. The projection carried
//! through a request never contains password material.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};
use uuid::Uuid;

// ─── Roles ───────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Admin,
  Teacher,
  Receptionist,
  Student,
}

impl Role {
  /// Every role a staff account may hold.
  pub const STAFF: &'static [Role] =
    &[Role::Admin, Role::Teacher, Role::Receptionist];

  pub fn as_str(self) -> &'static str { self.into() }

  pub fn is_staff(self) -> bool { !matches!(self, Role::Student) }
}

/// Which table a principal was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
  Staff,
  Student,
}

// ─── Principal ───────────────────────────────────────────────────────────────

/// The request-scoped identity reconstructed from a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
  pub id:   Uuid,
  pub name: String,
  pub role: Role,
  pub kind: PrincipalKind,
}

impl Principal {
  /// Whether `role` and `kind` agree: students are always `Role::Student`
  /// and staff never are.
  pub fn is_consistent(&self) -> bool {
    match self.kind {
      PrincipalKind::Staff => self.role.is_staff(),
      PrincipalKind::Student => self.role == Role::Student,
    }
  }

  pub fn has_role(&self, allowed: &[Role]) -> bool {
    allowed.contains(&self.role)
  }
}

// ─── Staff accounts ──────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StaffStatus {
  #[default]
  Active,
  Inactive,
}

/// A staff account as stored, minus the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffUser {
  pub staff_id:     Uuid,
  pub username:     String,
  pub display_name: String,
  pub role:         Role,
  /// Opaque reference to the teacher profile this account belongs to.
  pub teacher_id:   Option<Uuid>,
  pub status:       StaffStatus,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::AcademyStore::add_staff`].
#[derive(Debug, Clone)]
pub struct NewStaff {
  pub username:      String,
  pub display_name:  String,
  /// PHC string produced by argon2.
  pub password_hash: String,
  pub role:          Role,
  pub teacher_id:    Option<Uuid>,
}

/// What the login flow needs to check a presented password.
#[derive(Debug, Clone)]
pub struct LoginRecord {
  pub principal:     Principal,
  pub password_hash: String,
  /// `false` for inactive staff and for inactive or suspended students.
  pub active:        bool,
}
