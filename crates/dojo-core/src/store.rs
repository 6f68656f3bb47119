//! The `AcademyStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `dojo-store-sqlite`).
//! Higher layers (`dojo-api`) depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  billing::{BillingReport, Payment, ReferenceMonth},
  class::{Class, Enrollment, NewClass},
  principal::{LoginRecord, NewStaff, StaffUser},
  promotion::{BeltPromotion, NewPromotion, PromotionOutcome, PromotionPatch},
  student::{NewStudent, Student},
};

// ─── Paging ──────────────────────────────────────────────────────────────────

/// Largest page a caller may request.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// 1-based page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
  #[serde(default = "PageRequest::first")]
  pub page:  u32,
  #[serde(default = "PageRequest::default_limit")]
  pub limit: u32,
}

impl PageRequest {
  fn first() -> u32 { 1 }

  fn default_limit() -> u32 { 20 }

  /// Clamp out-of-range values instead of rejecting them.
  pub fn normalized(self) -> Self {
    Self {
      page:  self.page.max(1),
      limit: self.limit.clamp(1, MAX_PAGE_LIMIT),
    }
  }

  pub fn offset(&self) -> u64 {
    u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
  }
}

impl Default for PageRequest {
  fn default() -> Self {
    Self { page: Self::first(), limit: Self::default_limit() }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub page:  u32,
  pub limit: u32,
  pub total: u64,
}

impl<T> Page<T> {
  pub fn total_pages(&self) -> u64 {
    if self.limit == 0 {
      return 0;
    }
    self.total.div_ceil(u64::from(self.limit))
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Dojo store backend.
///
/// Operations that maintain an invariant across rows (promotions, billing,
/// enrollment) must run their read-then-write sequence atomically: a failure
/// at any step leaves no partial write behind, and two concurrent calls must
/// not both pass a check that only one of them may pass.
///
/// Backend errors must convert into [`crate::Error`] so that domain failures
/// reach the HTTP layer unchanged.
pub trait AcademyStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  // ── Principals ────────────────────────────────────────────────────────

  fn add_staff(
    &self,
    input: NewStaff,
  ) -> impl Future<Output = Result<StaffUser, Self::Error>> + Send + '_;

  /// Look up login credentials: staff by username, then students by email.
  fn find_login<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<LoginRecord>, Self::Error>> + Send + 'a;

  // ── Students ──────────────────────────────────────────────────────────

  fn add_student(
    &self,
    input: NewStudent,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  /// Retrieve a student by UUID. Returns `None` if not found.
  fn get_student(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  fn list_students(
    &self,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<Student>, Self::Error>> + Send + '_;

  /// Delete a student together with their promotions, payments and
  /// enrollments. Returns `false` if the student did not exist.
  fn delete_student(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Belt promotions ───────────────────────────────────────────────────

  /// Record a promotion and overwrite the student's current belt, atomically.
  ///
  /// Fails with `StudentNotFound` or `InvalidState` (student not active).
  fn promote(
    &self,
    input: NewPromotion,
  ) -> impl Future<Output = Result<PromotionOutcome, Self::Error>> + Send + '_;

  /// Edit a promotion. The student's current belt is re-synced only when the
  /// edit changes which promotion (or which belt) is the most recent one.
  fn update_promotion(
    &self,
    id: Uuid,
    patch: PromotionPatch,
  ) -> impl Future<Output = Result<PromotionOutcome, Self::Error>> + Send + '_;

  /// Delete a promotion and recompute the student's current belt from what
  /// remains. Returns the student after recomputation.
  fn delete_promotion(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  /// The student's promotion history, newest first.
  fn list_promotions(
    &self,
    student_id: Uuid,
  ) -> impl Future<Output = Result<Vec<BeltPromotion>, Self::Error>> + Send + '_;

  // ── Classes & enrollment ──────────────────────────────────────────────

  fn add_class(
    &self,
    input: NewClass,
  ) -> impl Future<Output = Result<Class, Self::Error>> + Send + '_;

  fn get_class(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Class>, Self::Error>> + Send + '_;

  /// Active enrollments of a class, oldest first.
  fn list_enrollments(
    &self,
    class_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Enrollment>, Self::Error>> + Send + '_;

  /// Enroll a student, enforcing class capacity and (student, class)
  /// uniqueness.
  fn enroll(
    &self,
    class_id: Uuid,
    student_id: Uuid,
  ) -> impl Future<Output = Result<Enrollment, Self::Error>> + Send + '_;

  /// Mark the active enrollment for the pair inactive.
  fn unenroll(
    &self,
    class_id: Uuid,
    student_id: Uuid,
  ) -> impl Future<Output = Result<Enrollment, Self::Error>> + Send + '_;

  // ── Billing ───────────────────────────────────────────────────────────

  /// Create one pending payment for every active, fee-paying student who has
  /// none for `month`. Calling this again for the same month creates nothing.
  fn generate_monthly(
    &self,
    month: ReferenceMonth,
    due_day: u32,
  ) -> impl Future<Output = Result<BillingReport, Self::Error>> + Send + '_;

  fn payments_for_month(
    &self,
    month: ReferenceMonth,
  ) -> impl Future<Output = Result<Vec<Payment>, Self::Error>> + Send + '_;

  /// Settle a pending or overdue payment.
  fn mark_paid(
    &self,
    payment_id: Uuid,
  ) -> impl Future<Output = Result<Payment, Self::Error>> + Send + '_;
}
