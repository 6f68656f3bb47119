//! [`SqliteStore`]: the SQLite implementation of [`AcademyStore`].

use std::path::Path;

use chrono::Utc;
use dojo_core::{
  billing::{BillingReport, Payment, ReferenceMonth},
  class::{Class, Enrollment, NewClass},
  principal::{LoginRecord, NewStaff, StaffUser},
  promotion::{BeltPromotion, NewPromotion, PromotionOutcome, PromotionPatch},
  store::{AcademyStore, Page, PageRequest},
  student::{NewStudent, Student},
};
use uuid::Uuid;

use crate::{Result, belts, billing, enrollment, people, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Dojo academy store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All calls are
/// serialised onto the connection's thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, used by the tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` on the connection thread, keeping domain errors in our own
  /// error type instead of tunnelling them through `tokio_rusqlite::Error`.
  async fn run<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&mut rusqlite::Connection) -> Result<T> + Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }
}

// ─── AcademyStore impl ───────────────────────────────────────────────────────

impl AcademyStore for SqliteStore {
  type Error = crate::Error;

  // ── Principals ────────────────────────────────────────────────────────────

  async fn add_staff(&self, input: NewStaff) -> Result<StaffUser> {
    let now = Utc::now();
    self.run(move |conn| people::insert_staff(conn, input, now)).await
  }

  async fn find_login(&self, username: &str) -> Result<Option<LoginRecord>> {
    let username = username.to_owned();
    self.run(move |conn| people::find_login(conn, &username)).await
  }

  // ── Students ──────────────────────────────────────────────────────────────

  async fn add_student(&self, input: NewStudent) -> Result<Student> {
    let now = Utc::now();
    self.run(move |conn| people::insert_student(conn, input, now)).await
  }

  async fn get_student(&self, id: Uuid) -> Result<Option<Student>> {
    self.run(move |conn| people::get_student(conn, id)).await
  }

  async fn list_students(&self, page: PageRequest) -> Result<Page<Student>> {
    self.run(move |conn| people::list_students(conn, page)).await
  }

  async fn delete_student(&self, id: Uuid) -> Result<bool> {
    self.run(move |conn| people::delete_student(conn, id)).await
  }

  // ── Belt promotions ───────────────────────────────────────────────────────

  async fn promote(&self, input: NewPromotion) -> Result<PromotionOutcome> {
    let now = Utc::now();
    self.run(move |conn| belts::promote(conn, input, now)).await
  }

  async fn update_promotion(
    &self,
    id: Uuid,
    patch: PromotionPatch,
  ) -> Result<PromotionOutcome> {
    let now = Utc::now();
    self.run(move |conn| belts::update(conn, id, patch, now)).await
  }

  async fn delete_promotion(&self, id: Uuid) -> Result<Student> {
    let now = Utc::now();
    self.run(move |conn| belts::delete(conn, id, now)).await
  }

  async fn list_promotions(&self, student_id: Uuid) -> Result<Vec<BeltPromotion>> {
    self.run(move |conn| belts::list(conn, student_id)).await
  }

  // ── Classes & enrollment ──────────────────────────────────────────────────

  async fn add_class(&self, input: NewClass) -> Result<Class> {
    let now = Utc::now();
    self.run(move |conn| people::insert_class(conn, input, now)).await
  }

  async fn get_class(&self, id: Uuid) -> Result<Option<Class>> {
    self.run(move |conn| people::get_class(conn, id)).await
  }

  async fn list_enrollments(&self, class_id: Uuid) -> Result<Vec<Enrollment>> {
    self.run(move |conn| enrollment::list_active(conn, class_id)).await
  }

  async fn enroll(&self, class_id: Uuid, student_id: Uuid) -> Result<Enrollment> {
    let now = Utc::now();
    self
      .run(move |conn| enrollment::enroll(conn, class_id, student_id, now))
      .await
  }

  async fn unenroll(&self, class_id: Uuid, student_id: Uuid) -> Result<Enrollment> {
    self
      .run(move |conn| enrollment::unenroll(conn, class_id, student_id))
      .await
  }

  // ── Billing ───────────────────────────────────────────────────────────────

  async fn generate_monthly(
    &self,
    month: ReferenceMonth,
    due_day: u32,
  ) -> Result<BillingReport> {
    let now = Utc::now();
    self
      .run(move |conn| billing::generate(conn, month, due_day, now))
      .await
  }

  async fn payments_for_month(&self, month: ReferenceMonth) -> Result<Vec<Payment>> {
    self.run(move |conn| billing::for_month(conn, month)).await
  }

  async fn mark_paid(&self, payment_id: Uuid) -> Result<Payment> {
    let now = Utc::now();
    self.run(move |conn| billing::mark_paid(conn, payment_id, now)).await
  }
}
