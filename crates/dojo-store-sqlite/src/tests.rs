//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use dojo_core::{
  Error as CoreError,
  belt::{Belt, BeltColor},
  billing::{PaymentStatus, ReferenceMonth},
  class::{EnrollmentStatus, NewClass},
  principal::{NewStaff, PrincipalKind, Role},
  promotion::{NewPromotion, PromotionPatch},
  store::{AcademyStore, PageRequest},
  student::{NewStudent, Student, StudentStatus},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn core_err(e: Error) -> CoreError { e.into() }

fn date(s: &str) -> NaiveDate { s.parse().unwrap() }

fn belt(color: BeltColor, degree: u8) -> Belt { Belt { color, degree } }

async fn student(s: &SqliteStore, name: &str) -> Student {
  s.add_student(NewStudent::new(name)).await.unwrap()
}

async fn paying_student(s: &SqliteStore, name: &str, fee: i64) -> Student {
  let mut input = NewStudent::new(name);
  input.monthly_fee_cents = Some(fee);
  s.add_student(input).await.unwrap()
}

// ─── Principals ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn staff_login_lookup() {
  let s = store().await;
  let staff = s
    .add_staff(NewStaff {
      username:      "sensei".into(),
      display_name:  "Sensei Ana".into(),
      password_hash: "$argon2id$fake".into(),
      role:          Role::Teacher,
      teacher_id:    None,
    })
    .await
    .unwrap();

  let login = s.find_login("sensei").await.unwrap().unwrap();
  assert_eq!(login.principal.id, staff.staff_id);
  assert_eq!(login.principal.role, Role::Teacher);
  assert_eq!(login.principal.kind, PrincipalKind::Staff);
  assert!(login.active);
  assert_eq!(login.password_hash, "$argon2id$fake");
}

#[tokio::test]
async fn duplicate_username_is_conflict() {
  let s = store().await;
  let input = NewStaff {
    username:      "front".into(),
    display_name:  "Front Desk".into(),
    password_hash: "x".into(),
    role:          Role::Receptionist,
    teacher_id:    None,
  };
  s.add_staff(input.clone()).await.unwrap();
  let err = core_err(s.add_staff(input).await.unwrap_err());
  assert!(matches!(err, CoreError::Conflict(_)), "{err:?}");
}

#[tokio::test]
async fn student_login_by_email_reports_status() {
  let s = store().await;
  let mut input = NewStudent::new("Rin");
  input.email = Some("rin@example.com".into());
  input.password_hash = Some("hash".into());
  input.status = StudentStatus::Suspended;
  let rin = s.add_student(input).await.unwrap();

  let login = s.find_login("rin@example.com").await.unwrap().unwrap();
  assert_eq!(login.principal.id, rin.student_id);
  assert_eq!(login.principal.role, Role::Student);
  assert!(!login.active);

  assert!(s.find_login("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn staff_usernames_and_student_emails_cannot_collide() {
  let s = store().await;
  let mut rin = NewStudent::new("Rin");
  rin.email = Some("rin@example.com".into());
  rin.password_hash = Some("hash".into());
  let rin = s.add_student(rin).await.unwrap();

  let err = core_err(
    s.add_staff(NewStaff {
      username:      "rin@example.com".into(),
      display_name:  "Impostor".into(),
      password_hash: "x".into(),
      role:          Role::Admin,
      teacher_id:    None,
    })
    .await
    .unwrap_err(),
  );
  assert!(matches!(err, CoreError::Conflict(_)), "{err:?}");
  let login = s.find_login("rin@example.com").await.unwrap().unwrap();
  assert_eq!(login.principal.id, rin.student_id);

  s.add_staff(NewStaff {
    username:      "coach@example.com".into(),
    display_name:  "Coach".into(),
    password_hash: "x".into(),
    role:          Role::Teacher,
    teacher_id:    None,
  })
  .await
  .unwrap();
  let mut shadow = NewStudent::new("Shadow");
  shadow.email = Some("coach@example.com".into());
  let err = core_err(s.add_student(shadow).await.unwrap_err());
  assert!(matches!(err, CoreError::Conflict(_)), "{err:?}");
}

// ─── Students ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_student() {
  let s = store().await;
  let created = student(&s, "Alice").await;
  assert!(created.belt.is_none());

  let fetched = s.get_student(created.student_id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Alice");
  assert_eq!(fetched.status, StudentStatus::Active);

  assert!(s.get_student(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_students_paginates() {
  let s = store().await;
  for name in ["Ava", "Ben", "Cal", "Dee", "Eve"] {
    student(&s, name).await;
  }

  let page = s
    .list_students(PageRequest { page: 2, limit: 2 })
    .await
    .unwrap();
  assert_eq!(page.total, 5);
  assert_eq!(page.total_pages(), 3);
  let names: Vec<_> = page.items.iter().map(|s| s.name.as_str()).collect();
  assert_eq!(names, ["Cal", "Dee"]);
}

#[tokio::test]
async fn delete_student_cascades() {
  let s = store().await;
  let alice = paying_student(&s, "Alice", 10_000).await;
  s.promote(NewPromotion::new(alice.student_id, belt(BeltColor::Blue, 0), Uuid::new_v4()))
    .await
    .unwrap();

  assert!(s.delete_student(alice.student_id).await.unwrap());
  assert!(!s.delete_student(alice.student_id).await.unwrap());

  let err = core_err(s.list_promotions(alice.student_id).await.unwrap_err());
  assert!(matches!(err, CoreError::StudentNotFound(_)));
}

// ─── Belt promotions ─────────────────────────────────────────────────────────

#[tokio::test]
async fn promote_snapshots_previous_and_sets_current() {
  let s = store().await;
  let alice = student(&s, "Alice").await;
  let teacher = Uuid::new_v4();

  let first = s
    .promote(
      NewPromotion::new(alice.student_id, belt(BeltColor::White, 4), teacher)
        .on(date("2023-09-01")),
    )
    .await
    .unwrap();
  assert_eq!(first.promotion.previous_belt, None);
  assert_eq!(first.student.belt, Some(belt(BeltColor::White, 4)));

  let second = s
    .promote(
      NewPromotion::new(alice.student_id, belt(BeltColor::Blue, 0), teacher)
        .on(date("2024-01-15")),
    )
    .await
    .unwrap();
  assert_eq!(second.promotion.previous_belt, Some(belt(BeltColor::White, 4)));
  assert_eq!(second.promotion.promoted_by, teacher);
  assert_eq!(second.student.belt, Some(belt(BeltColor::Blue, 0)));

  let stored = s.get_student(alice.student_id).await.unwrap().unwrap();
  assert_eq!(stored.belt, Some(belt(BeltColor::Blue, 0)));
}

#[tokio::test]
async fn promote_missing_student_is_not_found() {
  let s = store().await;
  let err = core_err(
    s.promote(NewPromotion::new(Uuid::new_v4(), belt(BeltColor::Blue, 0), Uuid::new_v4()))
      .await
      .unwrap_err(),
  );
  assert!(matches!(err, CoreError::StudentNotFound(_)));
}

#[tokio::test]
async fn promote_inactive_student_is_invalid_state_and_writes_nothing() {
  let s = store().await;
  let mut input = NewStudent::new("Idle");
  input.status = StudentStatus::Inactive;
  let idle = s.add_student(input).await.unwrap();

  let err = core_err(
    s.promote(NewPromotion::new(idle.student_id, belt(BeltColor::Blue, 0), Uuid::new_v4()))
      .await
      .unwrap_err(),
  );
  assert!(matches!(err, CoreError::InvalidState(_)));
  assert!(s.list_promotions(idle.student_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn promote_rejects_degree_above_ten() {
  let s = store().await;
  let alice = student(&s, "Alice").await;
  let err = core_err(
    s.promote(NewPromotion::new(alice.student_id, belt(BeltColor::Black, 11), Uuid::new_v4()))
      .await
      .unwrap_err(),
  );
  assert!(matches!(err, CoreError::Validation(_)));
}

#[tokio::test]
async fn backdated_promotion_does_not_displace_newer_one() {
  let s = store().await;
  let alice = student(&s, "Alice").await;
  let by = Uuid::new_v4();

  s.promote(NewPromotion::new(alice.student_id, belt(BeltColor::Purple, 0), by).on(date("2024-06-01")))
    .await
    .unwrap();
  let late_entry = s
    .promote(NewPromotion::new(alice.student_id, belt(BeltColor::Blue, 0), by).on(date("2024-01-01")))
    .await
    .unwrap();

  assert_eq!(late_entry.student.belt, Some(belt(BeltColor::Purple, 0)));
}

#[tokio::test]
async fn deleting_promotions_walks_back_history() {
  let s = store().await;
  let student_s = student(&s, "S").await;
  let by = Uuid::new_v4();

  let p1 = s
    .promote(NewPromotion::new(student_s.student_id, belt(BeltColor::Blue, 0), by).on(date("2024-01-10")))
    .await
    .unwrap();
  let p2 = s
    .promote(NewPromotion::new(student_s.student_id, belt(BeltColor::Purple, 0), by).on(date("2024-06-10")))
    .await
    .unwrap();
  assert_eq!(p2.promotion.previous_belt, Some(belt(BeltColor::Blue, 0)));

  let after_p2 = s.delete_promotion(p2.promotion.promotion_id).await.unwrap();
  assert_eq!(after_p2.belt, Some(belt(BeltColor::Blue, 0)));

  let after_p1 = s.delete_promotion(p1.promotion.promotion_id).await.unwrap();
  assert_eq!(after_p1.belt, None);

  let stored = s.get_student(student_s.student_id).await.unwrap().unwrap();
  assert_eq!(stored.belt, None);
}

#[tokio::test]
async fn deleting_missing_promotion_is_not_found() {
  let s = store().await;
  let err = core_err(s.delete_promotion(Uuid::new_v4()).await.unwrap_err());
  assert!(matches!(err, CoreError::PromotionNotFound(_)));
}

#[tokio::test]
async fn updating_newest_promotion_resyncs_student() {
  let s = store().await;
  let alice = student(&s, "Alice").await;
  let by = Uuid::new_v4();

  s.promote(NewPromotion::new(alice.student_id, belt(BeltColor::Blue, 0), by).on(date("2024-01-01")))
    .await
    .unwrap();
  let newest = s
    .promote(NewPromotion::new(alice.student_id, belt(BeltColor::Blue, 1), by).on(date("2024-03-01")))
    .await
    .unwrap();

  let edited = s
    .update_promotion(
      newest.promotion.promotion_id,
      PromotionPatch {
        degree: Some(2),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert_eq!(edited.promotion.new_belt, belt(BeltColor::Blue, 2));
  assert_eq!(edited.student.belt, Some(belt(BeltColor::Blue, 2)));
}

#[tokio::test]
async fn updating_historical_promotion_leaves_student_alone() {
  let s = store().await;
  let alice = student(&s, "Alice").await;
  let by = Uuid::new_v4();

  let old = s
    .promote(NewPromotion::new(alice.student_id, belt(BeltColor::White, 2), by).on(date("2023-01-01")))
    .await
    .unwrap();
  s.promote(NewPromotion::new(alice.student_id, belt(BeltColor::Blue, 0), by).on(date("2024-01-01")))
    .await
    .unwrap();

  let edited = s
    .update_promotion(
      old.promotion.promotion_id,
      PromotionPatch {
        degree: Some(3),
        notes: Some(Some("corrected stripe count".into())),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert_eq!(edited.promotion.notes.as_deref(), Some("corrected stripe count"));
  assert_eq!(edited.student.belt, Some(belt(BeltColor::Blue, 0)));
}

#[tokio::test]
async fn moving_newest_promotion_back_in_time_recomputes() {
  let s = store().await;
  let alice = student(&s, "Alice").await;
  let by = Uuid::new_v4();

  s.promote(NewPromotion::new(alice.student_id, belt(BeltColor::Blue, 0), by).on(date("2024-01-01")))
    .await
    .unwrap();
  let newest = s
    .promote(NewPromotion::new(alice.student_id, belt(BeltColor::Purple, 0), by).on(date("2024-06-01")))
    .await
    .unwrap();

  let edited = s
    .update_promotion(
      newest.promotion.promotion_id,
      PromotionPatch {
        promotion_date: Some(date("2023-06-01")),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert_eq!(edited.student.belt, Some(belt(BeltColor::Blue, 0)));
}

#[tokio::test]
async fn list_promotions_is_newest_first() {
  let s = store().await;
  let alice = student(&s, "Alice").await;
  let by = Uuid::new_v4();

  for (d, deg) in [("2024-03-01", 1), ("2024-01-01", 0), ("2024-06-01", 2)] {
    s.promote(NewPromotion::new(alice.student_id, belt(BeltColor::Blue, deg), by).on(date(d)))
      .await
      .unwrap();
  }

  let listed = s.list_promotions(alice.student_id).await.unwrap();
  let degrees: Vec<_> = listed.iter().map(|p| p.new_belt.degree).collect();
  assert_eq!(degrees, [2, 1, 0]);
}

#[tokio::test]
async fn same_day_promotions_resolve_to_the_later_record() {
  let s = store().await;
  let alice = student(&s, "Alice").await;
  let by = Uuid::new_v4();
  let day = date("2024-06-01");

  let earlier = s
    .promote(NewPromotion::new(alice.student_id, belt(BeltColor::Blue, 3), by).on(day))
    .await
    .unwrap();
  let later = s
    .promote(NewPromotion::new(alice.student_id, belt(BeltColor::Blue, 4), by).on(day))
    .await
    .unwrap();
  assert_eq!(later.student.belt, Some(belt(BeltColor::Blue, 4)));

  // Editing the earlier same-day record does not take the belt over.
  let edited = s
    .update_promotion(
      earlier.promotion.promotion_id,
      PromotionPatch {
        degree: Some(2),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert_eq!(edited.student.belt, Some(belt(BeltColor::Blue, 4)));

  // Editing the later one re-syncs from it.
  let edited = s
    .update_promotion(
      later.promotion.promotion_id,
      PromotionPatch {
        degree: Some(5),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert_eq!(edited.student.belt, Some(belt(BeltColor::Blue, 5)));

  let after = s.delete_promotion(later.promotion.promotion_id).await.unwrap();
  assert_eq!(after.belt, Some(belt(BeltColor::Blue, 2)));
}

#[tokio::test]
async fn null_notes_patch_clears_notes() {
  let s = store().await;
  let alice = student(&s, "Alice").await;
  let mut input = NewPromotion::new(alice.student_id, belt(BeltColor::Blue, 0), Uuid::new_v4());
  input.notes = Some("first try".into());
  let recorded = s.promote(input).await.unwrap();

  let edited = s
    .update_promotion(
      recorded.promotion.promotion_id,
      PromotionPatch {
        notes: Some(None),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert_eq!(edited.promotion.notes, None);
  let listed = s.list_promotions(alice.student_id).await.unwrap();
  assert_eq!(listed[0].notes, None);
}

// ─── Enrollment ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn enroll_respects_capacity() {
  let s = store().await;
  let class = s.add_class(NewClass::new("Fundamentals", 2)).await.unwrap();
  let a = student(&s, "A").await;
  let b = student(&s, "B").await;
  let c = student(&s, "C").await;

  s.enroll(class.class_id, a.student_id).await.unwrap();
  s.enroll(class.class_id, b.student_id).await.unwrap();

  let err = core_err(s.enroll(class.class_id, c.student_id).await.unwrap_err());
  assert!(
    matches!(err, CoreError::CapacityExceeded { max_students: 2, .. }),
    "{err:?}"
  );
  assert_eq!(s.list_enrollments(class.class_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn enroll_twice_is_conflict() {
  let s = store().await;
  let class = s.add_class(NewClass::new("Open mat", 10)).await.unwrap();
  let a = student(&s, "A").await;

  s.enroll(class.class_id, a.student_id).await.unwrap();
  let err = core_err(s.enroll(class.class_id, a.student_id).await.unwrap_err());
  assert!(matches!(err, CoreError::Conflict(_)));
}

#[tokio::test]
async fn unenrolled_pair_cannot_reenroll_and_frees_a_seat() {
  let s = store().await;
  let class = s.add_class(NewClass::new("Kids", 1)).await.unwrap();
  let a = student(&s, "A").await;
  let b = student(&s, "B").await;

  s.enroll(class.class_id, a.student_id).await.unwrap();
  let left = s.unenroll(class.class_id, a.student_id).await.unwrap();
  assert_eq!(left.status, EnrollmentStatus::Inactive);

  let err = core_err(s.enroll(class.class_id, a.student_id).await.unwrap_err());
  assert!(matches!(err, CoreError::Conflict(_)));

  // The inactive row does not count against capacity.
  s.enroll(class.class_id, b.student_id).await.unwrap();
}

#[tokio::test]
async fn enroll_checks_class_and_student_state() {
  let s = store().await;
  let mut closed = NewClass::new("Retired", 5);
  closed.status = dojo_core::class::ClassStatus::Inactive;
  let closed = s.add_class(closed).await.unwrap();
  let open = s.add_class(NewClass::new("Open", 5)).await.unwrap();
  let a = student(&s, "A").await;

  let err = core_err(s.enroll(closed.class_id, a.student_id).await.unwrap_err());
  assert!(matches!(err, CoreError::InvalidState(_)));

  let err = core_err(s.enroll(Uuid::new_v4(), a.student_id).await.unwrap_err());
  assert!(matches!(err, CoreError::ClassNotFound(_)));

  let err = core_err(s.enroll(open.class_id, Uuid::new_v4()).await.unwrap_err());
  assert!(matches!(err, CoreError::StudentNotFound(_)));

  let mut suspended = NewStudent::new("Sus");
  suspended.status = StudentStatus::Suspended;
  let sus = s.add_student(suspended).await.unwrap();
  let err = core_err(s.enroll(open.class_id, sus.student_id).await.unwrap_err());
  assert!(matches!(err, CoreError::InvalidState(_)));
}

#[tokio::test]
async fn unenroll_without_active_row_is_not_found() {
  let s = store().await;
  let class = s.add_class(NewClass::new("Open", 5)).await.unwrap();
  let a = student(&s, "A").await;

  let err = core_err(s.unenroll(class.class_id, a.student_id).await.unwrap_err());
  assert!(matches!(err, CoreError::EnrollmentNotFound { .. }));
}

// ─── Billing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn generate_bills_only_unbilled_students() {
  let s = store().await;
  let march = ReferenceMonth::new(2025, 3).unwrap();

  let a = paying_student(&s, "A", 12_000).await;
  paying_student(&s, "B", 15_000).await;
  paying_student(&s, "C", 9_000).await;
  student(&s, "No fee").await;
  let mut inactive = NewStudent::new("Gone");
  inactive.status = StudentStatus::Inactive;
  inactive.monthly_fee_cents = Some(10_000);
  s.add_student(inactive).await.unwrap();

  let report = s.generate_monthly(march, 10).await.unwrap();
  assert_eq!(report.generated, 3);
  assert_eq!(report.total_cents, 36_000);
  let first = s.payments_for_month(march).await.unwrap();
  assert_eq!(first.len(), 3);
  assert!(first.iter().any(|p| p.student_id == a.student_id));

  let again = s.generate_monthly(march, 10).await.unwrap();
  assert!(again.is_empty());
  assert_eq!(s.payments_for_month(march).await.unwrap().len(), 3);
}

#[tokio::test]
async fn generate_with_one_already_billed_creates_two() {
  let s = store().await;
  let march = ReferenceMonth::new(2025, 3).unwrap();

  // Only A exists when the first run happens, so only A gets billed.
  let a = paying_student(&s, "A", 12_000).await;
  let first = s.generate_monthly(march, 5).await.unwrap();
  assert_eq!(first.generated, 1);

  let b = paying_student(&s, "B", 15_000).await;
  let c = paying_student(&s, "C", 9_000).await;

  let report = s.generate_monthly(march, 10).await.unwrap();
  assert_eq!(report.generated, 2);
  assert_eq!(report.total_cents, 24_000);
  assert_eq!(report.due_date, date("2025-03-10"));
  let billed: Vec<_> = report.payments.iter().map(|p| p.student_id).collect();
  assert!(billed.contains(&b.student_id));
  assert!(billed.contains(&c.student_id));
  assert!(!billed.contains(&a.student_id));

  let payments = s.payments_for_month(march).await.unwrap();
  assert_eq!(payments.len(), 3);
  for p in payments.iter().filter(|p| p.student_id != a.student_id) {
    assert_eq!(p.due_date, date("2025-03-10"));
    assert_eq!(p.status, PaymentStatus::Pending);
    assert_eq!(p.reference_month, march);
  }
}

#[tokio::test]
async fn generate_is_scoped_to_its_month() {
  let s = store().await;
  paying_student(&s, "A", 10_000).await;

  let feb = ReferenceMonth::new(2025, 2).unwrap();
  let mar = ReferenceMonth::new(2025, 3).unwrap();
  assert_eq!(s.generate_monthly(feb, 10).await.unwrap().generated, 1);
  assert_eq!(s.generate_monthly(mar, 10).await.unwrap().generated, 1);
  assert_eq!(s.payments_for_month(feb).await.unwrap().len(), 1);
}

#[tokio::test]
async fn generate_is_idempotent_in_the_last_supported_month() {
  let s = store().await;
  paying_student(&s, "A", 10_000).await;
  let last = ReferenceMonth::new(9999, 12).unwrap();

  assert_eq!(s.generate_monthly(last, 10).await.unwrap().generated, 1);
  assert!(s.generate_monthly(last, 10).await.unwrap().is_empty());
  let payments = s.payments_for_month(last).await.unwrap();
  assert_eq!(payments.len(), 1);
  assert_eq!(payments[0].reference_month, last);
}

#[tokio::test]
async fn generate_rejects_bad_due_day() {
  let s = store().await;
  let err = core_err(
    s.generate_monthly(ReferenceMonth::new(2025, 3).unwrap(), 31)
      .await
      .unwrap_err(),
  );
  assert!(matches!(err, CoreError::Validation(_)));
}

#[tokio::test]
async fn mark_paid_transitions_once() {
  let s = store().await;
  paying_student(&s, "A", 10_000).await;
  let march = ReferenceMonth::new(2025, 3).unwrap();
  s.generate_monthly(march, 10).await.unwrap();
  let payment = s.payments_for_month(march).await.unwrap().remove(0);

  let paid = s.mark_paid(payment.payment_id).await.unwrap();
  assert_eq!(paid.status, PaymentStatus::Paid);
  assert!(paid.paid_at.is_some());

  let err = core_err(s.mark_paid(payment.payment_id).await.unwrap_err());
  assert!(matches!(err, CoreError::InvalidState(_)));

  let err = core_err(s.mark_paid(Uuid::new_v4()).await.unwrap_err());
  assert!(matches!(err, CoreError::PaymentNotFound(_)));
}

// ─── Constraint fallbacks ────────────────────────────────────────────────────

fn raw_conn() -> rusqlite::Connection {
  let conn = rusqlite::Connection::open_in_memory().unwrap();
  conn.execute_batch(crate::schema::SCHEMA).unwrap();
  conn
}

#[test]
fn enrollment_insert_maps_unique_violation_to_conflict() {
  let conn = raw_conn();
  let now = chrono::Utc::now();
  let student = crate::people::insert_student(&conn, NewStudent::new("Alice"), now).unwrap();
  let class = crate::people::insert_class(&conn, NewClass::new("Open mat", 10), now).unwrap();

  let enrollment = |status| dojo_core::class::Enrollment {
    enrollment_id: Uuid::new_v4(),
    class_id: class.class_id,
    student_id: student.student_id,
    status,
    enrolled_at: now,
  };

  // A concurrent writer landed the pair after this caller's duplicate check.
  crate::enrollment::insert(&conn, &enrollment(EnrollmentStatus::Inactive)).unwrap();
  let err = core_err(
    crate::enrollment::insert(&conn, &enrollment(EnrollmentStatus::Active)).unwrap_err(),
  );
  assert!(matches!(err, CoreError::Conflict(_)), "{err:?}");
}

fn duplicate_payment(conn: &rusqlite::Connection, student_id: Uuid) -> rusqlite::Error {
  let insert = |id: Uuid| {
    conn.execute(
      "INSERT INTO payments (payment_id, student_id, amount_cents, due_date,
                             reference_month, status, created_at)
       VALUES (?1, ?2, 10000, '2025-03-10', '2025-03-01', 'pending', '2025-03-01T00:00:00Z')",
      rusqlite::params![id.to_string(), student_id.to_string()],
    )
  };
  insert(Uuid::new_v4()).unwrap();
  insert(Uuid::new_v4()).unwrap_err()
}

#[test]
fn unique_violations_surface_as_conflict() {
  let conn = raw_conn();
  let now = chrono::Utc::now();
  let student = crate::people::insert_student(&conn, NewStudent::new("Alice"), now).unwrap();

  let err = duplicate_payment(&conn, student.student_id);
  assert!(crate::error::is_unique_violation(&err));
  assert!(matches!(core_err(Error::Sqlite(err)), CoreError::Conflict(_)));

  let err = duplicate_payment(&conn, student.student_id);
  let wrapped = Error::Database(tokio_rusqlite::Error::Rusqlite(err));
  assert!(matches!(core_err(wrapped), CoreError::Conflict(_)));
}

#[test]
fn other_constraint_failures_stay_storage_errors() {
  let conn = raw_conn();
  let err = conn
    .execute(
      "INSERT INTO classes (class_id, name, max_students, created_at)
       VALUES ('c', 'Bad', 0, '2025-01-01T00:00:00Z')",
      [],
    )
    .unwrap_err();
  assert!(!crate::error::is_unique_violation(&err));
  assert!(matches!(core_err(Error::Sqlite(err)), CoreError::Storage(_)));
}
