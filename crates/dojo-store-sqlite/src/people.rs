//! Staff accounts, students and classes: reads and writes that touch one table at a time.

use chrono::{DateTime, Utc};
use dojo_core::{
  class::{Class, NewClass},
  principal::{LoginRecord, NewStaff, Principal, PrincipalKind, Role, StaffStatus, StaffUser},
  store::{Page, PageRequest},
  student::{NewStudent, Student, StudentStatus},
};
use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    CLASS_COLUMNS, RawClass, RawStudent, STUDENT_COLUMNS, decode_enum,
    decode_uuid, encode_dt, encode_uuid,
  },
  error::is_unique_violation,
};

// ─── Staff ───────────────────────────────────────────────────────────────────

pub fn insert_staff(
  conn: &Connection,
  input: NewStaff,
  now: DateTime<Utc>,
) -> Result<StaffUser> {
  if !input.role.is_staff() {
    return Err(
      dojo_core::Error::Validation("staff accounts cannot hold the student role".into())
        .into(),
    );
  }

  if student_email_exists(conn, &input.username)? {
    return Err(
      dojo_core::Error::Conflict(format!(
        "username {:?} is already a student's login email",
        input.username
      ))
      .into(),
    );
  }

  let staff = StaffUser {
    staff_id:     Uuid::new_v4(),
    username:     input.username,
    display_name: input.display_name,
    role:         input.role,
    teacher_id:   input.teacher_id,
    status:       StaffStatus::Active,
    created_at:   now,
  };

  let inserted = conn.execute(
    "INSERT INTO staff_users (
       staff_id, username, display_name, password_hash, role,
       teacher_id, status, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    params![
      encode_uuid(staff.staff_id),
      staff.username,
      staff.display_name,
      input.password_hash,
      staff.role.as_str(),
      staff.teacher_id.map(encode_uuid),
      <&str>::from(staff.status),
      encode_dt(now),
    ],
  );

  match inserted {
    Ok(_) => Ok(staff),
    Err(e) if is_unique_violation(&e) => Err(
      dojo_core::Error::Conflict(format!(
        "username {:?} is already taken",
        staff.username
      ))
      .into(),
    ),
    Err(e) => Err(e.into()),
  }
}

// Staff usernames and student emails share one login namespace; both insert
// paths reject a name the other table already holds, so at most one of the
// two lookups below can match.

fn student_email_exists(conn: &Connection, email: &str) -> Result<bool> {
  Ok(conn.query_row(
    "SELECT EXISTS (SELECT 1 FROM students WHERE email = ?1)",
    params![email],
    |r| r.get(0),
  )?)
}

fn staff_username_exists(conn: &Connection, username: &str) -> Result<bool> {
  Ok(conn.query_row(
    "SELECT EXISTS (SELECT 1 FROM staff_users WHERE username = ?1)",
    params![username],
    |r| r.get(0),
  )?)
}

pub fn find_login(conn: &Connection, username: &str) -> Result<Option<LoginRecord>> {
  let staff: Option<(String, String, String, String, String)> = conn
    .query_row(
      "SELECT staff_id, display_name, role, status, password_hash
       FROM staff_users WHERE username = ?1",
      params![username],
      |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)),
    )
    .optional()?;

  if let Some((id, name, role, status, password_hash)) = staff {
    let status: StaffStatus = decode_enum("staff_users.status", &status)?;
    return Ok(Some(LoginRecord {
      principal: Principal {
        id: decode_uuid(&id)?,
        name,
        role: decode_enum("staff_users.role", &role)?,
        kind: PrincipalKind::Staff,
      },
      password_hash,
      active: status == StaffStatus::Active,
    }));
  }

  let student: Option<(String, String, String, String)> = conn
    .query_row(
      "SELECT student_id, name, status, password_hash
       FROM students WHERE email = ?1 AND password_hash IS NOT NULL",
      params![username],
      |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
    )
    .optional()?;

  student
    .map(|(id, name, status, password_hash)| {
      let status: StudentStatus = decode_enum("students.status", &status)?;
      Ok(LoginRecord {
        principal: Principal {
          id: decode_uuid(&id)?,
          name,
          role: Role::Student,
          kind: PrincipalKind::Student,
        },
        password_hash,
        active: status == StudentStatus::Active,
      })
    })
    .transpose()
}

// ─── Students ────────────────────────────────────────────────────────────────

pub fn insert_student(
  conn: &Connection,
  input: NewStudent,
  now: DateTime<Utc>,
) -> Result<Student> {
  input.validate()?;

  if let Some(email) = input.email.as_deref()
    && staff_username_exists(conn, email)?
  {
    return Err(
      dojo_core::Error::Conflict(format!(
        "email {email:?} is already a staff username"
      ))
      .into(),
    );
  }

  let student = Student {
    student_id:        Uuid::new_v4(),
    name:              input.name,
    email:             input.email,
    status:            input.status,
    monthly_fee_cents: input.monthly_fee_cents,
    belt:              None,
    created_at:        now,
    updated_at:        now,
  };

  let inserted = conn.execute(
    "INSERT INTO students (
       student_id, name, email, password_hash, status,
       monthly_fee_cents, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
    params![
      encode_uuid(student.student_id),
      student.name,
      student.email,
      input.password_hash,
      student.status.as_str(),
      student.monthly_fee_cents,
      encode_dt(now),
    ],
  );

  match inserted {
    Ok(_) => Ok(student),
    Err(e) if is_unique_violation(&e) => Err(
      dojo_core::Error::Conflict(format!(
        "email {:?} is already registered",
        student.email.as_deref().unwrap_or_default()
      ))
      .into(),
    ),
    Err(e) => Err(e.into()),
  }
}

pub fn get_student(conn: &Connection, id: Uuid) -> Result<Option<Student>> {
  let raw = conn
    .query_row(
      &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE student_id = ?1"),
      params![encode_uuid(id)],
      RawStudent::from_row,
    )
    .optional()?;

  raw.map(RawStudent::into_student).transpose()
}

pub fn list_students(conn: &Connection, page: PageRequest) -> Result<Page<Student>> {
  let page = page.normalized();

  let total: i64 =
    conn.query_row("SELECT COUNT(*) FROM students", [], |r| r.get(0))?;

  let mut stmt = conn.prepare(&format!(
    "SELECT {STUDENT_COLUMNS} FROM students
     ORDER BY name, rowid
     LIMIT ?1 OFFSET ?2"
  ))?;
  let raws = stmt
    .query_map(
      params![i64::from(page.limit), page.offset() as i64],
      RawStudent::from_row,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(Page {
    items: raws
      .into_iter()
      .map(RawStudent::into_student)
      .collect::<Result<_>>()?,
    page:  page.page,
    limit: page.limit,
    total: total as u64,
  })
}

pub fn delete_student(conn: &Connection, id: Uuid) -> Result<bool> {
  let deleted = conn.execute(
    "DELETE FROM students WHERE student_id = ?1",
    params![encode_uuid(id)],
  )?;
  Ok(deleted > 0)
}

// ─── Classes ─────────────────────────────────────────────────────────────────

pub fn insert_class(
  conn: &Connection,
  input: NewClass,
  now: DateTime<Utc>,
) -> Result<Class> {
  input.validate()?;

  let class = Class {
    class_id:     Uuid::new_v4(),
    name:         input.name,
    teacher_id:   input.teacher_id,
    max_students: input.max_students,
    status:       input.status,
    created_at:   now,
  };

  conn.execute(
    "INSERT INTO classes (class_id, name, teacher_id, max_students, status, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![
      encode_uuid(class.class_id),
      class.name,
      class.teacher_id.map(encode_uuid),
      i64::from(class.max_students),
      <&str>::from(class.status),
      encode_dt(now),
    ],
  )?;

  Ok(class)
}

pub fn get_class(conn: &Connection, id: Uuid) -> Result<Option<Class>> {
  let raw = conn
    .query_row(
      &format!("SELECT {CLASS_COLUMNS} FROM classes WHERE class_id = ?1"),
      params![encode_uuid(id)],
      RawClass::from_row,
    )
    .optional()?;

  raw.map(RawClass::into_class).transpose()
}
