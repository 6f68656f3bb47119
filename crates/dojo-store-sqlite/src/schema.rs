//! SQL schema for the Dojo SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS staff_users (
    staff_id      TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    display_name  TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL,   -- 'admin' | 'teacher' | 'receptionist'
    teacher_id    TEXT,
    status        TEXT NOT NULL DEFAULT 'active',
    created_at    TEXT NOT NULL
);

-- belt/belt_degree are a materialised view over belt_promotions and are only
-- written by the promotion operations.
CREATE TABLE IF NOT EXISTS students (
    student_id        TEXT PRIMARY KEY,
    name              TEXT NOT NULL,
    email             TEXT UNIQUE,
    password_hash     TEXT,
    status            TEXT NOT NULL DEFAULT 'active',
    monthly_fee_cents INTEGER,
    belt              TEXT,
    belt_degree       INTEGER,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL,
    CHECK ((belt IS NULL) = (belt_degree IS NULL)),
    CHECK (belt_degree IS NULL OR belt_degree BETWEEN 0 AND 10)
);

-- rowid order is recording order; it breaks promotion_date ties.
CREATE TABLE IF NOT EXISTS belt_promotions (
    promotion_id    TEXT PRIMARY KEY,
    student_id      TEXT NOT NULL REFERENCES students(student_id) ON DELETE CASCADE,
    promoted_by     TEXT NOT NULL,
    previous_belt   TEXT,
    previous_degree INTEGER,
    new_belt        TEXT NOT NULL,
    new_degree      INTEGER NOT NULL CHECK (new_degree BETWEEN 0 AND 10),
    promotion_date  TEXT NOT NULL,   -- YYYY-MM-DD
    promotion_type  TEXT NOT NULL DEFAULT 'regular',
    notes           TEXT,
    recorded_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS classes (
    class_id     TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    teacher_id   TEXT,
    max_students INTEGER NOT NULL CHECK (max_students > 0),
    status       TEXT NOT NULL DEFAULT 'active',
    created_at   TEXT NOT NULL
);

-- One row per (student, class) for all time; unenrolling flips status.
CREATE TABLE IF NOT EXISTS class_enrollments (
    enrollment_id TEXT PRIMARY KEY,
    class_id      TEXT NOT NULL REFERENCES classes(class_id) ON DELETE CASCADE,
    student_id    TEXT NOT NULL REFERENCES students(student_id) ON DELETE CASCADE,
    status        TEXT NOT NULL DEFAULT 'active',
    enrolled_at   TEXT NOT NULL,
    UNIQUE (student_id, class_id)
);

-- reference_month is always the first day of the month (YYYY-MM-01).
CREATE TABLE IF NOT EXISTS payments (
    payment_id      TEXT PRIMARY KEY,
    student_id      TEXT NOT NULL REFERENCES students(student_id) ON DELETE CASCADE,
    amount_cents    INTEGER NOT NULL CHECK (amount_cents >= 0),
    due_date        TEXT NOT NULL,
    reference_month TEXT NOT NULL,
    status          TEXT NOT NULL DEFAULT 'pending',
    paid_at         TEXT,
    created_at      TEXT NOT NULL,
    UNIQUE (student_id, reference_month)
);

CREATE INDEX IF NOT EXISTS promotions_student_idx  ON belt_promotions(student_id, promotion_date);
CREATE INDEX IF NOT EXISTS enrollments_class_idx   ON class_enrollments(class_id, status);
CREATE INDEX IF NOT EXISTS payments_month_idx      ON payments(reference_month);

PRAGMA user_version = 1;
";
