//! Error type for `dojo-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] dojo_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A column held a value outside the set its domain type allows.
  #[error("unexpected {column} value: {value:?}")]
  Decode { column: &'static str, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Whether `err` is a UNIQUE (or PRIMARY KEY) constraint violation.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
  match err {
    rusqlite::Error::SqliteFailure(e, _) => matches!(
      e.extended_code,
      rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    ),
    _ => false,
  }
}

impl From<Error> for dojo_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Core(e) => e,
      Error::Sqlite(ref e) if is_unique_violation(e) => {
        dojo_core::Error::Conflict(e.to_string())
      }
      Error::Database(tokio_rusqlite::Error::Rusqlite(ref e))
        if is_unique_violation(e) =>
      {
        dojo_core::Error::Conflict(e.to_string())
      }
      other => dojo_core::Error::Storage(Box::new(other)),
    }
  }
}
