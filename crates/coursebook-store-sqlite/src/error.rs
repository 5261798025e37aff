//! Error type for `coursebook-store-sqlite`.
//!
//! Constraint violations are caused by request data, not by the database, so
//! they are converted into core errors on the way in.

use coursebook_core::store::StoreError;
use rusqlite::{ErrorCode, ffi};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] coursebook_core::Error),

  #[error("database error: {0}")]
  Database(#[source] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[source] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A JSON attribute that has no SQLite column representation.
  #[error("unsupported value for column {0:?}")]
  UnsupportedValue(String),
}

impl StoreError for Error {
  fn core_error(&self) -> Option<&coursebook_core::Error> {
    match self {
      Error::Core(e) => Some(e),
      _ => None,
    }
  }
}

/// Map a constraint failure to the domain error it stands for.
fn constraint_error(err: &ffi::Error, message: Option<&str>) -> coursebook_core::Error {
  use coursebook_core::Error::{Conflict, InvalidRequest};

  match err.extended_code {
    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
      Conflict("a referenced record does not exist or is still referenced".into())
    }
    ffi::SQLITE_CONSTRAINT_NOTNULL => {
      let column = message
        .and_then(|m| m.rsplit_once('.'))
        .map_or("a required column", |(_, column)| column);
      InvalidRequest(format!("{column} must not be null"))
    }
    ffi::SQLITE_CONSTRAINT_CHECK => InvalidRequest("a column value is out of range".into()),
    // Raised by the schema's consistency triggers with a readable message.
    ffi::SQLITE_CONSTRAINT_TRIGGER => {
      InvalidRequest(message.unwrap_or("inconsistent record").to_owned())
    }
    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
      Conflict("record already exists".into())
    }
    _ => Conflict("constraint violated".into()),
  }
}

impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self {
    match &e {
      rusqlite::Error::SqliteFailure(err, message)
        if err.code == ErrorCode::ConstraintViolation =>
      {
        Error::Core(constraint_error(err, message.as_deref()))
      }
      _ => Error::Sqlite(e),
    }
  }
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::Rusqlite(e) => e.into(),
      other => Error::Database(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  fn failure(extended_code: i32, message: &str) -> rusqlite::Error {
    rusqlite::Error::SqliteFailure(ffi::Error::new(extended_code), Some(message.into()))
  }

  #[test]
  fn not_null_names_the_column_only() {
    let err = Error::from(failure(
      ffi::SQLITE_CONSTRAINT_NOTNULL,
      "NOT NULL constraint failed: clients.first_name",
    ));
    match err {
      Error::Core(coursebook_core::Error::InvalidRequest(msg)) => {
        assert_eq!(msg, "first_name must not be null");
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[test]
  fn foreign_key_is_a_conflict() {
    let err = Error::from(failure(
      ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
      "FOREIGN KEY constraint failed",
    ));
    assert!(matches!(err, Error::Core(coursebook_core::Error::Conflict(_))));
  }

  #[test]
  fn other_failures_stay_storage_errors() {
    let err = Error::from(failure(ffi::SQLITE_BUSY, "database is locked"));
    assert!(matches!(err, Error::Sqlite(_)));
    assert!(err.core_error().is_none());
  }
}
