//! Error type for `medcare-store-sqlite`.

use medcare_core::store::{StoreError, UniqueField};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date parse error: {0}")]
  DateParse(String),

  #[error("unknown {kind} value: {value:?}")]
  UnknownVariant { kind: &'static str, value: String },
}

impl StoreError for Error {
  fn unique_violation(&self) -> Option<UniqueField> {
    let Error::Database(tokio_rusqlite::Error::Rusqlite(
      rusqlite::Error::SqliteFailure(failure, Some(message)),
    )) = self
    else {
      return None;
    };

    if failure.code != rusqlite::ErrorCode::ConstraintViolation {
      return None;
    }

    // SQLite reports the offending columns, e.g.
    // "UNIQUE constraint failed: persons.email".
    if message.contains("persons.email") {
      Some(UniqueField::Email)
    } else if message.contains("persons.cpf") {
      Some(UniqueField::Cpf)
    } else if message.contains("medics.crm") {
      Some(UniqueField::Crm)
    } else {
      None
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
