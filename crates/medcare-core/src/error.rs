//! Error types for `medcare-core`.

use std::time::Duration;

use thiserror::Error;

use crate::{PersonId, entity::Role};

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  Validation(String),

  #[error("invalid CPF: {0:?}")]
  InvalidCpf(String),

  #[error("email already registered: {0}")]
  EmailConflict(String),

  #[error("CPF already registered: {0}")]
  CpfConflict(String),

  #[error("CRM already registered: {0}")]
  CrmConflict(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0} timed out after {1:?}")]
  Timeout(&'static str, Duration),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// `NotFound` for a role-specific lookup, e.g. "medic 7 not found".
  pub fn not_found(role: Role, id: PersonId) -> Self {
    Self::NotFound(format!("{} {id} not found", role.noun()))
  }

  /// `NotFound` raised by a delete, worded so callers can tell that no row
  /// was touched.
  pub fn nothing_deleted(role: Role, id: PersonId) -> Self {
    Self::NotFound(format!("{} {id} not found, nothing was deleted", role.noun()))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
