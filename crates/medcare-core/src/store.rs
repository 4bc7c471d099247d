//! The `RegistryStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `medcare-store-sqlite`).
//! The service layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  PersonId,
  entity::{NewRecord, Record, Role},
  person::{Address, Person},
};

/// A column guarded by a unique index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
  Email,
  Cpf,
  Crm,
}

/// Backend errors must say whether they were caused by a unique index, so
/// that a lost check-then-insert race still surfaces as a conflict.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn unique_violation(&self) -> Option<UniqueField>;
}

/// Abstraction over a registry storage backend.
///
/// Writes touching more than one table (person + address + role row) must be
/// atomic. Backends must enforce uniqueness of person email, person CPF, and
/// medic CRM themselves; the service-level probes are only a fast path.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RegistryStore: Send + Sync {
  type Error: StoreError;

  // ── Uniqueness probes ─────────────────────────────────────────────────

  /// Whether any person other than `exclude` uses `email`.
  fn email_taken<'a>(
    &'a self,
    email: &'a str,
    exclude: Option<PersonId>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Whether any person other than `exclude` uses the normalised `cpf`.
  fn cpf_taken<'a>(
    &'a self,
    cpf: &'a str,
    exclude: Option<PersonId>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Whether any medic other than `exclude` uses `crm`.
  fn crm_taken<'a>(
    &'a self,
    crm: &'a str,
    exclude: Option<PersonId>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Persons ───────────────────────────────────────────────────────────

  /// Retrieve the person part of any record. Returns `None` if not found.
  fn get_person(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// List every person, ordered by id.
  fn list_persons(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  // ── Role records ──────────────────────────────────────────────────────

  /// Persist person, address, and role row in one transaction and return the
  /// stored record with its assigned ids.
  fn insert_record(
    &self,
    record: NewRecord,
  ) -> impl Future<Output = Result<Record, Self::Error>> + Send + '_;

  /// Retrieve a record of the given role. Returns `None` if the id does not
  /// exist or belongs to another role.
  fn get_record(
    &self,
    role: Role,
    id: PersonId,
  ) -> impl Future<Output = Result<Option<Record>, Self::Error>> + Send + '_;

  /// List all records of a role, ordered by id.
  fn list_records(
    &self,
    role: Role,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + '_;

  /// Overwrite every column of an existing record (person, address, role
  /// row) in one transaction. Returns `None` if the record no longer exists.
  fn update_record(
    &self,
    record: Record,
  ) -> impl Future<Output = Result<Option<Record>, Self::Error>> + Send + '_;

  /// Delete a record and its owned address. Returns `false` if nothing
  /// matched.
  fn delete_record(
    &self,
    role: Role,
    id: PersonId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Addresses ─────────────────────────────────────────────────────────

  fn get_address(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Address>, Self::Error>> + Send + '_;

  /// List every address, ordered by id.
  fn list_addresses(
    &self,
  ) -> impl Future<Output = Result<Vec<Address>, Self::Error>> + Send + '_;

  /// Overwrite an address. Returns `None` if it does not exist.
  fn update_address(
    &self,
    address: Address,
  ) -> impl Future<Output = Result<Option<Address>, Self::Error>> + Send + '_;
}
