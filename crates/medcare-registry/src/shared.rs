//! State and plumbing shared by all services: deadlines on store reads,
//! mapping of store failures, best-effort event publication, and the
//! find/list/delete flows that are identical for every entity.

use std::future::Future;

use medcare_core::{
  Error, PersonId, Result,
  entity::{Entity, NewRecord},
  event::{EventPublisher, UserCreationEvent},
  person::PersonData,
  store::{RegistryStore, StoreError, UniqueField},
};
use tokio::time::timeout;

use crate::RegistryConfig;

pub(crate) struct Shared<S, P> {
  pub store:     S,
  pub publisher: P,
  pub config:    RegistryConfig,
}

/// The unique values of a record about to be written, kept so that a unique
/// index violation can be reported against the value that caused it.
pub(crate) struct UniqueKeys {
  email: String,
  cpf:   String,
  crm:   Option<String>,
}

impl UniqueKeys {
  pub fn new(person: &PersonData, crm: Option<&str>) -> Self {
    Self {
      email: person.email.clone(),
      cpf:   person.cpf.clone(),
      crm:   crm.map(str::to_owned),
    }
  }

  fn conflict<E: StoreError>(self, err: E) -> Error {
    match err.unique_violation() {
      Some(UniqueField::Email) => Error::EmailConflict(self.email),
      Some(UniqueField::Cpf) => Error::CpfConflict(self.cpf),
      Some(UniqueField::Crm) => Error::CrmConflict(self.crm.unwrap_or_default()),
      None => Error::Store(Box::new(err)),
    }
  }
}

impl<S: RegistryStore, P: EventPublisher> Shared<S, P> {
  /// Await a store read or probe under the configured deadline.
  pub async fn call<T>(
    &self,
    op: &'static str,
    fut: impl Future<Output = Result<T, S::Error>>,
  ) -> Result<T> {
    match timeout(self.config.store_timeout, fut).await {
      Ok(res) => res.map_err(|e| Error::Store(Box::new(e))),
      Err(_) => Err(Error::Timeout(op, self.config.store_timeout)),
    }
  }

  /// Await a store write to completion. Writes carry no deadline: a write
  /// abandoned after it reached the store may still commit.
  pub async fn commit<T>(&self, fut: impl Future<Output = Result<T, S::Error>>) -> Result<T> {
    fut.await.map_err(|e| Error::Store(Box::new(e)))
  }

  /// Like [`Self::commit`], but unique index violations become the matching
  /// conflict error.
  pub async fn write<T>(
    &self,
    keys: UniqueKeys,
    fut: impl Future<Output = Result<T, S::Error>>,
  ) -> Result<T> {
    fut.await.map_err(|e| keys.conflict(e))
  }

  /// Hand an event to the publisher. Failures and timeouts are logged and
  /// swallowed: the record is already committed.
  pub async fn publish(&self, event: UserCreationEvent) {
    let role = event.role;
    let person_id = event.person_id;

    match timeout(self.config.publish_timeout, self.publisher.publish(event)).await {
      Ok(Ok(())) => tracing::debug!(%role, person_id, "user-creation event published"),
      Ok(Err(e)) => {
        tracing::warn!(%role, person_id, error = %e, "user-creation event not published");
      }
      Err(_) => tracing::warn!(
        %role,
        person_id,
        timeout = ?self.config.publish_timeout,
        "user-creation event publish timed out"
      ),
    }
  }

  // ── Generic entity flows ──────────────────────────────────────────────────

  pub async fn find<E: Entity>(&self, id: PersonId) -> Result<E> {
    self
      .call("get record", self.store.get_record(E::ROLE, id))
      .await?
      .and_then(E::from_record)
      .ok_or_else(|| Error::not_found(E::ROLE, id))
  }

  pub async fn list<E: Entity>(&self) -> Result<Vec<E>> {
    let records = self.call("list records", self.store.list_records(E::ROLE)).await?;
    Ok(records.into_iter().filter_map(E::from_record).collect())
  }

  /// Insert a new record, then announce it.
  pub async fn create<E: Entity>(&self, record: NewRecord, keys: UniqueKeys) -> Result<E> {
    let stored = self
      .write(keys, self.store.insert_record(record))
      .await?;
    let entity = E::from_record(stored)
      .ok_or_else(|| Error::Store(format!("store returned a non-{} record", E::ROLE).into()))?;

    let person = entity.person();
    tracing::info!(role = %E::ROLE, id = person.id, "record created");
    self
      .publish(UserCreationEvent::new(E::ROLE, person.id, person.data.email.clone()))
      .await;

    Ok(entity)
  }

  /// Overwrite an existing record.
  pub async fn save<E: Entity>(&self, entity: E, keys: UniqueKeys) -> Result<E> {
    let id = entity.person().id;
    self
      .write(keys, self.store.update_record(entity.into_record()))
      .await?
      .and_then(E::from_record)
      .ok_or_else(|| Error::not_found(E::ROLE, id))
  }

  /// Delete a record. Nothing reaches the store's delete when the record
  /// does not exist.
  pub async fn delete<E: Entity>(&self, id: PersonId) -> Result<()> {
    let existing = self.call("get record", self.store.get_record(E::ROLE, id)).await?;
    if existing.is_none() {
      return Err(Error::nothing_deleted(E::ROLE, id));
    }

    if !self.commit(self.store.delete_record(E::ROLE, id)).await? {
      return Err(Error::nothing_deleted(E::ROLE, id));
    }
    tracing::info!(role = %E::ROLE, id, "record deleted");
    Ok(())
  }
}
