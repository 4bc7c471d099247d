//! Person validation and person-level reads.

use std::sync::Arc;

use medcare_core::{
  Error, PersonId, Result, cpf,
  event::EventPublisher,
  person::{AddressData, Person, PersonContact, PersonData},
  store::RegistryStore,
};

use crate::shared::Shared;

/// Validates person fields before any entity write, and serves reads that
/// span every role.
pub struct PersonService<S, P> {
  shared: Arc<Shared<S, P>>,
}

impl<S, P> Clone for PersonService<S, P> {
  fn clone(&self) -> Self { Self { shared: self.shared.clone() } }
}

impl<S: RegistryStore, P: EventPublisher> PersonService<S, P> {
  pub(crate) fn new(shared: Arc<Shared<S, P>>) -> Self { Self { shared } }

  /// Check that `person` may be written.
  ///
  /// Runs, in order: required fields, email uniqueness, CPF checksum (unless
  /// disabled), CPF uniqueness. `exclude` is the id of the record being
  /// updated, so that it does not conflict with itself. The CPF is expected
  /// in normalised form.
  ///
  /// Returns `Ok(true)` when every check passes; every rejection is a
  /// distinct error, never `Ok(false)`.
  pub async fn validate(
    &self,
    person: &PersonData,
    address: &AddressData,
    exclude: Option<PersonId>,
  ) -> Result<bool> {
    self
      .check(person, address, exclude)
      .await
      .inspect_err(|e| tracing::debug!(error = %e, "person rejected"))?;
    Ok(true)
  }

  async fn check(
    &self,
    person: &PersonData,
    address: &AddressData,
    exclude: Option<PersonId>,
  ) -> Result<()> {
    person.check_required()?;
    address.check_required()?;

    let store = &self.shared.store;

    if self
      .shared
      .call("email probe", store.email_taken(&person.email, exclude))
      .await?
    {
      return Err(Error::EmailConflict(person.email.clone()));
    }

    if self.shared.config.validate_cpf_checksum && !cpf::is_valid(&person.cpf) {
      return Err(Error::InvalidCpf(person.cpf.clone()));
    }

    let normalized = cpf::normalize(&person.cpf);
    if self
      .shared
      .call("cpf probe", store.cpf_taken(&normalized, exclude))
      .await?
    {
      return Err(Error::CpfConflict(normalized));
    }

    Ok(())
  }

  pub async fn find(&self, id: PersonId) -> Result<Person> {
    self
      .shared
      .call("get person", self.shared.store.get_person(id))
      .await?
      .ok_or_else(|| Error::NotFound(format!("person {id} not found")))
  }

  pub async fn list(&self) -> Result<Vec<Person>> {
    self
      .shared
      .call("list persons", self.shared.store.list_persons())
      .await
  }

  /// The `{id, email, name}` view used by mail-sending collaborators.
  pub async fn contact(&self, id: PersonId) -> Result<PersonContact> {
    self.find(id).await.map(|p| PersonContact::from(&p))
  }
}

/// Bring a person's CPF to its stored 11-digit form.
pub(crate) fn normalize_cpf(person: &mut PersonData) {
  person.cpf = cpf::normalize(&person.cpf);
}
