use std::sync::Arc;

use medcare_core::{
  Error, PersonId, Result,
  entity::{Details, Medic, MedicDetails, MedicUpdate, NewMedic, NewRecord},
  event::EventPublisher,
  store::RegistryStore,
};

use crate::{
  person::{PersonService, normalize_cpf},
  shared::{Shared, UniqueKeys},
};

pub struct MedicService<S, P> {
  shared:  Arc<Shared<S, P>>,
  persons: PersonService<S, P>,
}

/// CRMs are compared and stored without surrounding whitespace.
fn normalize_crm(details: &mut MedicDetails) { details.crm = details.crm.trim().to_owned(); }

impl<S: RegistryStore, P: EventPublisher> MedicService<S, P> {
  pub(crate) fn new(shared: Arc<Shared<S, P>>, persons: PersonService<S, P>) -> Self {
    Self { shared, persons }
  }

  /// CRM checks run before any person check.
  async fn check_crm(&self, details: &MedicDetails, exclude: Option<PersonId>) -> Result<()> {
    if details.crm.trim().is_empty() {
      return Err(Error::Validation("crm must not be blank".into()));
    }
    if details.medical_specialty.trim().is_empty() {
      return Err(Error::Validation("medical_specialty must not be blank".into()));
    }

    let taken = self
      .shared
      .call("crm probe", self.shared.store.crm_taken(&details.crm, exclude))
      .await?;
    if taken {
      tracing::debug!(crm = %details.crm, "medic rejected");
      return Err(Error::CrmConflict(details.crm.clone()));
    }
    Ok(())
  }

  pub async fn create(&self, input: NewMedic) -> Result<Medic> {
    let NewMedic { mut person, mut details } = input;

    normalize_crm(&mut details);
    self.check_crm(&details, None).await?;
    normalize_cpf(&mut person.data);
    self.persons.validate(&person.data, &person.address, None).await?;

    let keys = UniqueKeys::new(&person.data, Some(&details.crm));
    let record = NewRecord { person, details: Details::Medic(details) };
    self.shared.create(record, keys).await
  }

  pub async fn find(&self, id: PersonId) -> Result<Medic> { self.shared.find(id).await }

  pub async fn list(&self) -> Result<Vec<Medic>> { self.shared.list().await }

  pub async fn update(&self, id: PersonId, update: MedicUpdate) -> Result<Medic> {
    let mut medic: Medic = self.shared.find(id).await?;
    update.apply(&mut medic);
    normalize_cpf(&mut medic.person.data);
    normalize_crm(&mut medic.details);

    self.check_crm(&medic.details, Some(id)).await?;
    self
      .persons
      .validate(&medic.person.data, &medic.person.address.data, Some(id))
      .await?;

    let keys = UniqueKeys::new(&medic.person.data, Some(&medic.details.crm));
    self.shared.save(medic, keys).await
  }

  pub async fn delete(&self, id: PersonId) -> Result<()> {
    self.shared.delete::<Medic>(id).await
  }
}
