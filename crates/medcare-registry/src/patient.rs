use std::sync::Arc;

use medcare_core::{
  Error, PersonId, Result,
  entity::{
    Details, NewPatient, NewRecord, Patient, PatientDetails, PatientSituation,
    PatientUpdate,
  },
  event::EventPublisher,
  store::RegistryStore,
};

use crate::{
  person::{PersonService, normalize_cpf},
  shared::{Shared, UniqueKeys},
};

pub struct PatientService<S, P> {
  shared:  Arc<Shared<S, P>>,
  persons: PersonService<S, P>,
}

impl<S: RegistryStore, P: EventPublisher> PatientService<S, P> {
  pub(crate) fn new(shared: Arc<Shared<S, P>>, persons: PersonService<S, P>) -> Self {
    Self { shared, persons }
  }

  /// Register a patient. Whatever situation the caller sends, a new patient
  /// starts as [`PatientSituation::NotDefined`].
  pub async fn create(&self, input: NewPatient) -> Result<Patient> {
    let NewPatient { mut person, health_plan, description, symptoms, allergies, .. } = input;

    normalize_cpf(&mut person.data);
    self.persons.validate(&person.data, &person.address, None).await?;

    let keys = UniqueKeys::new(&person.data, None);
    let record = NewRecord {
      person,
      details: Details::Patient(PatientDetails {
        health_plan,
        description,
        symptoms,
        allergies,
        situation: PatientSituation::NotDefined,
      }),
    };
    self.shared.create(record, keys).await
  }

  pub async fn find(&self, id: PersonId) -> Result<Patient> { self.shared.find(id).await }

  pub async fn list(&self) -> Result<Vec<Patient>> { self.shared.list().await }

  /// Merge `update` onto the stored patient. The situation is left alone.
  pub async fn update(&self, id: PersonId, update: PatientUpdate) -> Result<Patient> {
    let mut patient: Patient = self.shared.find(id).await?;
    update.apply(&mut patient);
    normalize_cpf(&mut patient.person.data);

    self
      .persons
      .validate(&patient.person.data, &patient.person.address.data, Some(id))
      .await?;

    let keys = UniqueKeys::new(&patient.person.data, None);
    self.shared.save(patient, keys).await
  }

  /// Move a patient to a new clinical situation. Going back to
  /// `NOT_DEFINED` is refused.
  pub async fn advance_situation(
    &self,
    id: PersonId,
    situation: PatientSituation,
  ) -> Result<Patient> {
    if situation == PatientSituation::NotDefined {
      return Err(Error::Validation(format!(
        "a patient cannot be moved back to {situation}"
      )));
    }

    let mut patient: Patient = self.shared.find(id).await?;
    let previous = patient.details.situation;
    patient.details.situation = situation;

    let keys = UniqueKeys::new(&patient.person.data, None);
    let patient = self.shared.save(patient, keys).await?;
    tracing::info!(id, from = %previous, to = %situation, "patient situation advanced");
    Ok(patient)
  }

  pub async fn delete(&self, id: PersonId) -> Result<()> {
    self.shared.delete::<Patient>(id).await
  }
}
