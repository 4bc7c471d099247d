use std::sync::Arc;

use medcare_core::{
  PersonId, Result,
  entity::{Assistant, AssistantDetails, AssistantUpdate, Details, NewAssistant, NewRecord},
  event::EventPublisher,
  registration,
  store::RegistryStore,
};

use crate::{
  person::{PersonService, normalize_cpf},
  shared::{Shared, UniqueKeys},
};

pub struct AssistantService<S, P> {
  shared:  Arc<Shared<S, P>>,
  persons: PersonService<S, P>,
}

impl<S: RegistryStore, P: EventPublisher> AssistantService<S, P> {
  pub(crate) fn new(shared: Arc<Shared<S, P>>, persons: PersonService<S, P>) -> Self {
    Self { shared, persons }
  }

  /// Register an assistant under a freshly generated registration number.
  /// A supplied number is ignored; `active` defaults to `true`.
  pub async fn create(&self, input: NewAssistant) -> Result<Assistant> {
    let NewAssistant { mut person, active, .. } = input;

    normalize_cpf(&mut person.data);
    self.persons.validate(&person.data, &person.address, None).await?;

    let keys = UniqueKeys::new(&person.data, None);
    let record = NewRecord {
      person,
      details: Details::Assistant(AssistantDetails {
        registration_number: registration::generate(),
        active:              active.unwrap_or(true),
      }),
    };
    self.shared.create(record, keys).await
  }

  pub async fn find(&self, id: PersonId) -> Result<Assistant> { self.shared.find(id).await }

  pub async fn list(&self) -> Result<Vec<Assistant>> { self.shared.list().await }

  pub async fn update(&self, id: PersonId, update: AssistantUpdate) -> Result<Assistant> {
    let mut assistant: Assistant = self.shared.find(id).await?;
    update.apply(&mut assistant);
    normalize_cpf(&mut assistant.person.data);

    self
      .persons
      .validate(&assistant.person.data, &assistant.person.address.data, Some(id))
      .await?;

    let keys = UniqueKeys::new(&assistant.person.data, None);
    self.shared.save(assistant, keys).await
  }

  pub async fn delete(&self, id: PersonId) -> Result<()> {
    self.shared.delete::<Assistant>(id).await
  }
}
