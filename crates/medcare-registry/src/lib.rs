//! Business services for the MedCare registry.
//!
//! Every service is generic over a [`RegistryStore`] backend and an
//! [`EventPublisher`], and is normally reached through [`Registry`], which
//! builds all of them around one shared store and publisher.
//!
//! [`RegistryStore`]: medcare_core::store::RegistryStore
//! [`EventPublisher`]: medcare_core::event::EventPublisher

mod address;
mod assistant;
mod config;
mod medic;
mod patient;
mod person;
mod shared;

pub use address::AddressService;
pub use assistant::AssistantService;
pub use config::RegistryConfig;
pub use medic::MedicService;
pub use patient::PatientService;
pub use person::PersonService;

use std::sync::Arc;

use medcare_core::{event::EventPublisher, store::RegistryStore};

use crate::shared::Shared;

/// All registry services, sharing one store, publisher, and configuration.
pub struct Registry<S, P> {
  pub persons:    PersonService<S, P>,
  pub patients:   PatientService<S, P>,
  pub medics:     MedicService<S, P>,
  pub assistants: AssistantService<S, P>,
  pub addresses:  AddressService<S, P>,
  shared:         Arc<Shared<S, P>>,
}

impl<S: RegistryStore, P: EventPublisher> Registry<S, P> {
  pub fn new(store: S, publisher: P, config: RegistryConfig) -> Self {
    let shared = Arc::new(Shared { store, publisher, config });
    let persons = PersonService::new(shared.clone());
    Self {
      patients:   PatientService::new(shared.clone(), persons.clone()),
      medics:     MedicService::new(shared.clone(), persons.clone()),
      assistants: AssistantService::new(shared.clone(), persons.clone()),
      addresses:  AddressService::new(shared.clone()),
      persons,
      shared,
    }
  }

  pub fn config(&self) -> &RegistryConfig { &self.shared.config }
}
