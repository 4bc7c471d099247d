//! User-creation events and the publisher abstraction.
//!
//! After a patient, medic, or assistant is committed, the registry tells the
//! external identity service to provision a login for it. Delivery is
//! best-effort: the entity stays committed whatever happens to the event.

use std::{
  future::Future,
  sync::{Arc, Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};

use crate::{PersonId, entity::Role};

/// Wire payload consumed by the identity service:
/// `{"person_id": 1, "username": "a@b.c", "role": "MEDIC"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreationEvent {
  pub person_id: PersonId,
  /// The person's email; becomes the login name.
  pub username:  String,
  pub role:      Role,
}

impl UserCreationEvent {
  pub fn new(role: Role, person_id: PersonId, email: impl Into<String>) -> Self {
    Self { person_id, username: email.into(), role }
  }

  /// JSON encoding of the payload.
  pub fn to_json(&self) -> serde_json::Result<Vec<u8>> { serde_json::to_vec(self) }
}

/// Sends user-creation events to a role-specific destination.
///
/// Implementations should hand the message off and return; they must not wait
/// for the consumer.
pub trait EventPublisher: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn publish(
    &self,
    event: UserCreationEvent,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── In-memory publisher ─────────────────────────────────────────────────────

/// Keeps every published event in memory, unbounded. Meant for tests.
///
/// Cloning is cheap and clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPublisher {
  events: Arc<Mutex<Vec<UserCreationEvent>>>,
}

impl InMemoryPublisher {
  pub fn new() -> Self { Self::default() }

  /// Snapshot of everything published so far, oldest first.
  pub fn events(&self) -> Vec<UserCreationEvent> {
    self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }
}

impl EventPublisher for InMemoryPublisher {
  type Error = std::convert::Infallible;

  async fn publish(&self, event: UserCreationEvent) -> Result<(), Self::Error> {
    self
      .events
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(event);
    Ok(())
  }
}
