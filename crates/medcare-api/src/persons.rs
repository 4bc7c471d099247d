//! Read-only handlers for `/persons`, spanning every role.

use axum::{
  Json,
  extract::State,
};
use medcare_core::{
  PersonId,
  event::EventPublisher,
  person::{Person, PersonContact},
  store::RegistryStore,
};

use crate::{AppState, PathId, auth::Caller, error::ApiError, policy::Operation};

/// `GET /persons`
pub async fn list<S, P>(
  State(state): State<AppState<S, P>>,
  caller: Caller,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  state.policy.authorize(Operation::PersonList, &caller)?;
  Ok(Json(state.registry.persons.list().await?))
}

/// `GET /persons/{id}`
pub async fn get_one<S, P>(
  State(state): State<AppState<S, P>>,
  caller: Caller,
  PathId(id): PathId<PersonId>,
) -> Result<Json<Person>, ApiError>
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  state.policy.authorize(Operation::PersonGet, &caller)?;
  Ok(Json(state.registry.persons.find(id).await?))
}

/// `GET /persons/{id}/contact`: `{id, email, name}` for mail senders.
pub async fn contact<S, P>(
  State(state): State<AppState<S, P>>,
  caller: Caller,
  PathId(id): PathId<PersonId>,
) -> Result<Json<PersonContact>, ApiError>
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  state.policy.authorize(Operation::PersonContact, &caller)?;
  Ok(Json(state.registry.persons.contact(id).await?))
}
