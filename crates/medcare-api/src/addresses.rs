//! Handlers for `/addresses`. Addresses are created and deleted with their
//! owning person, so there is no `POST` or `DELETE` here.

use axum::{
  Json,
  extract::State,
};
use medcare_core::{
  event::EventPublisher,
  person::{Address, AddressPatch},
  store::RegistryStore,
};

use crate::{AppState, JsonBody, PathId, auth::Caller, error::ApiError, policy::Operation};

/// `GET /addresses`
pub async fn list<S, P>(
  State(state): State<AppState<S, P>>,
  caller: Caller,
) -> Result<Json<Vec<Address>>, ApiError>
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  state.policy.authorize(Operation::AddressList, &caller)?;
  Ok(Json(state.registry.addresses.list().await?))
}

/// `GET /addresses/{id}`
pub async fn get_one<S, P>(
  State(state): State<AppState<S, P>>,
  caller: Caller,
  PathId(id): PathId<i64>,
) -> Result<Json<Address>, ApiError>
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  state.policy.authorize(Operation::AddressGet, &caller)?;
  Ok(Json(state.registry.addresses.find(id).await?))
}

/// `PUT /addresses/{id}`, partial update.
pub async fn update<S, P>(
  State(state): State<AppState<S, P>>,
  caller: Caller,
  PathId(id): PathId<i64>,
  JsonBody(body): JsonBody<AddressPatch>,
) -> Result<Json<Address>, ApiError>
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  state.policy.authorize(Operation::AddressUpdate, &caller)?;
  Ok(Json(state.registry.addresses.update(id, body).await?))
}
