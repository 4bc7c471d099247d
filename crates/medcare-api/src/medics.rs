//! Handlers for `/medics` endpoints.
//!
//! | Method   | Path           | Notes |
//! |----------|----------------|-------|
//! | `GET`    | `/medics`      | |
//! | `POST`   | `/medics`      | 201; 409 if the CRM is taken |
//! | `GET`    | `/medics/{id}` | 404 if not found |
//! | `PUT`    | `/medics/{id}` | Partial update |
//! | `DELETE` | `/medics/{id}` | 204 |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use medcare_core::{
  PersonId,
  entity::{Medic, MedicUpdate, NewMedic},
  event::EventPublisher,
  store::RegistryStore,
};

use crate::{AppState, JsonBody, PathId, auth::Caller, error::ApiError, policy::Operation};

/// `GET /medics`
pub async fn list<S, P>(
  State(state): State<AppState<S, P>>,
  caller: Caller,
) -> Result<Json<Vec<Medic>>, ApiError>
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  state.policy.authorize(Operation::MedicList, &caller)?;
  Ok(Json(state.registry.medics.list().await?))
}

/// `POST /medics`
pub async fn create<S, P>(
  State(state): State<AppState<S, P>>,
  caller: Caller,
  JsonBody(body): JsonBody<NewMedic>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  state.policy.authorize(Operation::MedicCreate, &caller)?;
  let medic = state.registry.medics.create(body).await?;
  Ok((StatusCode::CREATED, Json(medic)))
}

/// `GET /medics/{id}`
pub async fn get_one<S, P>(
  State(state): State<AppState<S, P>>,
  caller: Caller,
  PathId(id): PathId<PersonId>,
) -> Result<Json<Medic>, ApiError>
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  state.policy.authorize(Operation::MedicGet, &caller)?;
  Ok(Json(state.registry.medics.find(id).await?))
}

/// `PUT /medics/{id}`
pub async fn update<S, P>(
  State(state): State<AppState<S, P>>,
  caller: Caller,
  PathId(id): PathId<PersonId>,
  JsonBody(body): JsonBody<MedicUpdate>,
) -> Result<Json<Medic>, ApiError>
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  state.policy.authorize(Operation::MedicUpdate, &caller)?;
  Ok(Json(state.registry.medics.update(id, body).await?))
}

/// `DELETE /medics/{id}`
pub async fn delete<S, P>(
  State(state): State<AppState<S, P>>,
  caller: Caller,
  PathId(id): PathId<PersonId>,
) -> Result<StatusCode, ApiError>
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  state.policy.authorize(Operation::MedicDelete, &caller)?;
  state.registry.medics.delete(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
