//! Handlers for `/assistants` endpoints.
//!
//! | Method   | Path               | Notes |
//! |----------|--------------------|-------|
//! | `GET`    | `/assistants`      | |
//! | `POST`   | `/assistants`      | 201; the registration number is generated |
//! | `GET`    | `/assistants/{id}` | 404 if not found |
//! | `PUT`    | `/assistants/{id}` | Partial update |
//! | `DELETE` | `/assistants/{id}` | 204 |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use medcare_core::{
  PersonId,
  entity::{Assistant, AssistantUpdate, NewAssistant},
  event::EventPublisher,
  store::RegistryStore,
};

use crate::{AppState, JsonBody, PathId, auth::Caller, error::ApiError, policy::Operation};

/// `GET /assistants`
pub async fn list<S, P>(
  State(state): State<AppState<S, P>>,
  caller: Caller,
) -> Result<Json<Vec<Assistant>>, ApiError>
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  state.policy.authorize(Operation::AssistantList, &caller)?;
  Ok(Json(state.registry.assistants.list().await?))
}

/// `POST /assistants`
pub async fn create<S, P>(
  State(state): State<AppState<S, P>>,
  caller: Caller,
  JsonBody(body): JsonBody<NewAssistant>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  state.policy.authorize(Operation::AssistantCreate, &caller)?;
  let assistant = state.registry.assistants.create(body).await?;
  Ok((StatusCode::CREATED, Json(assistant)))
}

/// `GET /assistants/{id}`
pub async fn get_one<S, P>(
  State(state): State<AppState<S, P>>,
  caller: Caller,
  PathId(id): PathId<PersonId>,
) -> Result<Json<Assistant>, ApiError>
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  state.policy.authorize(Operation::AssistantGet, &caller)?;
  Ok(Json(state.registry.assistants.find(id).await?))
}

/// `PUT /assistants/{id}`
pub async fn update<S, P>(
  State(state): State<AppState<S, P>>,
  caller: Caller,
  PathId(id): PathId<PersonId>,
  JsonBody(body): JsonBody<AssistantUpdate>,
) -> Result<Json<Assistant>, ApiError>
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  state.policy.authorize(Operation::AssistantUpdate, &caller)?;
  Ok(Json(state.registry.assistants.update(id, body).await?))
}

/// `DELETE /assistants/{id}`
pub async fn delete<S, P>(
  State(state): State<AppState<S, P>>,
  caller: Caller,
  PathId(id): PathId<PersonId>,
) -> Result<StatusCode, ApiError>
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  state.policy.authorize(Operation::AssistantDelete, &caller)?;
  state.registry.assistants.delete(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
