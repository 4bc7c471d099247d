//! Handlers for `/patients` endpoints.
//!
//! | Method   | Path                       | Notes |
//! |----------|----------------------------|-------|
//! | `GET`    | `/patients`                | |
//! | `POST`   | `/patients`                | 201; `situation` in the body is ignored |
//! | `GET`    | `/patients/{id}`           | 404 if not found |
//! | `PUT`    | `/patients/{id}`           | Partial update; never changes the situation |
//! | `PUT`    | `/patients/{id}/situation` | Body: `{"situation":"CRITICAL"}` |
//! | `DELETE` | `/patients/{id}`           | 204 |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use medcare_core::{
  PersonId,
  entity::{NewPatient, Patient, PatientSituation, PatientUpdate},
  event::EventPublisher,
  store::RegistryStore,
};
use serde::Deserialize;

use crate::{AppState, JsonBody, PathId, auth::Caller, error::ApiError, policy::Operation};

/// `GET /patients`
pub async fn list<S, P>(
  State(state): State<AppState<S, P>>,
  caller: Caller,
) -> Result<Json<Vec<Patient>>, ApiError>
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  state.policy.authorize(Operation::PatientList, &caller)?;
  Ok(Json(state.registry.patients.list().await?))
}

/// `POST /patients`
pub async fn create<S, P>(
  State(state): State<AppState<S, P>>,
  caller: Caller,
  JsonBody(body): JsonBody<NewPatient>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  state.policy.authorize(Operation::PatientCreate, &caller)?;
  let patient = state.registry.patients.create(body).await?;
  Ok((StatusCode::CREATED, Json(patient)))
}

/// `GET /patients/{id}`
pub async fn get_one<S, P>(
  State(state): State<AppState<S, P>>,
  caller: Caller,
  PathId(id): PathId<PersonId>,
) -> Result<Json<Patient>, ApiError>
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  state.policy.authorize(Operation::PatientGet, &caller)?;
  Ok(Json(state.registry.patients.find(id).await?))
}

/// `PUT /patients/{id}`
pub async fn update<S, P>(
  State(state): State<AppState<S, P>>,
  caller: Caller,
  PathId(id): PathId<PersonId>,
  JsonBody(body): JsonBody<PatientUpdate>,
) -> Result<Json<Patient>, ApiError>
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  state.policy.authorize(Operation::PatientUpdate, &caller)?;
  Ok(Json(state.registry.patients.update(id, body).await?))
}

#[derive(Debug, Deserialize)]
pub struct SituationBody {
  pub situation: PatientSituation,
}

/// `PUT /patients/{id}/situation`
pub async fn advance_situation<S, P>(
  State(state): State<AppState<S, P>>,
  caller: Caller,
  PathId(id): PathId<PersonId>,
  JsonBody(body): JsonBody<SituationBody>,
) -> Result<Json<Patient>, ApiError>
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  state.policy.authorize(Operation::PatientAdvanceSituation, &caller)?;
  Ok(Json(
    state
      .registry
      .patients
      .advance_situation(id, body.situation)
      .await?,
  ))
}

/// `DELETE /patients/{id}`
pub async fn delete<S, P>(
  State(state): State<AppState<S, P>>,
  caller: Caller,
  PathId(id): PathId<PersonId>,
) -> Result<StatusCode, ApiError>
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  state.policy.authorize(Operation::PatientDelete, &caller)?;
  state.registry.patients.delete(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
