//! JSON REST API for the MedCare registry.
//!
//! Exposes an axum [`Router`] backed by a [`Registry`] over any
//! [`RegistryStore`] and [`EventPublisher`]. Every route is guarded by the
//! [`AccessPolicy`]; TLS and transport concerns are the caller's
//! responsibility.

pub mod addresses;
pub mod assistants;
pub mod auth;
pub mod error;
pub mod medics;
pub mod patients;
pub mod persons;
pub mod policy;

use std::sync::Arc;

use axum::{
  Router,
  extract::{FromRequest, FromRequestParts},
  routing::{get, put},
};
use medcare_core::{event::EventPublisher, store::RegistryStore};
use medcare_registry::Registry;

pub use auth::{Caller, Claims, JwtVerifier, Principal};
pub use error::ApiError;
pub use policy::{AccessPolicy, Operation};

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, P> {
  pub registry: Arc<Registry<S, P>>,
  pub policy:   Arc<AccessPolicy>,
  pub auth:     Arc<JwtVerifier>,
}

impl<S, P> Clone for AppState<S, P> {
  fn clone(&self) -> Self {
    Self {
      registry: self.registry.clone(),
      policy:   self.policy.clone(),
      auth:     self.auth.clone(),
    }
  }
}

/// [`axum::Json`] with rejections reported as [`ApiError`], so malformed
/// bodies get the same `{"error": …}` shape as every other failure.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// [`axum::extract::Path`] with the same error shape as [`JsonBody`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathId<T>(pub T);

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the REST router.
pub fn router<S, P>(state: AppState<S, P>) -> Router
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  Router::new()
    // Patients
    .route("/patients", get(patients::list::<S, P>).post(patients::create::<S, P>))
    .route(
      "/patients/{id}",
      get(patients::get_one::<S, P>)
        .put(patients::update::<S, P>)
        .delete(patients::delete::<S, P>),
    )
    .route("/patients/{id}/situation", put(patients::advance_situation::<S, P>))
    // Medics
    .route("/medics", get(medics::list::<S, P>).post(medics::create::<S, P>))
    .route(
      "/medics/{id}",
      get(medics::get_one::<S, P>)
        .put(medics::update::<S, P>)
        .delete(medics::delete::<S, P>),
    )
    // Assistants
    .route("/assistants", get(assistants::list::<S, P>).post(assistants::create::<S, P>))
    .route(
      "/assistants/{id}",
      get(assistants::get_one::<S, P>)
        .put(assistants::update::<S, P>)
        .delete(assistants::delete::<S, P>),
    )
    // Persons
    .route("/persons", get(persons::list::<S, P>))
    .route("/persons/{id}", get(persons::get_one::<S, P>))
    .route("/persons/{id}/contact", get(persons::contact::<S, P>))
    // Addresses
    .route("/addresses", get(addresses::list::<S, P>))
    .route(
      "/addresses/{id}",
      get(addresses::get_one::<S, P>).put(addresses::update::<S, P>),
    )
    .with_state(state)
}

#[cfg(test)]
mod tests;
