//! Bearer-token extractor and standalone verifier.
//!
//! Tokens are HS256 JWTs signed with a base64-encoded shared secret and carry
//! a `role` claim, e.g. `{"sub": "ana@email.com", "role": "ADMIN", "exp": …}`.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use medcare_core::{event::EventPublisher, store::RegistryStore};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

/// JWT payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  pub sub:  String,
  pub role: String,
  /// Expiry, seconds since the Unix epoch.
  pub exp:  u64,
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
  pub subject: String,
  /// Upper-cased role name, e.g. `ADMIN` or `MEDIC`.
  pub role:    String,
}

/// Checks token signatures and expiry.
pub struct JwtVerifier {
  key:        DecodingKey,
  validation: Validation,
}

impl JwtVerifier {
  /// Build a verifier from a base64-encoded HS256 secret.
  pub fn from_base64_secret(secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
    Ok(Self {
      key:        DecodingKey::from_base64_secret(secret)?,
      validation: Validation::new(Algorithm::HS256),
    })
  }

  pub fn verify(&self, token: &str) -> Result<Principal, ApiError> {
    let data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)
      .map_err(|e| ApiError::Unauthorized(format!("invalid token: {e}")))?;
    Ok(Principal {
      subject: data.claims.sub,
      role:    data.claims.role.to_ascii_uppercase(),
    })
  }
}

/// Verify the bearer token in `headers`, if there is one.
pub fn verify_bearer(
  headers: &HeaderMap,
  verifier: &JwtVerifier,
) -> Result<Option<Principal>, ApiError> {
  let Some(value) = headers.get(header::AUTHORIZATION) else {
    return Ok(None);
  };

  let token = value
    .to_str()
    .ok()
    .and_then(|v| v.strip_prefix("Bearer "))
    .ok_or_else(|| ApiError::Unauthorized("expected a bearer token".into()))?;

  verifier.verify(token.trim()).map(Some)
}

/// The caller of a request: `None` when no token was sent. A token that is
/// sent but invalid rejects the request outright.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<Principal>);

impl Caller {
  pub fn principal(&self) -> Result<&Principal, ApiError> {
    self
      .0
      .as_ref()
      .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))
  }
}

impl<S, P> FromRequestParts<AppState<S, P>> for Caller
where
  S: RegistryStore + 'static,
  P: EventPublisher + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, P>,
  ) -> Result<Self, Self::Rejection> {
    verify_bearer(&parts.headers, &state.auth).map(Caller)
  }
}
