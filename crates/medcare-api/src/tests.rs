//! End-to-end router tests against an in-memory store.

use std::{collections::HashMap, sync::Arc};

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use medcare_core::{entity::Role, event::InMemoryPublisher};
use medcare_registry::{Registry, RegistryConfig};
use medcare_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{AccessPolicy, AppState, Claims, JwtVerifier, router};

// base64 of "router-test-secret-router-test-secret"
const SECRET: &str = "cm91dGVyLXRlc3Qtc2VjcmV0LXJvdXRlci10ZXN0LXNlY3JldA==";

type State = AppState<SqliteStore, InMemoryPublisher>;

async fn make_state_with(policy: AccessPolicy) -> (State, InMemoryPublisher) {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let publisher = InMemoryPublisher::new();
  let registry = Registry::new(store, publisher.clone(), RegistryConfig::default());

  let state = AppState {
    registry: Arc::new(registry),
    policy:   Arc::new(policy),
    auth:     Arc::new(JwtVerifier::from_base64_secret(SECRET).unwrap()),
  };
  (state, publisher)
}

async fn make_state() -> (State, InMemoryPublisher) {
  make_state_with(AccessPolicy::default()).await
}

fn token(role: &str) -> String {
  let claims = Claims {
    sub:  format!("{}@medcare.test", role.to_lowercase()),
    role: role.into(),
    exp:  jsonwebtoken::get_current_timestamp() + 600,
  };
  jsonwebtoken::encode(
    &Header::new(Algorithm::HS256),
    &claims,
    &EncodingKey::from_base64_secret(SECRET).unwrap(),
  )
  .unwrap()
}

async fn send(
  state:  &State,
  method: &str,
  uri:    &str,
  role:   Option<&str>,
  body:   Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(role) = role {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(role)));
  }
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };

  let resp = router(state.clone())
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, value)
}

fn person_json(email: &str, cpf: &str) -> Value {
  json!({
    "name": "Maria Souza",
    "birth_date": "1985-01-30",
    "cpf": cpf,
    "gender": "F",
    "email": email,
    "phone": "11988887777",
    "address": {
      "street": "Rua das Flores",
      "number": 120,
      "neighborhood": "Centro",
      "city": "Campinas",
      "state": "SP",
      "zip_code": "13010-000",
      "habitation": "APARTMENT"
    }
  })
}

fn with(mut base: Value, extra: Value) -> Value {
  let (Some(base_map), Value::Object(extra)) = (base.as_object_mut(), extra) else {
    panic!("both values must be objects");
  };
  base_map.extend(extra);
  base
}

fn medic_json(email: &str, cpf: &str, crm: &str) -> Value {
  with(person_json(email, cpf), json!({ "crm": crm, "medical_specialty": "Cardiologia" }))
}

// ─── Patients ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn patient_creation_is_public_and_starts_not_defined() {
  let (state, events) = make_state().await;
  let body = with(
    person_json("maria@email.com", "529.982.247-25"),
    json!({ "symptoms": ["febre"], "situation": "CRITICAL" }),
  );

  let (status, patient) = send(&state, "POST", "/patients", None, Some(body)).await;
  assert_eq!(status, StatusCode::CREATED, "{patient}");
  assert_eq!(patient["situation"], "NOT_DEFINED");
  assert_eq!(patient["cpf"], "52998224725");
  assert_eq!(patient["symptoms"], json!(["febre"]));

  let id = patient["id"].as_i64().unwrap();
  let published = events.events();
  assert_eq!(published.len(), 1);
  assert_eq!(published[0].person_id, id);
  assert_eq!(published[0].role, Role::Patient);
}

#[tokio::test]
async fn patient_listing_needs_staff_role() {
  let (state, _) = make_state().await;
  send(&state, "POST", "/patients", None, Some(person_json("a@email.com", "52998224725"))).await;

  let (status, body) = send(&state, "GET", "/patients", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert!(body["error"].is_string());

  let (status, _) = send(&state, "GET", "/patients", Some("PATIENT"), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, list) = send(&state, "GET", "/patients", Some("ASSISTANT"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_token_is_unauthorized_even_on_public_route() {
  let (state, _) = make_state().await;
  let req = Request::builder()
    .method("POST")
    .uri("/patients")
    .header(header::AUTHORIZATION, "Bearer not.a.jwt")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(person_json("a@email.com", "52998224725").to_string()))
    .unwrap();

  let resp = router(state).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_email_is_conflict() {
  let (state, events) = make_state().await;
  send(&state, "POST", "/patients", None, Some(person_json("a@email.com", "52998224725"))).await;

  let (status, body) =
    send(&state, "POST", "/patients", None, Some(person_json("a@email.com", "11144477735"))).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].as_str().unwrap().contains("a@email.com"));
  assert_eq!(events.events().len(), 1);
}

#[tokio::test]
async fn bad_cpf_and_malformed_json_are_bad_requests() {
  let (state, _) = make_state().await;

  let (status, body) =
    send(&state, "POST", "/patients", None, Some(person_json("a@email.com", "12345678900"))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("CPF"));

  let (status, body) =
    send(&state, "POST", "/patients", None, Some(json!({ "name": "no address" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn update_email_only() {
  let (state, _) = make_state().await;
  let (_, created) =
    send(&state, "POST", "/patients", None, Some(person_json("a@email.com", "52998224725"))).await;
  let id = created["id"].as_i64().unwrap();

  let (status, updated) = send(
    &state,
    "PUT",
    &format!("/patients/{id}"),
    Some("ADMIN"),
    Some(json!({ "email": "novo@email.com" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{updated}");

  let mut expected = created.clone();
  expected["email"] = json!("novo@email.com");
  assert_eq!(updated, expected);

  let (_, fetched) = send(&state, "GET", &format!("/patients/{id}"), Some("PATIENT"), None).await;
  assert_eq!(fetched, expected);
}

#[tokio::test]
async fn situation_is_advanced_by_medics_only() {
  let (state, _) = make_state().await;
  let (_, created) =
    send(&state, "POST", "/patients", None, Some(person_json("a@email.com", "52998224725"))).await;
  let uri = format!("/patients/{}/situation", created["id"]);

  let (status, _) =
    send(&state, "PUT", &uri, Some("ADMIN"), Some(json!({ "situation": "STABLE" }))).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, patient) =
    send(&state, "PUT", &uri, Some("MEDIC"), Some(json!({ "situation": "IN_OBS" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(patient["situation"], "IN_OBS");

  let (status, _) =
    send(&state, "PUT", &uri, Some("MEDIC"), Some(json!({ "situation": "NOT_DEFINED" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_missing_patient_is_not_found() {
  let (state, _) = make_state().await;
  let (status, body) = send(&state, "DELETE", "/patients/99", Some("ADMIN"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "patient 99 not found, nothing was deleted");
}

#[tokio::test]
async fn delete_patient_then_get_is_not_found() {
  let (state, _) = make_state().await;
  let (_, created) =
    send(&state, "POST", "/patients", None, Some(person_json("a@email.com", "52998224725"))).await;
  let uri = format!("/patients/{}", created["id"]);

  let (status, body) = send(&state, "DELETE", &uri, Some("PATIENT"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  assert_eq!(body, Value::Null);

  let (status, _) = send(&state, "GET", &uri, Some("ADMIN"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_id_is_bad_request_with_error_body() {
  let (state, _) = make_state().await;

  for uri in ["/medics/abc", "/persons/abc/contact", "/addresses/x1"] {
    let (status, body) = send(&state, "GET", uri, Some("ADMIN"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    assert!(body["error"].as_str().unwrap().starts_with("bad request"), "{uri}: {body}");
  }
}

// ─── Medics ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn medic_with_new_crm_is_created_and_announced() {
  let (state, events) = make_state().await;

  let (status, medic) = send(
    &state,
    "POST",
    "/medics",
    Some("ADMIN"),
    Some(medic_json("dr@email.com", "11144477735", "123321123")),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{medic}");
  assert_eq!(medic["crm"], "123321123");

  let published = events.events();
  assert_eq!(published.len(), 1);
  assert_eq!(published[0].role, Role::Medic);
  assert_eq!(published[0].person_id, medic["id"].as_i64().unwrap());

  let (status, _) = send(
    &state,
    "POST",
    "/medics",
    Some("ADMIN"),
    Some(medic_json("other@email.com", "52998224725", "123321123")),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(events.events().len(), 1);

  let (_, list) = send(&state, "GET", "/medics", Some("PATIENT"), None).await;
  assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn medic_creation_requires_token_and_role() {
  let (state, _) = make_state().await;
  let body = medic_json("dr@email.com", "11144477735", "1");

  let (status, _) = send(&state, "POST", "/medics", None, Some(body.clone())).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, _) = send(&state, "POST", "/medics", Some("PATIENT"), Some(body)).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

// ─── Assistants ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn assistant_registration_number_is_generated() {
  let (state, _) = make_state().await;
  let body = with(
    person_json("ana@email.com", "12345678909"),
    json!({ "registration_number": "000000001" }),
  );

  let (status, assistant) = send(&state, "POST", "/assistants", Some("ADMIN"), Some(body)).await;
  assert_eq!(status, StatusCode::CREATED, "{assistant}");
  let number = assistant["registration_number"].as_str().unwrap();
  assert_eq!(number.len(), 9);
  assert_eq!(assistant["active"], true);

  let uri = format!("/assistants/{}", assistant["id"]);
  let (status, _) = send(&state, "GET", &uri, Some("MEDIC"), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  let (status, fetched) = send(&state, "GET", &uri, Some("ASSISTANT"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(fetched, assistant);
}

// ─── Persons & addresses ─────────────────────────────────────────────────────

#[tokio::test]
async fn persons_and_contact_views() {
  let (state, _) = make_state().await;
  let (_, patient) =
    send(&state, "POST", "/patients", None, Some(person_json("a@email.com", "52998224725"))).await;
  send(
    &state,
    "POST",
    "/medics",
    Some("ADMIN"),
    Some(medic_json("b@email.com", "11144477735", "9")),
  )
  .await;

  let (status, _) = send(&state, "GET", "/persons", Some("MEDIC"), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  let (_, persons) = send(&state, "GET", "/persons", Some("ADMIN"), None).await;
  assert_eq!(persons.as_array().unwrap().len(), 2);

  let uri = format!("/persons/{}/contact", patient["id"]);
  let (status, contact) = send(&state, "GET", &uri, Some("PATIENT"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(
    contact,
    json!({ "id": patient["id"], "email": "a@email.com", "name": "Maria Souza" })
  );

  let (status, _) = send(&state, "GET", "/persons/404", Some("ADMIN"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn address_partial_update() {
  let (state, _) = make_state().await;
  let (_, patient) =
    send(&state, "POST", "/patients", None, Some(person_json("a@email.com", "52998224725"))).await;
  let uri = format!("/addresses/{}", patient["address"]["id"]);

  let (status, address) = send(
    &state,
    "PUT",
    &uri,
    Some("ASSISTANT"),
    Some(json!({ "number": 7, "habitation": "KITNET" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{address}");
  assert_eq!(address["number"], 7);
  assert_eq!(address["habitation"], "KITNET");
  assert_eq!(address["street"], "Rua das Flores");

  let (_, fetched) = send(&state, "GET", &uri, Some("PATIENT"), None).await;
  assert_eq!(fetched, address);

  let (status, _) =
    send(&state, "PUT", "/addresses/999", Some("ADMIN"), Some(json!({ "number": 1 }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Policy overrides ────────────────────────────────────────────────────────

#[tokio::test]
async fn configured_policy_replaces_defaults() {
  let overrides = HashMap::from([("patient_list".to_string(), vec!["PUBLIC".to_string()])]);
  let (state, _) = make_state_with(AccessPolicy::with_overrides(&overrides).unwrap()).await;

  let (status, list) = send(&state, "GET", "/patients", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(list, json!([]));
}
