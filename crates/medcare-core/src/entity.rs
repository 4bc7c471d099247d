//! Person-derived entities: patients, medics, and assistants.
//!
//! Each entity embeds a [`Person`] by value and adds role-specific details.
//! Storage backends see the tagged union [`Record`] / [`Details`]; callers work
//! with the typed structs and convert through [`Entity`].

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::person::{NewPerson, Person, PersonPatch, merge};

// ─── Roles ───────────────────────────────────────────────────────────────────

/// The kind of person-derived entity. Also the role tag carried by
/// user-creation events.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
  Patient,
  Medic,
  Assistant,
}

impl Role {
  /// Lower-case noun used in messages.
  pub fn noun(self) -> &'static str {
    match self {
      Self::Patient => "patient",
      Self::Medic => "medic",
      Self::Assistant => "assistant",
    }
  }
}

// ─── Patient ─────────────────────────────────────────────────────────────────

/// Clinical situation of a patient.
///
/// Every patient starts as [`PatientSituation::NotDefined`]; only a medic may
/// move it afterwards.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PatientSituation {
  Stable,
  #[serde(rename = "IN_OBS")]
  #[strum(serialize = "IN_OBS")]
  InObservation,
  Hospitalized,
  Surgery,
  Critical,
  Recovering,
  Discharge,
  #[default]
  NotDefined,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientDetails {
  pub health_plan: Option<String>,
  /// Free-text clinical notes.
  pub description: Option<String>,
  pub symptoms:    Vec<String>,
  pub allergies:   Vec<String>,
  pub situation:   PatientSituation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
  #[serde(flatten)]
  pub person:  Person,
  #[serde(flatten)]
  pub details: PatientDetails,
}

/// Creation payload for a patient.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPatient {
  #[serde(flatten)]
  pub person:      NewPerson,
  pub health_plan: Option<String>,
  pub description: Option<String>,
  #[serde(default)]
  pub symptoms:    Vec<String>,
  #[serde(default)]
  pub allergies:   Vec<String>,
  /// Accepted for compatibility and ignored: a new patient is always
  /// `NOT_DEFINED`.
  #[serde(default)]
  pub situation:   Option<PatientSituation>,
}

/// Partial update for a patient. The situation is deliberately absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientUpdate {
  #[serde(flatten)]
  pub person:      PersonPatch,
  pub health_plan: Option<String>,
  pub description: Option<String>,
  pub symptoms:    Option<Vec<String>>,
  pub allergies:   Option<Vec<String>>,
}

impl PatientUpdate {
  pub fn apply(self, target: &mut Patient) {
    self.person.apply(&mut target.person);
    if self.health_plan.is_some() {
      target.details.health_plan = self.health_plan;
    }
    if self.description.is_some() {
      target.details.description = self.description;
    }
    merge(&mut target.details.symptoms, self.symptoms);
    merge(&mut target.details.allergies, self.allergies);
  }
}

// ─── Medic ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicDetails {
  /// Medical-board registration number; unique across medics.
  pub crm:               String,
  pub medical_specialty: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medic {
  #[serde(flatten)]
  pub person:  Person,
  #[serde(flatten)]
  pub details: MedicDetails,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMedic {
  #[serde(flatten)]
  pub person:  NewPerson,
  #[serde(flatten)]
  pub details: MedicDetails,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MedicUpdate {
  #[serde(flatten)]
  pub person:            PersonPatch,
  pub crm:               Option<String>,
  pub medical_specialty: Option<String>,
}

impl MedicUpdate {
  pub fn apply(self, target: &mut Medic) {
    self.person.apply(&mut target.person);
    merge(&mut target.details.crm, self.crm);
    merge(&mut target.details.medical_specialty, self.medical_specialty);
  }
}

// ─── Assistant ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantDetails {
  /// Generated at creation; never taken from the caller.
  pub registration_number: String,
  pub active:              bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assistant {
  #[serde(flatten)]
  pub person:  Person,
  #[serde(flatten)]
  pub details: AssistantDetails,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAssistant {
  #[serde(flatten)]
  pub person:              NewPerson,
  /// Ignored; a fresh number is generated.
  #[serde(default)]
  pub registration_number: Option<String>,
  pub active:              Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantUpdate {
  #[serde(flatten)]
  pub person: PersonPatch,
  pub active: Option<bool>,
}

impl AssistantUpdate {
  pub fn apply(self, target: &mut Assistant) {
    self.person.apply(&mut target.person);
    merge(&mut target.details.active, self.active);
  }
}

// ─── Storage records ─────────────────────────────────────────────────────────

/// Role-specific columns, tagged by role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Details {
  Patient(PatientDetails),
  Medic(MedicDetails),
  Assistant(AssistantDetails),
}

impl Details {
  pub fn role(&self) -> Role {
    match self {
      Self::Patient(_) => Role::Patient,
      Self::Medic(_) => Role::Medic,
      Self::Assistant(_) => Role::Assistant,
    }
  }
}

/// Input to [`crate::store::RegistryStore::insert_record`]. Ids are assigned
/// by the store.
#[derive(Debug, Clone)]
pub struct NewRecord {
  pub person:  NewPerson,
  pub details: Details,
}

/// A persisted person row joined with its address and role row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
  pub person:  Person,
  pub details: Details,
}

// ─── Typed access ────────────────────────────────────────────────────────────

/// Conversion between a typed entity and the storage [`Record`].
pub trait Entity: Sized + Send {
  const ROLE: Role;

  /// `None` when the record belongs to a different role.
  fn from_record(record: Record) -> Option<Self>;

  fn into_record(self) -> Record;

  fn person(&self) -> &Person;
}

macro_rules! impl_entity {
  ($ty:ident, $variant:ident) => {
    impl Entity for $ty {
      const ROLE: Role = Role::$variant;

      fn from_record(record: Record) -> Option<Self> {
        match record.details {
          Details::$variant(details) => Some(Self { person: record.person, details }),
          _ => None,
        }
      }

      fn into_record(self) -> Record {
        Record { person: self.person, details: Details::$variant(self.details) }
      }

      fn person(&self) -> &Person { &self.person }
    }
  };
}

impl_entity!(Patient, Patient);
impl_entity!(Medic, Medic);
impl_entity!(Assistant, Assistant);

#[cfg(test)]
mod tests {
  use std::str::FromStr as _;

  use super::*;

  #[test]
  fn role_wire_names() {
    assert_eq!(Role::Medic.to_string(), "MEDIC");
    assert_eq!(Role::from_str("ASSISTANT").unwrap(), Role::Assistant);
    assert_eq!(serde_json::to_value(Role::Patient).unwrap(), "PATIENT");
  }

  #[test]
  fn situation_wire_names() {
    assert_eq!(
      serde_json::to_value(PatientSituation::InObservation).unwrap(),
      "IN_OBS"
    );
    assert_eq!(PatientSituation::NotDefined.to_string(), "NOT_DEFINED");
    assert_eq!(
      PatientSituation::from_str("IN_OBS").unwrap(),
      PatientSituation::InObservation
    );
    assert_eq!(PatientSituation::default(), PatientSituation::NotDefined);
  }

  #[test]
  fn new_patient_accepts_flat_payload() {
    let body = serde_json::json!({
      "name": "Maria",
      "birth_date": "1985-01-30",
      "cpf": "529.982.247-25",
      "gender": "F",
      "email": "maria@email.com",
      "phone": "11988887777",
      "address": {
        "street": "Rua A", "number": 1, "neighborhood": "Centro",
        "city": "Campinas", "state": "SP", "zip_code": "13000-000",
        "habitation": "HOUSE"
      },
      "symptoms": ["febre"],
      "situation": "CRITICAL"
    });
    let p: NewPatient = serde_json::from_value(body).unwrap();
    assert_eq!(p.person.data.cpf, "529.982.247-25");
    assert_eq!(p.symptoms, vec!["febre".to_string()]);
    assert!(p.allergies.is_empty());
    assert_eq!(p.situation, Some(PatientSituation::Critical));
  }
}
