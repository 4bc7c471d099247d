//! Person and address types shared by every person-derived entity.
//!
//! A person is never created on its own: it is always embedded by value in a
//! patient, medic, or assistant (see [`crate::entity`]).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{Error, PersonId, Result};

// ─── Address ─────────────────────────────────────────────────────────────────

/// The kind of dwelling at an address.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Habitation {
  Apartment,
  House,
  /// A studio unit.
  Kitnet,
}

/// Address fields as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressData {
  pub street:       String,
  pub number:       i32,
  pub neighborhood: String,
  #[serde(default)]
  pub complement:   Option<String>,
  pub city:         String,
  /// Two-letter federative unit, e.g. "SP".
  pub state:        String,
  pub zip_code:     String,
  pub habitation:   Habitation,
}

/// A persisted address. Owned 1:1 by a person and deleted with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
  pub id:   i64,
  #[serde(flatten)]
  pub data: AddressData,
}

/// Partial address update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressPatch {
  pub street:       Option<String>,
  pub number:       Option<i32>,
  pub neighborhood: Option<String>,
  pub complement:   Option<String>,
  pub city:         Option<String>,
  pub state:        Option<String>,
  pub zip_code:     Option<String>,
  pub habitation:   Option<Habitation>,
}

impl AddressPatch {
  pub fn apply(self, target: &mut AddressData) {
    merge(&mut target.street, self.street);
    merge(&mut target.number, self.number);
    merge(&mut target.neighborhood, self.neighborhood);
    if self.complement.is_some() {
      target.complement = self.complement;
    }
    merge(&mut target.city, self.city);
    merge(&mut target.state, self.state);
    merge(&mut target.zip_code, self.zip_code);
    merge(&mut target.habitation, self.habitation);
  }
}

impl AddressData {
  /// Reject blank mandatory fields.
  pub fn check_required(&self) -> Result<()> {
    require("address.street", &self.street)?;
    require("address.neighborhood", &self.neighborhood)?;
    require("address.city", &self.city)?;
    require("address.state", &self.state)?;
    require("address.zip_code", &self.zip_code)?;
    Ok(())
  }
}

// ─── Person ──────────────────────────────────────────────────────────────────

/// The scalar identity fields every person-derived entity carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonData {
  pub name:       String,
  pub birth_date: NaiveDate,
  /// Stored normalised to 11 digits; callers may send it masked.
  pub cpf:        String,
  pub gender:     String,
  pub email:      String,
  pub phone:      String,
}

impl PersonData {
  /// Reject blank mandatory fields and an obviously malformed email.
  pub fn check_required(&self) -> Result<()> {
    require("name", &self.name)?;
    require("cpf", &self.cpf)?;
    require("gender", &self.gender)?;
    require("email", &self.email)?;
    require("phone", &self.phone)?;
    if !self.email.contains('@') {
      return Err(Error::Validation(format!(
        "email {:?} is not an email address",
        self.email
      )));
    }
    Ok(())
  }
}

/// Input for creating the person part of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerson {
  #[serde(flatten)]
  pub data:    PersonData,
  pub address: AddressData,
}

/// A persisted person together with its owned address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub id:      PersonId,
  #[serde(flatten)]
  pub data:    PersonData,
  pub address: Address,
}

/// Partial person update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonPatch {
  pub name:       Option<String>,
  pub birth_date: Option<NaiveDate>,
  pub cpf:        Option<String>,
  pub gender:     Option<String>,
  pub email:      Option<String>,
  pub phone:      Option<String>,
  pub address:    Option<AddressPatch>,
}

impl PersonPatch {
  pub fn apply(self, target: &mut Person) {
    merge(&mut target.data.name, self.name);
    merge(&mut target.data.birth_date, self.birth_date);
    merge(&mut target.data.cpf, self.cpf);
    merge(&mut target.data.gender, self.gender);
    merge(&mut target.data.email, self.email);
    merge(&mut target.data.phone, self.phone);
    if let Some(address) = self.address {
      address.apply(&mut target.address.data);
    }
  }
}

/// The reduced view handed to e-mail sending collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonContact {
  pub id:    PersonId,
  pub email: String,
  pub name:  String,
}

impl From<&Person> for PersonContact {
  fn from(p: &Person) -> Self {
    Self {
      id:    p.id,
      email: p.data.email.clone(),
      name:  p.data.name.clone(),
    }
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

pub(crate) fn merge<T>(slot: &mut T, value: Option<T>) {
  if let Some(v) = value {
    *slot = v;
  }
}

fn require(field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::Validation(format!("{field} must not be blank")));
  }
  Ok(())
}
