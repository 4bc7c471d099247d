//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as ISO 8601 strings, enums by their wire name, and string
//! lists as compact JSON arrays.

use std::str::FromStr;

use chrono::NaiveDate;
use medcare_core::{
  entity::{
    AssistantDetails, Details, MedicDetails, PatientDetails, PatientSituation,
    Record, Role,
  },
  person::{Address, AddressData, Habitation, Person, PersonData},
};

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_list(items: &[String]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

pub fn decode_list(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

/// Parse a strum-backed enum, naming the column kind on failure.
pub fn decode_variant<T: FromStr>(kind: &'static str, s: &str) -> Result<T> {
  T::from_str(s).map_err(|_| Error::UnknownVariant { kind, value: s.to_owned() })
}

// ─── SQL fragments ───────────────────────────────────────────────────────────

/// Columns read by [`RawPerson::from_row`], in order.
pub const PERSON_COLUMNS: &str = "
  p.person_id, p.name, p.birth_date, p.cpf, p.gender, p.email, p.phone,
  a.address_id, a.street, a.number, a.neighborhood, a.complement,
  a.city, a.state, a.zip_code, a.habitation";

/// Number of columns in [`PERSON_COLUMNS`]; role columns start here.
pub const PERSON_WIDTH: usize = 16;

/// Columns read by [`RawAddress::from_row`], in order.
pub const ADDRESS_COLUMNS: &str = "
  address_id, street, number, neighborhood, complement,
  city, state, zip_code, habitation";

pub fn role_table(role: Role) -> &'static str {
  match role {
    Role::Patient => "patients",
    Role::Medic => "medics",
    Role::Assistant => "assistants",
  }
}

/// Role-specific columns read by [`RawDetails::from_row`], in order.
pub fn role_columns(role: Role) -> &'static str {
  match role {
    Role::Patient => "r.health_plan, r.description, r.symptoms, r.allergies, r.situation",
    Role::Medic => "r.crm, r.medical_specialty",
    Role::Assistant => "r.registration_number, r.active",
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from an `addresses` row.
pub struct RawAddress {
  pub address_id:   i64,
  pub street:       String,
  pub number:       i32,
  pub neighborhood: String,
  pub complement:   Option<String>,
  pub city:         String,
  pub state:        String,
  pub zip_code:     String,
  pub habitation:   String,
}

impl RawAddress {
  pub fn from_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      address_id:   row.get(offset)?,
      street:       row.get(offset + 1)?,
      number:       row.get(offset + 2)?,
      neighborhood: row.get(offset + 3)?,
      complement:   row.get(offset + 4)?,
      city:         row.get(offset + 5)?,
      state:        row.get(offset + 6)?,
      zip_code:     row.get(offset + 7)?,
      habitation:   row.get(offset + 8)?,
    })
  }

  pub fn into_address(self) -> Result<Address> {
    Ok(Address {
      id:   self.address_id,
      data: AddressData {
        street:       self.street,
        number:       self.number,
        neighborhood: self.neighborhood,
        complement:   self.complement,
        city:         self.city,
        state:        self.state,
        zip_code:     self.zip_code,
        habitation:   decode_variant::<Habitation>("habitation", &self.habitation)?,
      },
    })
  }
}

/// Raw values read from a `persons` row joined with its address.
pub struct RawPerson {
  pub person_id:  i64,
  pub name:       String,
  pub birth_date: String,
  pub cpf:        String,
  pub gender:     String,
  pub email:      String,
  pub phone:      String,
  pub address:    RawAddress,
}

impl RawPerson {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      person_id:  row.get(0)?,
      name:       row.get(1)?,
      birth_date: row.get(2)?,
      cpf:        row.get(3)?,
      gender:     row.get(4)?,
      email:      row.get(5)?,
      phone:      row.get(6)?,
      address:    RawAddress::from_row(row, 7)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:      self.person_id,
      data:    PersonData {
        name:       self.name,
        birth_date: decode_date(&self.birth_date)?,
        cpf:        self.cpf,
        gender:     self.gender,
        email:      self.email,
        phone:      self.phone,
      },
      address: self.address.into_address()?,
    })
  }
}

/// Raw values read from one of the role tables.
pub enum RawDetails {
  Patient {
    health_plan: Option<String>,
    description: Option<String>,
    symptoms:    String,
    allergies:   String,
    situation:   String,
  },
  Medic {
    crm:               String,
    medical_specialty: String,
  },
  Assistant {
    registration_number: String,
    active:              bool,
  },
}

impl RawDetails {
  pub fn from_row(
    role: Role,
    row: &rusqlite::Row<'_>,
    offset: usize,
  ) -> rusqlite::Result<Self> {
    Ok(match role {
      Role::Patient => Self::Patient {
        health_plan: row.get(offset)?,
        description: row.get(offset + 1)?,
        symptoms:    row.get(offset + 2)?,
        allergies:   row.get(offset + 3)?,
        situation:   row.get(offset + 4)?,
      },
      Role::Medic => Self::Medic {
        crm:               row.get(offset)?,
        medical_specialty: row.get(offset + 1)?,
      },
      Role::Assistant => Self::Assistant {
        registration_number: row.get(offset)?,
        active:              row.get(offset + 1)?,
      },
    })
  }

  /// Encode domain details into column values.
  pub fn encode(details: &Details) -> Result<Self> {
    Ok(match details {
      Details::Patient(d) => Self::Patient {
        health_plan: d.health_plan.clone(),
        description: d.description.clone(),
        symptoms:    encode_list(&d.symptoms)?,
        allergies:   encode_list(&d.allergies)?,
        situation:   d.situation.to_string(),
      },
      Details::Medic(d) => Self::Medic {
        crm:               d.crm.clone(),
        medical_specialty: d.medical_specialty.clone(),
      },
      Details::Assistant(d) => Self::Assistant {
        registration_number: d.registration_number.clone(),
        active:              d.active,
      },
    })
  }

  pub fn into_details(self) -> Result<Details> {
    Ok(match self {
      Self::Patient { health_plan, description, symptoms, allergies, situation } => {
        Details::Patient(PatientDetails {
          health_plan,
          description,
          symptoms: decode_list(&symptoms)?,
          allergies: decode_list(&allergies)?,
          situation: decode_variant::<PatientSituation>("situation", &situation)?,
        })
      }
      Self::Medic { crm, medical_specialty } => {
        Details::Medic(MedicDetails { crm, medical_specialty })
      }
      Self::Assistant { registration_number, active } => {
        Details::Assistant(AssistantDetails { registration_number, active })
      }
    })
  }

  /// Insert this role row for `person_id`.
  pub fn insert(&self, conn: &rusqlite::Connection, person_id: i64) -> rusqlite::Result<()> {
    match self {
      Self::Patient { health_plan, description, symptoms, allergies, situation } => {
        conn.execute(
          "INSERT INTO patients
             (person_id, health_plan, description, symptoms, allergies, situation)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![person_id, health_plan, description, symptoms, allergies, situation],
        )?;
      }
      Self::Medic { crm, medical_specialty } => {
        conn.execute(
          "INSERT INTO medics (person_id, crm, medical_specialty) VALUES (?1, ?2, ?3)",
          rusqlite::params![person_id, crm, medical_specialty],
        )?;
      }
      Self::Assistant { registration_number, active } => {
        conn.execute(
          "INSERT INTO assistants (person_id, registration_number, active)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![person_id, registration_number, active],
        )?;
      }
    }
    Ok(())
  }

  /// Overwrite this role row for `person_id`.
  pub fn update(&self, conn: &rusqlite::Connection, person_id: i64) -> rusqlite::Result<()> {
    match self {
      Self::Patient { health_plan, description, symptoms, allergies, situation } => {
        conn.execute(
          "UPDATE patients
              SET health_plan = ?2, description = ?3, symptoms = ?4,
                  allergies = ?5, situation = ?6
            WHERE person_id = ?1",
          rusqlite::params![person_id, health_plan, description, symptoms, allergies, situation],
        )?;
      }
      Self::Medic { crm, medical_specialty } => {
        conn.execute(
          "UPDATE medics SET crm = ?2, medical_specialty = ?3 WHERE person_id = ?1",
          rusqlite::params![person_id, crm, medical_specialty],
        )?;
      }
      Self::Assistant { registration_number, active } => {
        conn.execute(
          "UPDATE assistants SET registration_number = ?2, active = ?3
            WHERE person_id = ?1",
          rusqlite::params![person_id, registration_number, active],
        )?;
      }
    }
    Ok(())
  }
}

/// A person row joined with its address and role row.
pub struct RawRecord {
  pub person:  RawPerson,
  pub details: RawDetails,
}

impl RawRecord {
  pub fn from_row(role: Role, row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      person:  RawPerson::from_row(row)?,
      details: RawDetails::from_row(role, row, PERSON_WIDTH)?,
    })
  }

  pub fn into_record(self) -> Result<Record> {
    Ok(Record {
      person:  self.person.into_person()?,
      details: self.details.into_details()?,
    })
  }
}

// ─── Write parameters ────────────────────────────────────────────────────────

/// Owned column values for the `addresses` table.
pub struct AddressParams {
  pub street:       String,
  pub number:       i32,
  pub neighborhood: String,
  pub complement:   Option<String>,
  pub city:         String,
  pub state:        String,
  pub zip_code:     String,
  pub habitation:   String,
}

impl From<&AddressData> for AddressParams {
  fn from(a: &AddressData) -> Self {
    Self {
      street:       a.street.clone(),
      number:       a.number,
      neighborhood: a.neighborhood.clone(),
      complement:   a.complement.clone(),
      city:         a.city.clone(),
      state:        a.state.clone(),
      zip_code:     a.zip_code.clone(),
      habitation:   a.habitation.to_string(),
    }
  }
}

/// Owned column values for the `persons` table (minus ids).
pub struct PersonParams {
  pub name:       String,
  pub birth_date: String,
  pub cpf:        String,
  pub gender:     String,
  pub email:      String,
  pub phone:      String,
}

impl From<&PersonData> for PersonParams {
  fn from(p: &PersonData) -> Self {
    Self {
      name:       p.name.clone(),
      birth_date: encode_date(p.birth_date),
      cpf:        p.cpf.clone(),
      gender:     p.gender.clone(),
      email:      p.email.clone(),
      phone:      p.phone.clone(),
    }
  }
}
