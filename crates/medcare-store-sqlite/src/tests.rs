//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use medcare_core::{
  entity::{
    AssistantDetails, Details, MedicDetails, NewRecord, PatientDetails,
    PatientSituation, Role,
  },
  person::{AddressData, Habitation, NewPerson, PersonData},
  store::{RegistryStore, StoreError, UniqueField},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_person(email: &str, cpf: &str) -> NewPerson {
  NewPerson {
    data:    PersonData {
      name:       "Maria Souza".into(),
      birth_date: NaiveDate::from_ymd_opt(1985, 1, 30).unwrap(),
      cpf:        cpf.into(),
      gender:     "F".into(),
      email:      email.into(),
      phone:      "11988887777".into(),
    },
    address: AddressData {
      street:       "Rua das Flores".into(),
      number:       120,
      neighborhood: "Centro".into(),
      complement:   Some("apto 12".into()),
      city:         "Campinas".into(),
      state:        "SP".into(),
      zip_code:     "13010-000".into(),
      habitation:   Habitation::Apartment,
    },
  }
}

fn patient(email: &str, cpf: &str) -> NewRecord {
  NewRecord {
    person:  new_person(email, cpf),
    details: Details::Patient(PatientDetails {
      health_plan: Some("Unimed".into()),
      description: None,
      symptoms:    vec!["febre".into(), "tosse".into()],
      allergies:   vec![],
      situation:   PatientSituation::NotDefined,
    }),
  }
}

fn medic(email: &str, cpf: &str, crm: &str) -> NewRecord {
  NewRecord {
    person:  new_person(email, cpf),
    details: Details::Medic(MedicDetails {
      crm:               crm.into(),
      medical_specialty: "Cardiologia".into(),
    }),
  }
}

fn assistant(email: &str, cpf: &str) -> NewRecord {
  NewRecord {
    person:  new_person(email, cpf),
    details: Details::Assistant(AssistantDetails {
      registration_number: "123456789".into(),
      active:              true,
    }),
  }
}

// ─── Insert & read ───────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_patient() {
  let s = store().await;

  let inserted = s
    .insert_record(patient("maria@email.com", "52998224725"))
    .await
    .unwrap();
  assert!(inserted.person.id > 0);
  assert!(inserted.person.address.id > 0);

  let fetched = s
    .get_record(Role::Patient, inserted.person.id)
    .await
    .unwrap()
    .expect("patient exists");
  assert_eq!(fetched, inserted);
}

#[tokio::test]
async fn get_record_with_wrong_role_returns_none() {
  let s = store().await;
  let m = s
    .insert_record(medic("dr@email.com", "11144477735", "123321123"))
    .await
    .unwrap();

  assert!(s.get_record(Role::Patient, m.person.id).await.unwrap().is_none());
  assert!(s.get_record(Role::Medic, m.person.id).await.unwrap().is_some());
}

#[tokio::test]
async fn get_missing_record_returns_none() {
  let s = store().await;
  assert!(s.get_record(Role::Assistant, 99).await.unwrap().is_none());
  assert!(s.get_person(99).await.unwrap().is_none());
}

#[tokio::test]
async fn list_records_filters_by_role_in_id_order() {
  let s = store().await;
  s.insert_record(patient("a@email.com", "52998224725")).await.unwrap();
  s.insert_record(medic("b@email.com", "11144477735", "111")).await.unwrap();
  s.insert_record(patient("c@email.com", "12345678909")).await.unwrap();

  let patients = s.list_records(Role::Patient).await.unwrap();
  let emails: Vec<_> = patients.iter().map(|r| r.person.data.email.as_str()).collect();
  assert_eq!(emails, ["a@email.com", "c@email.com"]);

  assert_eq!(s.list_records(Role::Medic).await.unwrap().len(), 1);
  assert!(s.list_records(Role::Assistant).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_persons_spans_all_roles() {
  let s = store().await;
  s.insert_record(patient("a@email.com", "52998224725")).await.unwrap();
  s.insert_record(medic("b@email.com", "11144477735", "111")).await.unwrap();
  s.insert_record(assistant("c@email.com", "12345678909")).await.unwrap();

  let persons = s.list_persons().await.unwrap();
  assert_eq!(persons.len(), 3);
  assert!(persons.windows(2).all(|w| w[0].id < w[1].id));
}

#[tokio::test]
async fn assistant_flags_round_trip() {
  let s = store().await;
  let mut rec = assistant("c@email.com", "12345678909");
  if let Details::Assistant(d) = &mut rec.details {
    d.active = false;
  }
  let inserted = s.insert_record(rec).await.unwrap();
  let fetched = s.get_record(Role::Assistant, inserted.person.id).await.unwrap().unwrap();

  let Details::Assistant(d) = fetched.details else { panic!("expected assistant") };
  assert!(!d.active);
  assert_eq!(d.registration_number, "123456789");
}

// ─── Uniqueness ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn probes_honour_exclusion() {
  let s = store().await;
  let m = s
    .insert_record(medic("dr@email.com", "11144477735", "123321123"))
    .await
    .unwrap();
  let id = m.person.id;

  assert!(s.email_taken("dr@email.com", None).await.unwrap());
  assert!(!s.email_taken("dr@email.com", Some(id)).await.unwrap());
  assert!(!s.email_taken("other@email.com", None).await.unwrap());

  assert!(s.cpf_taken("11144477735", None).await.unwrap());
  assert!(!s.cpf_taken("11144477735", Some(id)).await.unwrap());

  assert!(s.crm_taken("123321123", None).await.unwrap());
  assert!(!s.crm_taken("123321123", Some(id)).await.unwrap());
}

#[tokio::test]
async fn duplicate_email_is_reported_as_unique_violation() {
  let s = store().await;
  s.insert_record(patient("dup@email.com", "52998224725")).await.unwrap();

  let err = s
    .insert_record(patient("dup@email.com", "11144477735"))
    .await
    .unwrap_err();
  assert_eq!(err.unique_violation(), Some(UniqueField::Email));

  // The failed transaction left nothing behind.
  assert_eq!(s.list_persons().await.unwrap().len(), 1);
  assert_eq!(s.list_addresses().await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_cpf_and_crm_are_classified() {
  let s = store().await;
  s.insert_record(medic("a@email.com", "52998224725", "777")).await.unwrap();

  let err = s
    .insert_record(patient("b@email.com", "52998224725"))
    .await
    .unwrap_err();
  assert_eq!(err.unique_violation(), Some(UniqueField::Cpf));

  let err = s
    .insert_record(medic("c@email.com", "11144477735", "777"))
    .await
    .unwrap_err();
  assert_eq!(err.unique_violation(), Some(UniqueField::Crm));
  assert_eq!(s.list_records(Role::Medic).await.unwrap().len(), 1);
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_record_overwrites_all_parts() {
  let s = store().await;
  let mut rec = s
    .insert_record(patient("maria@email.com", "52998224725"))
    .await
    .unwrap();

  rec.person.data.email = "novo@email.com".into();
  rec.person.address.data.city = "Sorocaba".into();
  if let Details::Patient(d) = &mut rec.details {
    d.situation = PatientSituation::Critical;
    d.allergies = vec!["dipirona".into()];
  }

  let updated = s.update_record(rec.clone()).await.unwrap().expect("exists");
  assert_eq!(updated, rec);

  let fetched = s.get_record(Role::Patient, rec.person.id).await.unwrap().unwrap();
  assert_eq!(fetched, rec);
  assert_eq!(
    s.get_address(rec.person.address.id).await.unwrap().unwrap().data.city,
    "Sorocaba"
  );
}

#[tokio::test]
async fn update_missing_record_returns_none() {
  let s = store().await;
  let mut rec = s
    .insert_record(patient("maria@email.com", "52998224725"))
    .await
    .unwrap();
  rec.person.id = 99;

  assert!(s.update_record(rec).await.unwrap().is_none());
}

#[tokio::test]
async fn update_address_in_place() {
  let s = store().await;
  let rec = s
    .insert_record(patient("maria@email.com", "52998224725"))
    .await
    .unwrap();

  let mut address = rec.person.address.clone();
  address.data.habitation = Habitation::Kitnet;
  address.data.complement = None;

  let updated = s.update_address(address.clone()).await.unwrap();
  assert_eq!(updated, Some(address.clone()));
  let person = s.get_person(rec.person.id).await.unwrap().unwrap();
  assert_eq!(person.address, address);

  address.id = 42;
  assert!(s.update_address(address).await.unwrap().is_none());
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_record_removes_person_role_row_and_address() {
  let s = store().await;
  let m = s
    .insert_record(medic("dr@email.com", "11144477735", "123321123"))
    .await
    .unwrap();
  let id = m.person.id;

  assert!(s.delete_record(Role::Medic, id).await.unwrap());
  assert!(s.get_record(Role::Medic, id).await.unwrap().is_none());
  assert!(s.get_person(id).await.unwrap().is_none());
  assert!(s.get_address(m.person.address.id).await.unwrap().is_none());
  assert!(!s.crm_taken("123321123", None).await.unwrap());

  // A second delete finds nothing.
  assert!(!s.delete_record(Role::Medic, id).await.unwrap());
}

#[tokio::test]
async fn delete_with_wrong_role_keeps_record() {
  let s = store().await;
  let p = s
    .insert_record(patient("maria@email.com", "52998224725"))
    .await
    .unwrap();

  assert!(!s.delete_record(Role::Medic, p.person.id).await.unwrap());
  assert!(s.get_record(Role::Patient, p.person.id).await.unwrap().is_some());
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn file_store_survives_reopen() {
  let dir = std::env::temp_dir().join(format!("medcare-store-{}", std::process::id()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("registry.db");
  let _ = std::fs::remove_file(&path);

  let id = {
    let s = SqliteStore::open(&path).await.unwrap();
    s.insert_record(patient("maria@email.com", "52998224725"))
      .await
      .unwrap()
      .person
      .id
  };

  let s = SqliteStore::open(&path).await.unwrap();
  assert!(s.get_record(Role::Patient, id).await.unwrap().is_some());

  let _ = std::fs::remove_dir_all(&dir);
}
