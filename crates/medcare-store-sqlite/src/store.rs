//! [`SqliteStore`], the SQLite implementation of [`RegistryStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use medcare_core::{
  PersonId,
  entity::{NewRecord, Record, Role},
  person::{Address, Person},
  store::RegistryStore,
};

use crate::{
  Result,
  encode::{
    ADDRESS_COLUMNS, AddressParams, PERSON_COLUMNS, PersonParams, RawAddress,
    RawDetails, RawPerson, RawRecord, role_columns, role_table,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A MedCare registry backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run an `EXISTS` probe taking a value and an optional excluded id.
  async fn exists(
    &self,
    sql: &'static str,
    value: &str,
    exclude: Option<PersonId>,
  ) -> Result<bool> {
    let value = value.to_owned();
    let taken: bool = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(sql, rusqlite::params![value, exclude], |r| r.get(0))?)
      })
      .await?;
    Ok(taken)
  }
}

fn record_query(role: Role, filter: &str) -> String {
  format!(
    "SELECT {PERSON_COLUMNS}, {details}
       FROM persons p
       JOIN addresses a ON a.address_id = p.address_id
       JOIN {table} r ON r.person_id = p.person_id
      WHERE p.role = ?1 {filter}
      ORDER BY p.person_id",
    details = role_columns(role),
    table = role_table(role),
  )
}

fn person_query(filter: &str) -> String {
  format!(
    "SELECT {PERSON_COLUMNS}
       FROM persons p
       JOIN addresses a ON a.address_id = p.address_id
       {filter}
      ORDER BY p.person_id"
  )
}

// ─── RegistryStore impl ──────────────────────────────────────────────────────

impl RegistryStore for SqliteStore {
  type Error = crate::Error;

  // ── Uniqueness probes ─────────────────────────────────────────────────────

  async fn email_taken<'a>(
    &'a self,
    email: &'a str,
    exclude: Option<PersonId>,
  ) -> Result<bool> {
    self
      .exists(
        "SELECT EXISTS(SELECT 1 FROM persons
                        WHERE email = ?1 AND (?2 IS NULL OR person_id != ?2))",
        email,
        exclude,
      )
      .await
  }

  async fn cpf_taken<'a>(
    &'a self,
    cpf: &'a str,
    exclude: Option<PersonId>,
  ) -> Result<bool> {
    self
      .exists(
        "SELECT EXISTS(SELECT 1 FROM persons
                        WHERE cpf = ?1 AND (?2 IS NULL OR person_id != ?2))",
        cpf,
        exclude,
      )
      .await
  }

  async fn crm_taken<'a>(
    &'a self,
    crm: &'a str,
    exclude: Option<PersonId>,
  ) -> Result<bool> {
    self
      .exists(
        "SELECT EXISTS(SELECT 1 FROM medics
                        WHERE crm = ?1 AND (?2 IS NULL OR person_id != ?2))",
        crm,
        exclude,
      )
      .await
  }

  // ── Persons ───────────────────────────────────────────────────────────────

  async fn get_person(&self, id: PersonId) -> Result<Option<Person>> {
    let sql = person_query("WHERE p.person_id = ?1");
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id], RawPerson::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn list_persons(&self) -> Result<Vec<Person>> {
    let sql = person_query("");
    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  // ── Role records ──────────────────────────────────────────────────────────

  async fn insert_record(&self, record: NewRecord) -> Result<Record> {
    let role      = record.details.role();
    let role_str  = role.to_string();
    let address   = AddressParams::from(&record.person.address);
    let person    = PersonParams::from(&record.person.data);
    let details   = RawDetails::encode(&record.details)?;

    let (person_id, address_id): (i64, i64) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        tx.execute(
          "INSERT INTO addresses
             (street, number, neighborhood, complement, city, state, zip_code, habitation)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            address.street,
            address.number,
            address.neighborhood,
            address.complement,
            address.city,
            address.state,
            address.zip_code,
            address.habitation,
          ],
        )?;
        let address_id = tx.last_insert_rowid();

        tx.execute(
          "INSERT INTO persons
             (role, name, birth_date, cpf, gender, email, phone, address_id)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            role_str,
            person.name,
            person.birth_date,
            person.cpf,
            person.gender,
            person.email,
            person.phone,
            address_id,
          ],
        )?;
        let person_id = tx.last_insert_rowid();

        details.insert(&tx, person_id)?;
        tx.commit()?;
        Ok((person_id, address_id))
      })
      .await?;

    tracing::debug!(%role, person_id, "inserted record");

    let NewRecord { person, details } = record;
    Ok(Record {
      person: Person {
        id:      person_id,
        data:    person.data,
        address: Address { id: address_id, data: person.address },
      },
      details,
    })
  }

  async fn get_record(&self, role: Role, id: PersonId) -> Result<Option<Record>> {
    let sql      = record_query(role, "AND p.person_id = ?2");
    let role_str = role.to_string();

    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![role_str, id], |row| {
              RawRecord::from_row(role, row)
            })
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRecord::into_record).transpose()
  }

  async fn list_records(&self, role: Role) -> Result<Vec<Record>> {
    let sql      = record_query(role, "");
    let role_str = role.to_string();

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![role_str], |row| RawRecord::from_row(role, row))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn update_record(&self, record: Record) -> Result<Option<Record>> {
    let id       = record.person.id;
    let role_str = record.details.role().to_string();
    let address  = AddressParams::from(&record.person.address.data);
    let person   = PersonParams::from(&record.person.data);
    let details  = RawDetails::encode(&record.details)?;

    let updated: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let address_id: Option<i64> = tx
          .query_row(
            "SELECT address_id FROM persons WHERE person_id = ?1 AND role = ?2",
            rusqlite::params![id, role_str],
            |r| r.get(0),
          )
          .optional()?;
        let Some(address_id) = address_id else {
          return Ok(false);
        };

        tx.execute(
          "UPDATE persons
              SET name = ?2, birth_date = ?3, cpf = ?4, gender = ?5,
                  email = ?6, phone = ?7
            WHERE person_id = ?1",
          rusqlite::params![
            id,
            person.name,
            person.birth_date,
            person.cpf,
            person.gender,
            person.email,
            person.phone,
          ],
        )?;

        tx.execute(
          "UPDATE addresses
              SET street = ?2, number = ?3, neighborhood = ?4, complement = ?5,
                  city = ?6, state = ?7, zip_code = ?8, habitation = ?9
            WHERE address_id = ?1",
          rusqlite::params![
            address_id,
            address.street,
            address.number,
            address.neighborhood,
            address.complement,
            address.city,
            address.state,
            address.zip_code,
            address.habitation,
          ],
        )?;

        details.update(&tx, id)?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !updated {
      return Ok(None);
    }

    // The address id is owned by the row, never by the caller.
    self.get_record(record.details.role(), id).await
  }

  async fn delete_record(&self, role: Role, id: PersonId) -> Result<bool> {
    let role_str = role.to_string();

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let address_id: Option<i64> = tx
          .query_row(
            "SELECT address_id FROM persons WHERE person_id = ?1 AND role = ?2",
            rusqlite::params![id, role_str],
            |r| r.get(0),
          )
          .optional()?;
        let Some(address_id) = address_id else {
          return Ok(false);
        };

        // The role row goes with the person via ON DELETE CASCADE.
        tx.execute("DELETE FROM persons WHERE person_id = ?1", rusqlite::params![id])?;
        tx.execute(
          "DELETE FROM addresses WHERE address_id = ?1",
          rusqlite::params![address_id],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if deleted {
      tracing::debug!(%role, id, "deleted record");
    }
    Ok(deleted)
  }

  // ── Addresses ─────────────────────────────────────────────────────────────

  async fn get_address(&self, id: i64) -> Result<Option<Address>> {
    let raw: Option<RawAddress> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ADDRESS_COLUMNS} FROM addresses WHERE address_id = ?1"),
              rusqlite::params![id],
              |row| RawAddress::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAddress::into_address).transpose()
  }

  async fn list_addresses(&self) -> Result<Vec<Address>> {
    let raws: Vec<RawAddress> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {ADDRESS_COLUMNS} FROM addresses ORDER BY address_id"))?;
        let rows = stmt
          .query_map([], |row| RawAddress::from_row(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAddress::into_address).collect()
  }

  async fn update_address(&self, address: Address) -> Result<Option<Address>> {
    let id     = address.id;
    let params = AddressParams::from(&address.data);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE addresses
              SET street = ?2, number = ?3, neighborhood = ?4, complement = ?5,
                  city = ?6, state = ?7, zip_code = ?8, habitation = ?9
            WHERE address_id = ?1",
          rusqlite::params![
            id,
            params.street,
            params.number,
            params.neighborhood,
            params.complement,
            params.city,
            params.state,
            params.zip_code,
            params.habitation,
          ],
        )?)
      })
      .await?;

    Ok((changed > 0).then_some(address))
  }
}
