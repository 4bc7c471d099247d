//! SQL schema for the MedCare SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Owned 1:1 by a person; deleted together with it.
CREATE TABLE IF NOT EXISTS addresses (
    address_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    street       TEXT    NOT NULL,
    number       INTEGER NOT NULL,
    neighborhood TEXT    NOT NULL,
    complement   TEXT,
    city         TEXT    NOT NULL,
    state        TEXT    NOT NULL,
    zip_code     TEXT    NOT NULL,
    habitation   TEXT    NOT NULL   -- 'APARTMENT' | 'HOUSE' | 'KITNET'
);

CREATE TABLE IF NOT EXISTS persons (
    person_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    role       TEXT    NOT NULL,    -- 'PATIENT' | 'MEDIC' | 'ASSISTANT'
    name       TEXT    NOT NULL,
    birth_date TEXT    NOT NULL,    -- ISO 8601 date
    cpf        TEXT    NOT NULL,    -- 11 digits, no formatting
    gender     TEXT    NOT NULL,
    email      TEXT    NOT NULL,
    phone      TEXT    NOT NULL,
    address_id INTEGER NOT NULL UNIQUE REFERENCES addresses(address_id)
);

CREATE TABLE IF NOT EXISTS patients (
    person_id   INTEGER PRIMARY KEY REFERENCES persons(person_id) ON DELETE CASCADE,
    health_plan TEXT,
    description TEXT,
    symptoms    TEXT NOT NULL DEFAULT '[]',   -- JSON array of strings
    allergies   TEXT NOT NULL DEFAULT '[]',   -- JSON array of strings
    situation   TEXT NOT NULL DEFAULT 'NOT_DEFINED'
);

CREATE TABLE IF NOT EXISTS medics (
    person_id         INTEGER PRIMARY KEY REFERENCES persons(person_id) ON DELETE CASCADE,
    crm               TEXT NOT NULL,
    medical_specialty TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS assistants (
    person_id           INTEGER PRIMARY KEY REFERENCES persons(person_id) ON DELETE CASCADE,
    registration_number TEXT    NOT NULL,
    active              INTEGER NOT NULL DEFAULT 1
);

-- The real uniqueness guarantees; service-level checks only fail fast.
CREATE UNIQUE INDEX IF NOT EXISTS persons_email_idx ON persons(email);
CREATE UNIQUE INDEX IF NOT EXISTS persons_cpf_idx   ON persons(cpf);
CREATE UNIQUE INDEX IF NOT EXISTS medics_crm_idx    ON medics(crm);
CREATE INDEX        IF NOT EXISTS persons_role_idx  ON persons(role);

PRAGMA user_version = 1;
";
