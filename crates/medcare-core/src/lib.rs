//! Core types and trait definitions for the MedCare registry.
//!
//! This crate is deliberately free of HTTP, database, and broker
//! dependencies. Storage backends implement [`store::RegistryStore`], broker
//! adapters implement [`event::EventPublisher`], and the service layer is
//! written against those two traits only.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod cpf;
pub mod entity;
pub mod error;
pub mod event;
pub mod person;
pub mod registration;
pub mod store;

pub use error::{Error, Result};

/// Surrogate identifier shared by a person and its role row.
pub type PersonId = i64;
