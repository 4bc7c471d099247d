//! Role-based access policy.
//!
//! Every endpoint is one [`Operation`]. The policy maps each operation to an
//! [`Access`] rule; deployments may override any entry by operation name:
//!
//! ```toml
//! [policy]
//! patient_list = ["ADMIN", "ASSISTANT", "MEDIC"]
//! medic_get    = ["PUBLIC"]
//! ```

use std::{
  collections::{BTreeSet, HashMap},
  str::FromStr,
};

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;

use crate::{auth::Caller, error::ApiError};

/// Pseudo-role: no token needed.
pub const PUBLIC: &str = "PUBLIC";
/// Pseudo-role: any valid token.
pub const AUTHENTICATED: &str = "AUTHENTICATED";

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
  PatientCreate,
  PatientList,
  PatientGet,
  PatientUpdate,
  PatientAdvanceSituation,
  PatientDelete,
  MedicCreate,
  MedicList,
  MedicGet,
  MedicUpdate,
  MedicDelete,
  AssistantCreate,
  AssistantList,
  AssistantGet,
  AssistantUpdate,
  AssistantDelete,
  PersonList,
  PersonGet,
  PersonContact,
  AddressList,
  AddressGet,
  AddressUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
  Public,
  Authenticated,
  Roles(BTreeSet<String>),
}

impl Access {
  fn roles(names: &[&str]) -> Self {
    Access::Roles(names.iter().map(|r| r.to_string()).collect())
  }

  /// Parse a configured role list. A pseudo-role anywhere in the list wins.
  fn parse(names: &[String]) -> Option<Self> {
    if names.is_empty() {
      return None;
    }
    let upper: BTreeSet<String> = names.iter().map(|n| n.trim().to_ascii_uppercase()).collect();
    Some(if upper.contains(PUBLIC) {
      Access::Public
    } else if upper.contains(AUTHENTICATED) {
      Access::Authenticated
    } else {
      Access::Roles(upper)
    })
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
  #[error("unknown operation in policy: {0:?}")]
  UnknownOperation(String),

  #[error("operation {0} must list at least one role")]
  EmptyRoles(String),
}

/// Operation → access rule table.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
  rules: HashMap<Operation, Access>,
}

impl Default for AccessPolicy {
  fn default() -> Self {
    use Operation::*;

    let rules = Operation::iter()
      .map(|op| {
        let access = match op {
          PatientCreate => Access::Public,
          PatientList => Access::roles(&["ADMIN", "ASSISTANT"]),
          PatientUpdate => Access::roles(&["ADMIN", "ASSISTANT", "PATIENT"]),
          PatientAdvanceSituation => Access::roles(&["MEDIC"]),
          PatientDelete => Access::roles(&["PATIENT", "ADMIN"]),
          MedicCreate | MedicUpdate => Access::roles(&["ADMIN", "MEDIC", "ASSISTANT"]),
          MedicDelete => Access::roles(&["ASSISTANT", "ADMIN"]),
          AssistantCreate | AssistantList | AssistantGet | AssistantUpdate => {
            Access::roles(&["ASSISTANT", "ADMIN"])
          }
          AssistantDelete | PersonList | AddressList => Access::roles(&["ADMIN"]),
          AddressUpdate => Access::roles(&["ADMIN", "ASSISTANT"]),
          PatientGet | MedicList | MedicGet | PersonGet | PersonContact | AddressGet => {
            Access::Authenticated
          }
        };
        (op, access)
      })
      .collect();

    Self { rules }
  }
}

impl AccessPolicy {
  /// Default table with `overrides` (operation name → role names) applied.
  pub fn with_overrides(overrides: &HashMap<String, Vec<String>>) -> Result<Self, PolicyError> {
    let mut policy = Self::default();
    for (name, roles) in overrides {
      let op = Operation::from_str(name)
        .map_err(|_| PolicyError::UnknownOperation(name.clone()))?;
      let access = Access::parse(roles).ok_or_else(|| PolicyError::EmptyRoles(name.clone()))?;
      policy.rules.insert(op, access);
    }
    Ok(policy)
  }

  pub fn access(&self, op: Operation) -> Access {
    // Every operation is seeded by `Default`.
    self.rules.get(&op).cloned().unwrap_or(Access::Authenticated)
  }

  /// Allow or refuse `caller` for `op`: 401 without a token where one is
  /// needed, 403 when the token's role is not listed.
  pub fn authorize(&self, op: Operation, caller: &Caller) -> Result<(), ApiError> {
    match self.access(op) {
      Access::Public => Ok(()),
      Access::Authenticated => caller.principal().map(|_| ()),
      Access::Roles(roles) => {
        let principal = caller.principal()?;
        if roles.contains(&principal.role) {
          Ok(())
        } else {
          tracing::debug!(%op, role = %principal.role, "access denied");
          Err(ApiError::Forbidden(format!("role {} may not {op}", principal.role)))
        }
      }
    }
  }
}
