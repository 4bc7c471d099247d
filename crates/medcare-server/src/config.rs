//! Server configuration, read from `config.toml` and `MEDCARE_*` variables.

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use medcare_amqp::Destinations;
use medcare_registry::RegistryConfig;
use serde::Deserialize;

/// Runtime server configuration.
///
/// Environment variables override the file, with `__` separating nested
/// keys: `MEDCARE_PORT=9000`, `MEDCARE_BROKER__URL=amqp://…`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                  String,
  #[serde(default = "default_port")]
  pub port:                  u16,
  #[serde(default = "default_store_path")]
  pub store_path:            PathBuf,
  /// Base64-encoded HS256 secret shared with the identity service.
  pub jwt_secret:            String,
  #[serde(default = "default_true")]
  pub validate_cpf_checksum: bool,
  #[serde(default = "default_store_timeout_ms")]
  pub store_timeout_ms:      u64,
  #[serde(default = "default_publish_timeout_ms")]
  pub publish_timeout_ms:    u64,
  /// Without a broker, events are only kept in memory.
  #[serde(default)]
  pub broker:                Option<BrokerConfig>,
  /// Operation name → allowed roles; see `medcare_api::policy`.
  #[serde(default)]
  pub policy:                HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
  pub url:    String,
  #[serde(flatten)]
  pub queues: Destinations,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/medcare/registry.db") }
fn default_true() -> bool { true }
fn default_store_timeout_ms() -> u64 { 5_000 }
fn default_publish_timeout_ms() -> u64 { 2_000 }

impl ServerConfig {
  /// Layer the optional TOML file at `path` under the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    ::config::Config::builder()
      .add_source(::config::File::from(path).required(false))
      .add_source(
        ::config::Environment::with_prefix("MEDCARE")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn registry_config(&self) -> RegistryConfig {
    RegistryConfig {
      validate_cpf_checksum: self.validate_cpf_checksum,
      store_timeout:         Duration::from_millis(self.store_timeout_ms),
      publish_timeout:       Duration::from_millis(self.publish_timeout_ms),
    }
  }
}
