//! medcare-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, connects to the broker if one is configured, and serves the REST
//! API over HTTP.

mod config;
mod publisher;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use medcare_api::{AccessPolicy, AppState, JwtVerifier};
use medcare_registry::Registry;
use medcare_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{config::ServerConfig, publisher::Publisher};

#[derive(Parser)]
#[command(author, version, about = "MedCare registry server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;

  if !server_cfg.validate_cpf_checksum {
    tracing::warn!("CPF checksum validation is disabled");
  }

  let policy = AccessPolicy::with_overrides(&server_cfg.policy)
    .context("invalid [policy] table")?;
  let verifier = JwtVerifier::from_base64_secret(&server_cfg.jwt_secret)
    .context("jwt_secret must be valid base64")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent() {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let publisher = Publisher::connect(server_cfg.broker.as_ref())
    .await
    .context("failed to connect to broker")?;

  let state = AppState {
    registry: Arc::new(Registry::new(store, publisher, server_cfg.registry_config())),
    policy:   Arc::new(policy),
    auth:     Arc::new(verifier),
  };

  let app = medcare_api::router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
