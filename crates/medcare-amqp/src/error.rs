//! Error type for `medcare-amqp`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot connect to broker: {0}")]
  Connect(#[source] lapin::Error),

  #[error("cannot declare queue {queue}: {source}")]
  Declare {
    queue:  String,
    #[source]
    source: lapin::Error,
  },

  #[error("cannot publish to {queue}: {source}")]
  Publish {
    queue:  String,
    #[source]
    source: lapin::Error,
  },

  #[error("cannot encode event: {0}")]
  Encode(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
