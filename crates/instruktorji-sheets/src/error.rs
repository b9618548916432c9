//! Error type for `instruktorji-sheets`.
//!
//! None of these errors leave the crate through the mirror trait; they are
//! logged and folded into a mirror outcome.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(
    "no service account found (checked {secret}, {local} and ${env})",
    secret = .secret.display(),
    local = .local.display()
  )]
  NoCredentials {
    secret: PathBuf,
    local:  PathBuf,
    env:    String,
  },

  #[error("failed to read credentials from {path}: {source}")]
  ReadCredentials {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("malformed service account JSON: {0}")]
  Json(#[from] serde_json::Error),

  #[error("failed to sign token request: {0}")]
  Jwt(#[from] jsonwebtoken::errors::Error),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("invalid API url: {0}")]
  InvalidUrl(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
