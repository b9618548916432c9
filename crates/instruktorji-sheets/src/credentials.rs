//! Service-account credential discovery.
//!
//! Sources are consulted in a fixed order: the platform secret file, a local
//! development file, then an environment variable holding the JSON blob. The
//! first source present wins, even if its content turns out to be invalid.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String { DEFAULT_TOKEN_URI.to_owned() }

/// The subset of a Google service-account key file the mirror needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
  pub client_email:   String,
  /// PEM-encoded RSA private key.
  pub private_key:    String,
  #[serde(default)]
  pub private_key_id: Option<String>,
  #[serde(default = "default_token_uri")]
  pub token_uri:      String,
}

impl std::fmt::Debug for ServiceAccountKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ServiceAccountKey")
      .field("client_email", &self.client_email)
      .field("token_uri", &self.token_uri)
      .finish_non_exhaustive()
  }
}

/// Where a key was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
  SecretFile(PathBuf),
  LocalFile(PathBuf),
  Environment(String),
}

impl std::fmt::Display for CredentialSource {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::SecretFile(p) => write!(f, "secret file {}", p.display()),
      Self::LocalFile(p) => write!(f, "local file {}", p.display()),
      Self::Environment(var) => write!(f, "environment variable {var}"),
    }
  }
}

/// The three places a key may live, in priority order.
#[derive(Debug, Clone)]
pub struct CredentialSources {
  pub secret_path: PathBuf,
  pub local_path:  PathBuf,
  pub env_var:     String,
}

impl CredentialSources {
  /// Load the first available key, reading the process environment.
  pub async fn load(&self) -> Result<(ServiceAccountKey, CredentialSource)> {
    self.load_with(|name| std::env::var(name).ok()).await
  }

  /// Load the first available key, looking environment variables up via
  /// `env`.
  pub async fn load_with(
    &self,
    env: impl Fn(&str) -> Option<String>,
  ) -> Result<(ServiceAccountKey, CredentialSource)> {
    if is_file(&self.secret_path).await {
      let key = read_key_file(&self.secret_path).await?;
      return Ok((key, CredentialSource::SecretFile(self.secret_path.clone())));
    }
    if is_file(&self.local_path).await {
      let key = read_key_file(&self.local_path).await?;
      return Ok((key, CredentialSource::LocalFile(self.local_path.clone())));
    }
    if let Some(blob) = env(&self.env_var).filter(|b| !b.trim().is_empty()) {
      let key = serde_json::from_str(&blob)?;
      return Ok((key, CredentialSource::Environment(self.env_var.clone())));
    }

    Err(Error::NoCredentials {
      secret: self.secret_path.clone(),
      local:  self.local_path.clone(),
      env:    self.env_var.clone(),
    })
  }
}

async fn is_file(path: &Path) -> bool {
  tokio::fs::metadata(path)
    .await
    .map(|m| m.is_file())
    .unwrap_or(false)
}

async fn read_key_file(path: &Path) -> Result<ServiceAccountKey> {
  let raw = tokio::fs::read_to_string(path)
    .await
    .map_err(|source| Error::ReadCredentials { path: path.to_path_buf(), source })?;
  Ok(serde_json::from_str(&raw)?)
}
