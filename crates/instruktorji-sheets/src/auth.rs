//! OAuth2 access tokens for a service account (JWT bearer grant).
//!
//! A signed RS256 assertion is exchanged at the key's `token_uri` for a
//! short-lived bearer token. Tokens are cached and refreshed shortly before
//! they expire.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{Result, credentials::ServiceAccountKey};

/// OAuth scope granting read/write access to spreadsheets.
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each assertion; Google caps it at one hour.
const ASSERTION_LIFETIME_SECS: i64 = 3_600;

/// Tokens this close to expiry are refreshed before use.
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssertionClaims {
  pub iss:   String,
  pub scope: String,
  pub aud:   String,
  pub iat:   i64,
  pub exp:   i64,
}

impl AssertionClaims {
  pub fn new(key: &ServiceAccountKey, now: DateTime<Utc>) -> Self {
    Self {
      iss:   key.client_email.clone(),
      scope: SHEETS_SCOPE.to_owned(),
      aud:   key.token_uri.clone(),
      iat:   now.timestamp(),
      exp:   now.timestamp() + ASSERTION_LIFETIME_SECS,
    }
  }
}

#[derive(Deserialize)]
struct TokenResponse {
  access_token: String,
  expires_in:   i64,
}

struct CachedToken {
  value:      String,
  expires_at: DateTime<Utc>,
}

/// Hands out bearer tokens for one service account.
pub struct TokenSource {
  http:    reqwest::Client,
  key:     ServiceAccountKey,
  signing: EncodingKey,
  cached:  Mutex<Option<CachedToken>>,
}

impl TokenSource {
  /// Fails if the key's private key is not a valid RSA PEM.
  pub fn new(http: reqwest::Client, key: ServiceAccountKey) -> Result<Self> {
    let signing = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    Ok(Self { http, key, signing, cached: Mutex::new(None) })
  }

  /// A bearer token valid for at least another minute.
  pub async fn bearer(&self) -> Result<String> {
    let mut cached = self.cached.lock().await;
    let now = Utc::now();

    if let Some(token) = cached.as_ref()
      && token.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now
    {
      return Ok(token.value.clone());
    }

    let fresh = self.fetch(now).await?;
    let value = fresh.value.clone();
    *cached = Some(fresh);
    Ok(value)
  }

  async fn fetch(&self, now: DateTime<Utc>) -> Result<CachedToken> {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = self.key.private_key_id.clone();
    let assertion = jsonwebtoken::encode(
      &header,
      &AssertionClaims::new(&self.key, now),
      &self.signing,
    )?;

    let resp: TokenResponse = self
      .http
      .post(&self.key.token_uri)
      .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;

    tracing::debug!(expires_in = resp.expires_in, "fetched sheets access token");

    Ok(CachedToken {
      value:      resp.access_token,
      expires_at: now + Duration::seconds(resp.expires_in),
    })
  }
}
