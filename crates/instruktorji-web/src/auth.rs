//! Admin password check and the `Admin` extractor guarding the panel.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::request::Parts,
  response::{IntoResponse, Redirect, Response},
};
use rand_core::OsRng;

use crate::session::Session;

/// Where anonymous visitors are sent.
pub const LOGIN_PATH: &str = "/admin";

/// The configured admin secret.
#[derive(Clone)]
pub struct AdminAuth {
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

impl AdminAuth {
  pub fn new(password_hash: impl Into<String>) -> Self {
    Self { password_hash: password_hash.into() }
  }

  /// Whether `password` matches the configured hash. An unparsable hash
  /// rejects every password.
  pub fn verify(&self, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(&self.password_hash) else {
      tracing::error!("admin_password_hash is not a valid PHC string");
      return false;
    };
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .is_ok()
  }
}

/// Hash `password` with a fresh salt, for `admin_password_hash`.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

/// Present in a handler means the session is logged in as admin.
/// Anonymous requests are redirected to the login page.
pub struct Admin;

impl<S: Send + Sync> FromRequestParts<S> for Admin {
  type Rejection = Response;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &S,
  ) -> Result<Self, Self::Rejection> {
    let session = Session::from_request_parts(parts, state)
      .await
      .map_err(IntoResponse::into_response)?;

    if session.is_admin().await {
      Ok(Admin)
    } else {
      Err(Redirect::to(LOGIN_PATH).into_response())
    }
  }
}
