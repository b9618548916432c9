//! HTTP layer for the tutor registration service.
//!
//! Exposes an axum [`Router`] serving the public registration form and the
//! password-gated admin panel, backed by any [`SubmissionStore`] and
//! [`SubmissionMirror`].

pub mod auth;
pub mod error;
pub mod handlers;
pub mod intake;
pub mod session;
pub mod templates;

#[cfg(test)]
mod tests;

pub use error::Error;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router, middleware,
  routing::{get, post},
};
use instruktorji_core::{
  catalog::SubjectCatalog, mirror::SubmissionMirror, store::SubmissionStore,
};
use instruktorji_sheets::MirrorConfig;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AdminAuth;
use handlers::{admin, export, form};
use session::SessionStore;
use templates::Templates;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// `INSTRUKTORJI__*` environment.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  #[serde(default = "default_store_path")]
  pub store_path:          PathBuf,
  /// argon2 PHC string; generate with `instruktorji --hash-password`.
  pub admin_password_hash: String,
  #[serde(default = "default_session_ttl")]
  pub session_ttl_minutes: u64,
  #[serde(default)]
  pub subjects:            SubjectCatalog,
  #[serde(default)]
  pub mirror:              MirrorConfig,
}

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 5000 }

fn default_store_path() -> PathBuf { PathBuf::from("/tmp/instruktorji.db") }

fn default_session_ttl() -> u64 { 720 }

impl ServerConfig {
  pub fn session_ttl(&self) -> Duration {
    Duration::from_secs(self.session_ttl_minutes.saturating_mul(60))
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, M> {
  pub store:     Arc<S>,
  pub mirror:    Arc<M>,
  pub catalog:   Arc<SubjectCatalog>,
  pub auth:      Arc<AdminAuth>,
  pub sessions:  SessionStore,
  pub templates: Arc<Templates>,
}

// Manual impl: `S` and `M` themselves need not be `Clone`.
impl<S, M> Clone for AppState<S, M> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      mirror:    Arc::clone(&self.mirror),
      catalog:   Arc::clone(&self.catalog),
      auth:      Arc::clone(&self.auth),
      sessions:  self.sessions.clone(),
      templates: Arc::clone(&self.templates),
    }
  }
}

impl<S, M> AppState<S, M> {
  pub fn new(
    store: S,
    mirror: M,
    catalog: SubjectCatalog,
    auth: AdminAuth,
    session_ttl: Duration,
  ) -> Result<Self, Error> {
    Ok(Self {
      store:     Arc::new(store),
      mirror:    Arc::new(mirror),
      catalog:   Arc::new(catalog),
      auth:      Arc::new(auth),
      sessions:  SessionStore::new(session_ttl),
      templates: Arc::new(Templates::new()?),
    })
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the registration site.
pub fn router<S, M>(state: AppState<S, M>) -> Router
where
  S: SubmissionStore + 'static,
  M: SubmissionMirror + 'static,
{
  let sessions = state.sessions.clone();

  Router::new()
    .route("/",                   get(form::index::<S, M>))
    .route("/oddaj",              post(form::submit::<S, M>))
    .route("/admin",              get(admin::login_page::<S, M>).post(admin::login::<S, M>))
    .route("/admin/panel",        get(admin::panel::<S, M>))
    .route("/admin/delete/{id}",  post(admin::delete::<S, M>))
    .route("/admin/logout",       get(admin::logout))
    .route("/export",             get(export::handler::<S, M>))
    .layer(middleware::from_fn_with_state(sessions, session::track))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
