//! Server-side sessions: the admin flag and flashed messages.
//!
//! A random id travels in an `HttpOnly` cookie; everything else stays in
//! process memory. A session is only created when something is written to
//! it, so anonymous page views leave no state behind. Sessions idle for
//! longer than the configured TTL are dropped, which also ends an admin
//! login.

use std::{
  collections::HashMap,
  sync::Arc,
  time::{Duration, Instant},
};

use axum::{
  extract::{FromRequestParts, Request, State},
  http::{HeaderMap, HeaderValue, header, request::Parts},
  middleware::Next,
  response::Response,
};
use rand_core::{OsRng, RngCore};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::Error;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "instruktorji_session";

/// Upper bound on the time between two sweeps of idle sessions.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

// ─── Flash messages ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
  Ok,
  Error,
}

/// A one-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
  pub kind:    FlashKind,
  pub message: String,
}

impl Flash {
  pub fn ok(message: impl Into<String>) -> Self {
    Self { kind: FlashKind::Ok, message: message.into() }
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self { kind: FlashKind::Error, message: message.into() }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

struct SessionData {
  admin:     bool,
  flashes:   Vec<Flash>,
  last_seen: Instant,
}

impl SessionData {
  fn new() -> Self {
    Self { admin: false, flashes: Vec::new(), last_seen: Instant::now() }
  }
}

struct Table {
  sessions:   HashMap<String, SessionData>,
  last_sweep: Instant,
}

/// In-memory session table shared by all requests.
#[derive(Clone)]
pub struct SessionStore {
  inner:       Arc<Mutex<Table>>,
  ttl:         Duration,
  sweep_every: Duration,
}

impl SessionStore {
  pub fn new(ttl: Duration) -> Self {
    let table = Table { sessions: HashMap::new(), last_sweep: Instant::now() };
    Self {
      inner: Arc::new(Mutex::new(table)),
      ttl,
      sweep_every: ttl.min(SWEEP_INTERVAL),
    }
  }

  /// The presented id if it names a live session. Unknown and expired ids
  /// yield `None`; nothing is created.
  async fn lookup(&self, presented: Option<&str>) -> Option<String> {
    let mut table = self.inner.lock().await;
    self.sweep_if_due(&mut table);

    let id = presented?;
    let live = table.sessions.get(id)?.last_seen.elapsed() <= self.ttl;
    if !live {
      table.sessions.remove(id);
      return None;
    }
    if let Some(data) = table.sessions.get_mut(id) {
      data.last_seen = Instant::now();
    }
    Some(id.to_owned())
  }

  fn sweep_if_due(&self, table: &mut Table) {
    if table.last_sweep.elapsed() < self.sweep_every {
      return;
    }
    let ttl = self.ttl;
    table.sessions.retain(|_, s| s.last_seen.elapsed() <= ttl);
    table.last_sweep = Instant::now();
  }

  /// Insert `data` under a fresh random id.
  async fn create(&self, data: SessionData) -> String {
    let id = new_session_id();
    self.inner.lock().await.sessions.insert(id.clone(), data);
    id
  }

  async fn update<R>(
    &self,
    id: &str,
    f: impl FnOnce(&mut SessionData) -> R,
  ) -> Option<R> {
    self.inner.lock().await.sessions.get_mut(id).map(f)
  }

  async fn remove(&self, id: &str) {
    self.inner.lock().await.sessions.remove(id);
  }

  #[cfg(test)]
  pub(crate) async fn len(&self) -> usize {
    self.inner.lock().await.sessions.len()
  }
}

fn new_session_id() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

// ─── Per-request handle ──────────────────────────────────────────────────────

#[derive(Default)]
struct Handle {
  id:     Option<String>,
  /// Set when this request created or replaced the session id.
  issued: bool,
}

/// The current request's session. Inserted by [`track`]; extract it in
/// handlers.
#[derive(Clone)]
pub struct Session {
  store:  SessionStore,
  handle: Arc<Mutex<Handle>>,
}

impl Session {
  fn new(store: SessionStore, id: Option<String>) -> Self {
    let handle = Handle { id, issued: false };
    Self { store, handle: Arc::new(Mutex::new(handle)) }
  }

  pub async fn is_admin(&self) -> bool {
    let handle = self.handle.lock().await;
    match handle.id.as_deref() {
      Some(id) => self.store.update(id, |s| s.admin).await.unwrap_or(false),
      None => false,
    }
  }

  pub async fn flash(&self, flash: Flash) {
    let mut handle = self.handle.lock().await;
    if let Some(id) = handle.id.as_deref()
      && self.store.update(id, |s| s.flashes.push(flash.clone())).await.is_some()
    {
      return;
    }
    let mut data = SessionData::new();
    data.flashes.push(flash);
    self.replace(&mut handle, data).await;
  }

  /// Pending flashes, removed from the session.
  pub async fn take_flashes(&self) -> Vec<Flash> {
    let handle = self.handle.lock().await;
    match handle.id.as_deref() {
      Some(id) => self
        .store
        .update(id, |s| std::mem::take(&mut s.flashes))
        .await
        .unwrap_or_default(),
      None => Vec::new(),
    }
  }

  /// Mark the session as logged in. The old id is discarded and a new one
  /// issued.
  pub async fn promote_to_admin(&self) {
    let mut handle = self.handle.lock().await;
    if let Some(old) = handle.id.take() {
      self.store.remove(&old).await;
    }
    let mut data = SessionData::new();
    data.admin = true;
    self.replace(&mut handle, data).await;
  }

  /// Forget everything stored in the session.
  pub async fn clear(&self) {
    let mut handle = self.handle.lock().await;
    if let Some(id) = handle.id.take() {
      self.store.remove(&id).await;
    }
    handle.issued = false;
  }

  async fn replace(&self, handle: &mut Handle, data: SessionData) {
    handle.id = Some(self.store.create(data).await);
    handle.issued = true;
  }

  /// The id to send back in `Set-Cookie`, if this request issued one.
  async fn issued_id(&self) -> Option<String> {
    let handle = self.handle.lock().await;
    if handle.issued { handle.id.clone() } else { None }
  }
}

impl<S: Send + Sync> FromRequestParts<S> for Session {
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    parts.extensions.get::<Session>().cloned().ok_or(Error::SessionMissing)
  }
}

// ─── Middleware ──────────────────────────────────────────────────────────────

/// Attach a [`Session`] to every request and set the cookie when the
/// handler issued a new session id.
pub async fn track(
  State(store): State<SessionStore>,
  mut req: Request,
  next: Next,
) -> Response {
  let presented = cookie_value(req.headers(), SESSION_COOKIE);
  let id = store.lookup(presented.as_deref()).await;

  let session = Session::new(store, id);
  req.extensions_mut().insert(session.clone());

  let mut resp = next.run(req).await;

  if let Some(id) = session.issued_id().await {
    let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
    match HeaderValue::from_str(&cookie) {
      Ok(v) => {
        resp.headers_mut().append(header::SET_COOKIE, v);
      }
      Err(e) => tracing::error!("invalid session cookie: {e}"),
    }
  }
  resp
}

/// Value of cookie `name` from the `Cookie` headers, if present.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(k, _)| *k == name)
    .map(|(_, v)| v.to_owned())
}
