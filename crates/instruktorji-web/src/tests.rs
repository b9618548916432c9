//! Router tests: a real `SqliteStore` in a temp directory and a recording
//! mirror, driven through `tower::ServiceExt::oneshot`.

use std::{
  sync::{Arc, Mutex},
  time::Duration,
};

use axum::{
  Router,
  body::Body,
  http::{Request, Response, StatusCode, header},
};
use instruktorji_core::{
  catalog::{GradeLevel, Section, SubjectCatalog},
  export::UTF8_BOM,
  mirror::{MirrorOutcome, SubmissionMirror},
  store::SubmissionStore,
  submission::{NewSubmission, SubmissionFields, SubmissionId},
};
use instruktorji_store_sqlite::SqliteStore;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::{
  AppState,
  auth::{AdminAuth, hash_password},
  router,
  session::{SESSION_COOKIE, SessionStore},
};

const PASSWORD: &str = "skrivnost";

// ─── Fixtures ────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct RecordingMirror {
  rows: Arc<Mutex<Vec<Vec<String>>>>,
}

impl RecordingMirror {
  fn rows(&self) -> Vec<Vec<String>> { self.rows.lock().unwrap().clone() }

  /// Wait for the detached mirror task to land `n` rows.
  async fn wait_for(&self, n: usize) -> Vec<Vec<String>> {
    for _ in 0..200 {
      if self.rows.lock().unwrap().len() >= n {
        break;
      }
      tokio::time::sleep(Duration::from_millis(5)).await;
    }
    self.rows()
  }
}

impl SubmissionMirror for RecordingMirror {
  async fn append_row(&self, row: Vec<String>) -> MirrorOutcome {
    self.rows.lock().unwrap().push(row);
    MirrorOutcome::Written
  }
}

struct Harness {
  app:      Router,
  store:    SqliteStore,
  mirror:   RecordingMirror,
  sessions: SessionStore,
  _dir:     TempDir,
}

impl Harness {
  async fn new() -> Self {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("instruktorji.db")).await.unwrap();
    Self::with_store(dir, store)
  }

  fn with_store(dir: TempDir, store: SqliteStore) -> Self {
    let mirror = RecordingMirror::default();
    let state = AppState::new(
      store.clone(),
      mirror.clone(),
      SubjectCatalog::default(),
      AdminAuth::new(hash_password(PASSWORD).unwrap()),
      Duration::from_secs(600),
    )
    .unwrap();
    let sessions = state.sessions.clone();
    Self { app: router(state), store, mirror, sessions, _dir: dir }
  }

  fn client(&self) -> Client<'_> { Client { app: &self.app, cookie: None } }

  async fn seed(&self, first_name: &str, minute: u32) -> SubmissionId {
    self
      .store
      .append(NewSubmission {
        timestamp: format!("2025-09-01 10:{minute:02}"),
        fields:    SubmissionFields {
          first_name:       first_name.into(),
          last_name:        "Novak".into(),
          email:            format!("{}@x.si", first_name.to_lowercase()),
          grade_level:      GradeLevel::Second,
          section:          Section::B,
          subjects_summary: "Matematika (Kovač)".into(),
        },
      })
      .await
      .unwrap()
  }

  /// Insert a row the form could never produce, as an older schema might.
  async fn insert_legacy_row(&self, grade_level: &str, section: &str) {
    let path = self.store.path().to_owned();
    let (grade_level, section) = (grade_level.to_owned(), section.to_owned());
    tokio::task::spawn_blocking(move || {
      let conn = rusqlite::Connection::open(path).unwrap();
      conn
        .execute(
          "INSERT INTO instruktors (datum, ime, priimek, email, razred, oddelek, predmeti)
           VALUES ('2024-05-01 09:00', 'Cene', 'Kos', 'cene@x.si', ?1, ?2, '')",
          rusqlite::params![grade_level, section],
        )
        .unwrap();
    })
    .await
    .unwrap();
  }
}

/// A browser: remembers the session cookie between requests.
struct Client<'a> {
  app:    &'a Router,
  cookie: Option<String>,
}

impl Client<'_> {
  async fn send(&mut self, mut req: Request<Body>) -> Response<Body> {
    if let Some(cookie) = &self.cookie {
      req.headers_mut().insert(header::COOKIE, cookie.parse().unwrap());
    }
    let resp = self.app.clone().oneshot(req).await.unwrap();
    if let Some(set) = resp.headers().get(header::SET_COOKIE) {
      let pair = set.to_str().unwrap().split(';').next().unwrap().to_owned();
      assert!(pair.starts_with(SESSION_COOKIE));
      self.cookie = Some(pair);
    }
    resp
  }

  async fn get(&mut self, uri: &str) -> Response<Body> {
    self.send(Request::get(uri).body(Body::empty()).unwrap()).await
  }

  async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
    let body = fields
      .iter()
      .map(|(k, v)| format!("{}={}", urlencode(k), urlencode(v)))
      .collect::<Vec<_>>()
      .join("&");
    let req = Request::post(uri)
      .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
      .body(Body::from(body))
      .unwrap();
    self.send(req).await
  }

  async fn page(&mut self, uri: &str) -> String {
    let resp = self.get(uri).await;
    assert_eq!(resp.status(), StatusCode::OK);
    body_string(resp).await
  }

  async fn login(&mut self) {
    let resp = self.post_form("/admin", &[("password", PASSWORD)]).await;
    assert_redirect(&resp, "/admin/panel");
  }
}

fn urlencode(s: &str) -> String {
  s.bytes()
    .map(|b| match b {
      b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
        (b as char).to_string()
      }
      _ => format!("%{b:02X}"),
    })
    .collect()
}

async fn body_bytes(resp: Response<Body>) -> Vec<u8> {
  axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn body_string(resp: Response<Body>) -> String {
  String::from_utf8(body_bytes(resp).await).unwrap()
}

fn assert_redirect(resp: &Response<Body>, to: &str) {
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  assert_eq!(resp.headers()[header::LOCATION], to);
}

fn ana(teacher: &str) -> Vec<(&'static str, &str)> {
  vec![
    ("ime", "Ana"),
    ("priimek", "Novak"),
    ("email", "a@x.si"),
    ("razred", "2. letnik"),
    ("oddelek", "b"),
    ("chk_mat", "on"),
    ("teacher_mat", teacher),
  ]
}

// ─── Registration form ───────────────────────────────────────────────────────

#[tokio::test]
async fn form_renders_catalog_without_starting_a_session() {
  let h = Harness::new().await;
  let mut client = h.client();

  let page = client.page("/").await;
  assert!(client.cookie.is_none());
  assert!(page.contains("name=\"chk_mat\""));
  assert!(page.contains("name=\"teacher_fra\""));
  assert!(page.contains("Francoščina"));
}

#[tokio::test]
async fn cookieless_reads_leave_the_session_table_empty() {
  let h = Harness::new().await;

  for _ in 0..50 {
    let mut client = h.client();
    client.page("/").await;
    client.page("/admin").await;
    client.get("/admin/panel").await;
    assert!(client.cookie.is_none());
  }
  assert_eq!(h.sessions.len().await, 0);

  let mut client = h.client();
  client.post_form("/oddaj", &ana("")).await;
  assert!(client.cookie.is_some());
  assert_eq!(h.sessions.len().await, 1);
}

#[tokio::test]
async fn valid_submission_is_stored_mirrored_and_acknowledged() {
  let h = Harness::new().await;
  let mut client = h.client();

  let resp = client.post_form("/oddaj", &ana("Kovač")).await;
  assert_redirect(&resp, "/");

  let stored = h.store.list_all().await.unwrap();
  assert_eq!(stored.len(), 1);
  assert_eq!(stored[0].first_name, "Ana");
  assert_eq!(stored[0].grade_level, "2. letnik");
  assert_eq!(stored[0].section, "b");
  assert_eq!(stored[0].subjects_summary, "Matematika (Kovač)");

  let rows = h.mirror.wait_for(1).await;
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0][0], stored[0].timestamp);
  assert_eq!(rows[0][1..], [
    "Ana",
    "Novak",
    "a@x.si",
    "2. letnik",
    "b",
    "Matematika (Kovač)"
  ]);

  let page = client.page("/").await;
  assert!(page.contains("Hvala! Prijava je shranjena."));
  let page = client.page("/").await;
  assert!(!page.contains("Hvala! Prijava je shranjena."));
}

#[tokio::test]
async fn checked_subject_without_teacher_is_rejected() {
  let h = Harness::new().await;
  let mut client = h.client();

  let resp = client.post_form("/oddaj", &ana("")).await;
  assert_redirect(&resp, "/");

  let page = client.page("/").await;
  assert!(page.contains("Vnesite učitelja pri predmetu Matematika."));
  assert!(h.store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn blank_teacher_rejects_the_whole_submission() {
  let h = Harness::new().await;
  let mut client = h.client();

  let mut form = ana("Kovač");
  form.push(("chk_fiz", "on"));
  form.push(("teacher_fiz", "   "));
  let resp = client.post_form("/oddaj", &form).await;
  assert_redirect(&resp, "/");

  let page = client.page("/").await;
  assert!(page.contains("Vnesite učitelja pri predmetu Fizika."));
  assert!(h.store.list_all().await.unwrap().is_empty());
  tokio::time::sleep(Duration::from_millis(20)).await;
  assert!(h.mirror.rows().is_empty());
}

#[tokio::test]
async fn missing_required_fields_store_nothing() {
  let h = Harness::new().await;
  let mut client = h.client();

  let resp = client
    .post_form("/oddaj", &[("ime", "Ana"), ("priimek", "Novak"), ("email", "  ")])
    .await;
  assert_redirect(&resp, "/");

  let page = client.page("/").await;
  assert!(page.contains(
    "Izpolnite vsa obvezna polja (ime, priimek, e-pošta, razred, oddelek)."
  ));
  assert!(h.store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_grade_level_is_rejected() {
  let h = Harness::new().await;
  let mut client = h.client();

  let mut form = ana("Kovač");
  form[3] = ("razred", "5. letnik");
  client.post_form("/oddaj", &form).await;

  let page = client.page("/").await;
  assert!(page.contains("Neveljavna izbira v polju razred."));
  assert!(h.store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn store_fault_is_a_generic_500_and_skips_the_mirror() {
  let dir = tempfile::tempdir().unwrap();
  let store = SqliteStore::new(dir.path().join("missing").join("instruktorji.db"));
  let h = Harness::with_store(dir, store);
  let mut client = h.client();

  let resp = client.post_form("/oddaj", &ana("Kovač")).await;
  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  let page = body_string(resp).await;
  assert!(page.contains("Prišlo je do napake"));
  assert!(!page.contains("sqlite"));

  tokio::time::sleep(Duration::from_millis(20)).await;
  assert!(h.mirror.rows().is_empty());
}

// ─── Admin gate ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn wrong_password_flashes_and_stays_anonymous() {
  let h = Harness::new().await;
  let mut client = h.client();

  let resp = client.post_form("/admin", &[("password", "napak")]).await;
  assert_redirect(&resp, "/admin");

  let page = client.page("/admin").await;
  assert!(page.contains("Napačno geslo."));
  assert_redirect(&client.get("/admin/panel").await, "/admin");
}

#[tokio::test]
async fn login_opens_the_panel() {
  let h = Harness::new().await;
  h.seed("Ana", 0).await;
  let mut client = h.client();

  client.login().await;
  assert_redirect(&client.get("/admin").await, "/admin/panel");

  let page = client.page("/admin/panel").await;
  assert!(page.contains("ana@x.si"));
  assert!(page.contains("Matematika (Kovač)"));
  assert!(page.contains("/admin/delete/1"));
}

#[tokio::test]
async fn login_issues_a_fresh_session_id() {
  let h = Harness::new().await;
  let mut client = h.client();

  client.post_form("/admin", &[("password", "napak")]).await;
  let before = client.cookie.clone().unwrap();

  client.login().await;
  let after = client.cookie.clone().unwrap();
  assert_ne!(before, after);
  assert!(client.page("/admin/panel").await.contains("Odjava"));

  // The id held before login grants nothing.
  let mut stale = Client { app: &h.app, cookie: Some(before) };
  assert_redirect(&stale.get("/admin/panel").await, "/admin");
  assert_eq!(h.sessions.len().await, 1);
}

#[tokio::test]
async fn anonymous_requests_to_gated_routes_redirect() {
  let h = Harness::new().await;
  let mut client = h.client();

  assert_redirect(&client.get("/admin/panel").await, "/admin");
  assert_redirect(&client.get("/export").await, "/admin");
}

#[tokio::test]
async fn unauthenticated_delete_redirects_and_keeps_the_row() {
  let h = Harness::new().await;
  let id = h.seed("Ana", 0).await;
  let mut client = h.client();

  let resp = client.post_form(&format!("/admin/delete/{id}"), &[]).await;
  assert_redirect(&resp, "/admin");
  assert_eq!(h.store.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn admin_delete_removes_the_row() {
  let h = Harness::new().await;
  let ana = h.seed("Ana", 0).await;
  let bor = h.seed("Bor", 1).await;
  let mut client = h.client();
  client.login().await;

  let resp = client.post_form(&format!("/admin/delete/{ana}"), &[]).await;
  assert_redirect(&resp, "/admin/panel");

  let left = h.store.list_all().await.unwrap();
  assert_eq!(left.len(), 1);
  assert_eq!(left[0].id, bor);

  // Deleting again is a no-op.
  let resp = client.post_form(&format!("/admin/delete/{ana}"), &[]).await;
  assert_redirect(&resp, "/admin/panel");
  assert_eq!(h.store.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn non_numeric_delete_id_is_not_found() {
  let h = Harness::new().await;
  h.seed("Ana", 0).await;
  let mut client = h.client();
  client.login().await;

  let resp = client.post_form("/admin/delete/x", &[]).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  assert_eq!(h.store.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn rows_outside_the_form_choices_still_show_and_export() {
  let h = Harness::new().await;
  h.seed("Ana", 0).await;
  h.insert_legacy_row("5. letnik", "g").await;
  let mut client = h.client();
  client.login().await;

  let page = client.page("/admin/panel").await;
  assert!(page.contains("ana@x.si"));
  assert!(page.contains("cene@x.si"));
  assert!(page.contains("5. letnik"));

  let resp = client.get("/export").await;
  assert_eq!(resp.status(), StatusCode::OK);
  let text = body_string(resp).await;
  assert!(text.contains("2;2024-05-01 09:00;Cene;Kos;cene@x.si;5. letnik;g;"));
  assert!(text.contains("1;2025-09-01 10:00;Ana;Novak;ana@x.si;2. letnik;b;"));

  let resp = client.post_form("/admin/delete/2", &[]).await;
  assert_redirect(&resp, "/admin/panel");
  assert_eq!(h.store.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn logout_ends_the_admin_session() {
  let h = Harness::new().await;
  let mut client = h.client();
  client.login().await;

  assert_redirect(&client.get("/admin/logout").await, "/admin");
  assert_redirect(&client.get("/admin/panel").await, "/admin");
}

// ─── Export ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn export_downloads_every_row_newest_first() {
  let h = Harness::new().await;
  h.seed("Ana", 0).await;
  h.seed("Bor", 1).await;
  let mut client = h.client();
  client.login().await;

  let resp = client.get("/export").await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/csv; charset=utf-8");
  assert_eq!(
    resp.headers()[header::CONTENT_DISPOSITION],
    "attachment; filename=\"instruktorji.csv\""
  );

  let bytes = body_bytes(resp).await;
  assert!(bytes.starts_with(UTF8_BOM));
  let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
  let lines: Vec<&str> = text.split("\r\n").filter(|l| !l.is_empty()).collect();

  assert_eq!(lines, [
    "ID;Datum;Ime;Priimek;E-pošta;Razred;Oddelek;Predmeti (učitelj)",
    "2;2025-09-01 10:01;Bor;Novak;bor@x.si;2. letnik;b;Matematika (Kovač)",
    "1;2025-09-01 10:00;Ana;Novak;ana@x.si;2. letnik;b;Matematika (Kovač)",
  ]);
}
