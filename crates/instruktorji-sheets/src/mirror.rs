//! [`SheetsMirror`]: the Google Sheets implementation of
//! [`SubmissionMirror`].

use std::{path::PathBuf, time::Duration};

use instruktorji_core::mirror::{MIRROR_HEADERS, MirrorOutcome, SubmissionMirror};
use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::{
  Result,
  auth::TokenSource,
  client::{SheetsClient, sheet_range},
  credentials::CredentialSources,
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Mirror settings, deserialised from the `[mirror]` config table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
  /// Key of the target spreadsheet (the id between `/d/` and `/edit`).
  /// When absent the mirror is disabled.
  pub spreadsheet_id:  Option<String>,
  pub worksheet_title: String,
  /// Platform-provided secret file, consulted first.
  pub secret_path:     PathBuf,
  /// Local development key file, consulted second.
  pub local_path:      PathBuf,
  /// Environment variable holding the key JSON, consulted last.
  pub credentials_env: String,
  pub api_base:        String,
  pub timeout_secs:    u64,
}

impl Default for MirrorConfig {
  fn default() -> Self {
    Self {
      spreadsheet_id:  None,
      worksheet_title: "Instruktorji".into(),
      secret_path:     PathBuf::from("/etc/secrets/service_account.json"),
      local_path:      PathBuf::from("service_account.json"),
      credentials_env: "SERVICE_ACCOUNT_JSON".into(),
      api_base:        "https://sheets.googleapis.com/v4".into(),
      timeout_secs:    30,
    }
  }
}

impl MirrorConfig {
  fn credential_sources(&self) -> CredentialSources {
    CredentialSources {
      secret_path: self.secret_path.clone(),
      local_path:  self.local_path.clone(),
      env_var:     self.credentials_env.clone(),
    }
  }
}

// ─── Connection ──────────────────────────────────────────────────────────────

/// An established, verified connection to the target worksheet.
struct Connection {
  client: SheetsClient,
  range:  String,
}

impl Connection {
  /// Make sure the worksheet exists and carries the header row.
  async fn ensure_worksheet(&self, title: &str) -> Result<()> {
    let titles = self.client.sheet_titles().await?;

    if !titles.iter().any(|t| t == title) {
      self.client.add_sheet(title, MIRROR_HEADERS.len()).await?;
      self.client.append_row(&self.range, &header_row()).await?;
      tracing::info!(worksheet = title, "created mirror worksheet");
      return Ok(());
    }

    match self.client.is_empty(&self.range).await {
      Ok(true) => {
        self.client.append_row(&self.range, &header_row()).await?;
        tracing::info!(worksheet = title, "wrote header to empty worksheet");
      }
      Ok(false) => {}
      // Not fatal: rows can still be appended.
      Err(e) => tracing::warn!(worksheet = title, "could not inspect worksheet: {e}"),
    }
    Ok(())
  }
}

fn header_row() -> Vec<String> {
  MIRROR_HEADERS.iter().map(|h| (*h).to_owned()).collect()
}

// ─── Mirror ──────────────────────────────────────────────────────────────────

/// Best-effort Google Sheets mirror.
///
/// The connection is created on the first [`append_row`] and cached for the
/// lifetime of the value. Concurrent first writes wait on a single
/// initialisation; a failed initialisation leaves the cell empty so the
/// next write tries again.
///
/// A failed append re-runs the worksheet check and retries the row once, so
/// a tab removed after connecting is recreated on the next write.
///
/// [`append_row`]: SubmissionMirror::append_row
pub struct SheetsMirror {
  config: MirrorConfig,
  http:   reqwest::Client,
  conn:   OnceCell<Connection>,
}

impl SheetsMirror {
  pub fn new(config: MirrorConfig) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { config, http, conn: OnceCell::new() })
  }

  pub fn is_enabled(&self) -> bool { self.config.spreadsheet_id.is_some() }

  /// Whether a connection has been established and cached.
  pub fn is_connected(&self) -> bool { self.conn.initialized() }

  async fn connect(&self, spreadsheet_id: &str) -> Result<Connection> {
    let (key, source) = self.config.credential_sources().load().await?;
    tracing::info!(%source, "using service account {}", key.client_email);

    let tokens = TokenSource::new(self.http.clone(), key)?;
    let client = SheetsClient::new(
      self.http.clone(),
      tokens,
      self.config.api_base.clone(),
      spreadsheet_id,
    );
    let conn = Connection {
      client,
      range: sheet_range(&self.config.worksheet_title),
    };
    conn.ensure_worksheet(&self.config.worksheet_title).await?;

    tracing::info!(spreadsheet_id, "connected to mirror spreadsheet");
    Ok(conn)
  }
}

impl SubmissionMirror for SheetsMirror {
  async fn append_row(&self, row: Vec<String>) -> MirrorOutcome {
    let Some(spreadsheet_id) = self.config.spreadsheet_id.as_deref() else {
      tracing::debug!("mirror disabled, write skipped");
      return MirrorOutcome::Skipped;
    };

    let conn = match self.conn.get_or_try_init(|| self.connect(spreadsheet_id)).await {
      Ok(conn) => conn,
      Err(e) => {
        tracing::warn!("mirror unavailable, write skipped: {e}");
        return MirrorOutcome::Skipped;
      }
    };

    if let Err(e) = conn.client.append_row(&conn.range, &row).await {
      // The worksheet may have been deleted or renamed since connecting.
      tracing::warn!("mirror write failed, rechecking worksheet: {e}");
      if let Err(e) = conn.ensure_worksheet(&self.config.worksheet_title).await {
        tracing::error!("mirror worksheet unavailable: {e}");
        return MirrorOutcome::Failed;
      }
      if let Err(e) = conn.client.append_row(&conn.range, &row).await {
        tracing::error!("mirror write failed: {e}");
        return MirrorOutcome::Failed;
      }
    }

    tracing::info!("submission mirrored");
    MirrorOutcome::Written
  }
}
