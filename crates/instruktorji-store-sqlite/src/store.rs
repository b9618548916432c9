//! [`SqliteStore`]: the SQLite implementation of [`SubmissionStore`].

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use instruktorji_core::{
  store::SubmissionStore,
  submission::{NewSubmission, Submission, SubmissionId},
};

use crate::{
  Result,
  encode::{COLUMNS, RawSubmission},
  schema::{BUSY_TIMEOUT_MS, SCHEMA},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A submission store backed by a single SQLite file.
///
/// The store holds only the file path; each operation opens its own
/// connection and closes it before returning.
#[derive(Clone, Debug)]
pub struct SqliteStore {
  path: PathBuf,
}

impl SqliteStore {
  /// A store for the database at `path`. Nothing is opened yet.
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  /// A store for `path` whose schema has been initialised.
  pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
    let store = Self::new(path);
    store.initialize().await?;
    Ok(store)
  }

  pub fn path(&self) -> &Path { &self.path }

  /// Run `f` on a connection opened for this call only.
  ///
  /// The connection is closed on every path, including when `f` fails.
  async fn with_connection<F, R>(&self, f: F) -> Result<R>
  where
    F: FnOnce(&mut rusqlite::Connection) -> tokio_rusqlite::Result<R>
      + Send
      + 'static,
    R: Send + 'static,
  {
    let conn = tokio_rusqlite::Connection::open(&self.path).await?;

    let result = conn
      .call(move |conn| {
        conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;
        f(conn)
      })
      .await;

    if let Err(e) = conn.close().await {
      tracing::warn!(path = %self.path.display(), "failed to close connection: {e}");
    }

    Ok(result?)
  }
}

// ─── SubmissionStore impl ────────────────────────────────────────────────────

impl SubmissionStore for SqliteStore {
  type Error = crate::Error;

  async fn initialize(&self) -> Result<()> {
    self
      .with_connection(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::info!(path = %self.path.display(), "submission store ready");
    Ok(())
  }

  async fn append(&self, input: NewSubmission) -> Result<SubmissionId> {
    let NewSubmission { timestamp, fields } = input;
    let grade_level = fields.grade_level.as_str();
    let section = fields.section.as_str();

    let id = self
      .with_connection(move |conn| {
        conn.execute(
          "INSERT INTO instruktors (datum, ime, priimek, email, razred, oddelek, predmeti)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            timestamp,
            fields.first_name,
            fields.last_name,
            fields.email,
            grade_level,
            section,
            fields.subjects_summary,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(SubmissionId(id))
  }

  async fn list_all(&self) -> Result<Vec<Submission>> {
    let raws: Vec<RawSubmission> = self
      .with_connection(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COLUMNS} FROM instruktors ORDER BY id DESC"
        ))?;
        let rows = stmt
          .query_map([], RawSubmission::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawSubmission::into_submission).collect())
  }

  async fn delete(&self, id: SubmissionId) -> Result<bool> {
    let removed = self
      .with_connection(move |conn| {
        let n = conn.execute(
          "DELETE FROM instruktors WHERE id = ?1",
          rusqlite::params![id.0],
        )?;
        Ok(n > 0)
      })
      .await?;
    Ok(removed)
  }
}
