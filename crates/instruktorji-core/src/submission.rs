//! Submission types: one tutoring-availability registration.
//!
//! A submission is created once by the intake flow and never updated in
//! place. The subjects summary is derived at creation time and stored
//! verbatim.

use std::{collections::HashMap, fmt};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::catalog::{GradeLevel, Section};

/// Placeholder stored as the subjects summary when no subject was checked.
pub const NO_SUBJECTS: &str = "—";

/// `strftime` pattern of the creation timestamp, e.g. `2025-09-01 14:05`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Format a creation timestamp the way it is persisted and mirrored.
pub fn format_timestamp(at: NaiveDateTime) -> String {
  at.format(TIMESTAMP_FORMAT).to_string()
}

// ─── Identity ────────────────────────────────────────────────────────────────

/// Store-assigned row id. Monotonically increasing, never reused.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SubmissionId(pub i64);

impl fmt::Display for SubmissionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// ─── Raw form ────────────────────────────────────────────────────────────────

/// Field values exactly as posted by the browser, keyed by field name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RawForm(HashMap<String, String>);

impl RawForm {
  /// Trimmed value of `field`, or `""` when the field is absent.
  pub fn field(&self, field: &str) -> &str {
    self.0.get(field).map(|v| v.trim()).unwrap_or("")
  }

  /// Whether the checkbox `field` was ticked (browsers post `on`).
  pub fn is_checked(&self, field: &str) -> bool { self.field(field) == "on" }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawForm {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}

// ─── Validated fields ────────────────────────────────────────────────────────

/// A validated, normalised submission that has not been stamped yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFields {
  pub first_name:       String,
  pub last_name:        String,
  pub email:            String,
  pub grade_level:      GradeLevel,
  pub section:          Section,
  pub subjects_summary: String,
}

impl SubmissionFields {
  /// Attach the creation timestamp, producing the input for
  /// [`SubmissionStore::append`](crate::store::SubmissionStore::append).
  pub fn stamp(self, at: NaiveDateTime) -> NewSubmission {
    NewSubmission { timestamp: format_timestamp(at), fields: self }
  }
}

/// Everything the store needs to persist a new row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
  pub timestamp: String,
  pub fields:    SubmissionFields,
}

impl NewSubmission {
  /// Attach the store-assigned id.
  pub fn into_submission(self, id: SubmissionId) -> Submission {
    let NewSubmission { timestamp, fields } = self;
    Submission {
      id,
      timestamp,
      first_name: fields.first_name,
      last_name: fields.last_name,
      email: fields.email,
      grade_level: fields.grade_level.as_str().to_owned(),
      section: fields.section.as_str().to_owned(),
      subjects_summary: fields.subjects_summary,
    }
  }
}

// ─── Persisted submission ────────────────────────────────────────────────────

/// A persisted registration as returned by the store.
///
/// Grade level and section are kept as the stored text, so rows written by
/// other tools list and export unchanged even when they fall outside
/// [`GradeLevel`] and [`Section`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
  pub id:               SubmissionId,
  pub timestamp:        String,
  pub first_name:       String,
  pub last_name:        String,
  pub email:            String,
  pub grade_level:      String,
  pub section:          String,
  pub subjects_summary: String,
}
