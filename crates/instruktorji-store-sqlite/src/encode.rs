//! Decoding helpers between SQLite rows and domain types.
//!
//! Grade level and section are stored as their display strings
//! (`"2. letnik"`, `"b"`), the same text shown in the form and the export.
//! They are read back verbatim; rows written by other tools may hold values
//! the form would reject.

use instruktorji_core::submission::{Submission, SubmissionId};

/// Column list shared by every `SELECT`, in [`RawSubmission`] field order.
pub const COLUMNS: &str =
  "id, datum, ime, priimek, email, razred, oddelek, predmeti";

/// A row exactly as read from the `instruktors` table.
pub struct RawSubmission {
  pub id:       i64,
  pub datum:    String,
  pub ime:      String,
  pub priimek:  String,
  pub email:    String,
  pub razred:   String,
  pub oddelek:  String,
  pub predmeti: String,
}

impl RawSubmission {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:       row.get(0)?,
      datum:    row.get(1)?,
      ime:      row.get(2)?,
      priimek:  row.get(3)?,
      email:    row.get(4)?,
      razred:   row.get(5)?,
      oddelek:  row.get(6)?,
      predmeti: row.get(7)?,
    })
  }

  pub fn into_submission(self) -> Submission {
    Submission {
      id:               SubmissionId(self.id),
      timestamp:        self.datum,
      first_name:       self.ime,
      last_name:        self.priimek,
      email:            self.email,
      grade_level:      self.razred,
      section:          self.oddelek,
      subjects_summary: self.predmeti,
    }
  }
}
