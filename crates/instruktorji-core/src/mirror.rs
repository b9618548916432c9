//! The `SubmissionMirror` trait: a best-effort secondary copy of submissions.
//!
//! A mirror never reports errors to its caller. Whatever happens is folded
//! into a [`MirrorOutcome`] after the implementation has logged it.

use std::future::Future;

use crate::submission::Submission;

/// Column headers of the mirrored sheet, in row order.
pub const MIRROR_HEADERS: [&str; 7] = [
  "Datum",
  "Ime",
  "Priimek",
  "E-pošta",
  "Razred",
  "Oddelek",
  "Predmeti (učitelj)",
];

/// What happened to one mirror write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorOutcome {
  /// The row was appended.
  Written,
  /// The mirror is disabled or could not be reached; nothing was sent.
  Skipped,
  /// The sink was reachable but the write failed.
  Failed,
}

/// One mirrored row: the creation timestamp followed by the data fields, in
/// [`MIRROR_HEADERS`] order. The store-assigned id is not mirrored.
pub fn mirror_row(submission: &Submission) -> Vec<String> {
  vec![
    submission.timestamp.clone(),
    submission.first_name.clone(),
    submission.last_name.clone(),
    submission.email.clone(),
    submission.grade_level.clone(),
    submission.section.clone(),
    submission.subjects_summary.clone(),
  ]
}

/// Append-only, best-effort sink for successful local writes.
pub trait SubmissionMirror: Send + Sync {
  /// Append one row built by [`mirror_row`]. Must not fail or panic; every
  /// problem is logged by the implementation and reported as an outcome.
  fn append_row(
    &self,
    row: Vec<String>,
  ) -> impl Future<Output = MirrorOutcome> + Send + '_;
}
