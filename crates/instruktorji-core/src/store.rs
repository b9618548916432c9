//! The `SubmissionStore` trait.
//!
//! Implemented by storage backends (e.g. `instruktorji-store-sqlite`). The web
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::submission::{NewSubmission, Submission, SubmissionId};

/// Authoritative, durable store of submissions.
///
/// Rows are appended and deleted, never updated. All methods return `Send`
/// futures so the trait can be used in multi-threaded async runtimes (e.g.
/// tokio with `axum`).
pub trait SubmissionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create the schema if it is absent. Safe to call on every start and
  /// concurrently with other operations.
  fn initialize(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Persist a new submission and return its freshly assigned id.
  fn append(
    &self,
    input: NewSubmission,
  ) -> impl Future<Output = Result<SubmissionId, Self::Error>> + Send + '_;

  /// Every submission, most recent (highest id) first.
  fn list_all(
    &self,
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + '_;

  /// Remove the submission with `id`. Returns whether a row was removed; a
  /// missing id is not an error.
  fn delete(
    &self,
    id: SubmissionId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
