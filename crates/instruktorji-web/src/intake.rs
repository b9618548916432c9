//! The intake flow: validate, persist locally, then mirror in the background.
//!
//! The local write is authoritative and must succeed before anything is sent
//! to the mirror. The mirror write runs on its own task and its outcome never
//! reaches the caller's response.

use std::sync::Arc;

use chrono::NaiveDateTime;
use instruktorji_core::{
  catalog::SubjectCatalog,
  mirror::{MirrorOutcome, SubmissionMirror, mirror_row},
  store::SubmissionStore,
  submission::{RawForm, Submission},
  validate::{ValidationError, validate},
};
use thiserror::Error;
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum IntakeError<E> {
  #[error(transparent)]
  Invalid(ValidationError),
  #[error("local store failed: {0}")]
  Store(#[source] E),
}

/// A stored submission and the handle of its pending mirror write.
pub struct Receipt {
  pub submission: Submission,
  pub mirror:     JoinHandle<MirrorOutcome>,
}

/// Run one submission through the intake flow, stamped with `now`.
pub async fn submit<S, M>(
  store: &S,
  mirror: &Arc<M>,
  catalog: &SubjectCatalog,
  form: &RawForm,
  now: NaiveDateTime,
) -> Result<Receipt, IntakeError<S::Error>>
where
  S: SubmissionStore,
  M: SubmissionMirror + 'static,
{
  let fields = validate(form, catalog).map_err(IntakeError::Invalid)?;
  let input = fields.stamp(now);

  let id = store.append(input.clone()).await.map_err(IntakeError::Store)?;
  let submission = input.into_submission(id);
  tracing::info!(id = %submission.id, "submission stored");

  let row = mirror_row(&submission);
  let mirror = Arc::clone(mirror);
  let id = submission.id;
  let handle = tokio::spawn(async move {
    let outcome = mirror.append_row(row).await;
    tracing::debug!(%id, ?outcome, "mirror write finished");
    outcome
  });

  Ok(Receipt { submission, mirror: handle })
}
