pub mod admin;
pub mod export;
pub mod form;

use instruktorji_core::store::SubmissionStore;

use crate::error::Error;

/// Wrap a backend failure for the generic 500 page.
pub(super) fn store_error<S: SubmissionStore>(e: S::Error) -> Error {
  Error::Store(Box::new(e))
}
