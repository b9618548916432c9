//! Google Sheets mirror for tutor registrations.
//!
//! [`SheetsMirror`] implements [`SubmissionMirror`] by appending one row per
//! submission to a worksheet. The connection is established lazily on the
//! first write and cached for the rest of the process; when it cannot be
//! established the write is skipped and logged.
//!
//! [`SubmissionMirror`]: instruktorji_core::mirror::SubmissionMirror

mod auth;
mod client;
mod credentials;
mod mirror;

pub mod error;

pub use credentials::{CredentialSource, ServiceAccountKey};
pub use error::{Error, Result};
pub use mirror::{MirrorConfig, SheetsMirror};
