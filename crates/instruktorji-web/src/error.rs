//! Error types and axum `IntoResponse` implementation.
//!
//! Internal failures are logged with their cause and shown to the browser
//! as a generic page; validation and login problems never reach this type,
//! they are flashed instead.

use axum::{
  http::StatusCode,
  response::{Html, IntoResponse, Response},
};
use thiserror::Error;

const GENERIC_FAILURE: &str = "<!doctype html><meta charset=\"utf-8\">\
<h1>Prišlo je do napake</h1><p>Prijave trenutno ni mogoče obdelati. Poskusite znova kasneje.</p>";

#[derive(Debug, Error)]
pub enum Error {
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
  #[error("template error: {0}")]
  Template(#[from] tera::Error),
  #[error("export error: {0}")]
  Export(#[from] instruktorji_core::Error),
  #[error("session layer is not installed")]
  SessionMissing,
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    tracing::error!("request failed: {self:?}");
    (StatusCode::INTERNAL_SERVER_ERROR, Html(GENERIC_FAILURE)).into_response()
  }
}
