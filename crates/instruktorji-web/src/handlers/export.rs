//! `GET /export`: every submission as a semicolon-separated CSV download.

use axum::{
  extract::State,
  http::header,
  response::{IntoResponse, Response},
};
use instruktorji_core::{
  export::{self, EXPORT_FILE_NAME},
  mirror::SubmissionMirror,
  store::SubmissionStore,
};

use crate::{AppState, auth::Admin, error::Error, handlers::store_error};

pub async fn handler<S, M>(
  _admin: Admin,
  State(state): State<AppState<S, M>>,
) -> Result<Response, Error>
where
  S: SubmissionStore + 'static,
  M: SubmissionMirror + 'static,
{
  let submissions = state.store.list_all().await.map_err(store_error::<S>)?;
  let body = export::encode(&submissions)?;
  tracing::info!(rows = submissions.len(), "exported submissions");

  Ok(
    (
      [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
        (
          header::CONTENT_DISPOSITION,
          format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
        ),
      ],
      body,
    )
      .into_response(),
  )
}
