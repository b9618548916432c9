//! Login, listing, delete and logout for the admin panel.

use axum::{
  Form,
  extract::{Path, State},
  http::StatusCode,
  response::{Html, IntoResponse, Redirect, Response},
};
use instruktorji_core::{
  mirror::SubmissionMirror,
  store::SubmissionStore,
  submission::SubmissionId,
};
use serde::Deserialize;
use tera::Context;

use crate::{
  AppState,
  auth::{Admin, LOGIN_PATH},
  error::Error,
  handlers::store_error,
  session::{Flash, Session},
  templates,
};

pub const PANEL_PATH: &str = "/admin/panel";
pub const WRONG_PASSWORD: &str = "Napačno geslo.";

#[derive(Deserialize)]
pub struct Login {
  #[serde(default)]
  password: String,
}

pub async fn login_page<S, M>(
  State(state): State<AppState<S, M>>,
  session: Session,
) -> Result<Response, Error>
where
  S: SubmissionStore + 'static,
  M: SubmissionMirror + 'static,
{
  if session.is_admin().await {
    return Ok(Redirect::to(PANEL_PATH).into_response());
  }
  let mut ctx = Context::new();
  ctx.insert("flashes", &session.take_flashes().await);
  Ok(state.templates.render(templates::LOGIN, &ctx)?.into_response())
}

pub async fn login<S, M>(
  State(state): State<AppState<S, M>>,
  session: Session,
  Form(login): Form<Login>,
) -> Redirect
where
  S: SubmissionStore + 'static,
  M: SubmissionMirror + 'static,
{
  if state.auth.verify(&login.password) {
    session.promote_to_admin().await;
    tracing::info!("admin logged in");
    Redirect::to(PANEL_PATH)
  } else {
    tracing::warn!("admin login failed");
    session.flash(Flash::error(WRONG_PASSWORD)).await;
    Redirect::to(LOGIN_PATH)
  }
}

pub async fn panel<S, M>(
  _admin: Admin,
  State(state): State<AppState<S, M>>,
  session: Session,
) -> Result<Html<String>, Error>
where
  S: SubmissionStore + 'static,
  M: SubmissionMirror + 'static,
{
  let submissions = state.store.list_all().await.map_err(store_error::<S>)?;

  let mut ctx = Context::new();
  ctx.insert("submissions", &submissions);
  ctx.insert("flashes", &session.take_flashes().await);
  state.templates.render(templates::ADMIN, &ctx)
}

/// Only numeric ids route here; anything else is a 404.
pub async fn delete<S, M>(
  _admin: Admin,
  State(state): State<AppState<S, M>>,
  Path(raw): Path<String>,
) -> Result<Response, Error>
where
  S: SubmissionStore + 'static,
  M: SubmissionMirror + 'static,
{
  let Ok(id) = raw.parse::<i64>().map(SubmissionId) else {
    return Ok(StatusCode::NOT_FOUND.into_response());
  };
  let removed = state.store.delete(id).await.map_err(store_error::<S>)?;
  tracing::info!(%id, removed, "admin delete");
  Ok(Redirect::to(PANEL_PATH).into_response())
}

pub async fn logout(session: Session) -> Redirect {
  session.clear().await;
  Redirect::to(LOGIN_PATH)
}
