//! The public registration form and its submission endpoint.

use axum::{
  Form,
  extract::State,
  response::{Html, Redirect},
};
use chrono::Local;
use instruktorji_core::{
  catalog::{GradeLevel, Section},
  mirror::SubmissionMirror,
  store::SubmissionStore,
  submission::RawForm,
};
use tera::Context;

use crate::{
  AppState,
  error::Error,
  handlers::store_error,
  intake::{self, IntakeError},
  session::{Flash, Session},
  templates,
};

pub const THANKS: &str = "Hvala! Prijava je shranjena.";

pub async fn index<S, M>(
  State(state): State<AppState<S, M>>,
  session: Session,
) -> Result<Html<String>, Error>
where
  S: SubmissionStore + 'static,
  M: SubmissionMirror + 'static,
{
  let mut ctx = Context::new();
  ctx.insert("subjects", state.catalog.as_ref());
  ctx.insert("grade_levels", &GradeLevel::ALL);
  ctx.insert("sections", &Section::ALL);
  ctx.insert("flashes", &session.take_flashes().await);
  state.templates.render(templates::FORM, &ctx)
}

pub async fn submit<S, M>(
  State(state): State<AppState<S, M>>,
  session: Session,
  Form(form): Form<RawForm>,
) -> Result<Redirect, Error>
where
  S: SubmissionStore + 'static,
  M: SubmissionMirror + 'static,
{
  let now = Local::now().naive_local();
  match intake::submit(state.store.as_ref(), &state.mirror, &state.catalog, &form, now).await {
    Ok(_receipt) => session.flash(Flash::ok(THANKS)).await,
    Err(IntakeError::Invalid(e)) => {
      tracing::debug!("submission rejected: {e}");
      session.flash(Flash::error(e.to_string())).await;
    }
    Err(IntakeError::Store(e)) => return Err(store_error::<S>(e)),
  }
  Ok(Redirect::to("/"))
}
