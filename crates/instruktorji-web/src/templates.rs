//! HTML pages, embedded at compile time and rendered with tera.

use axum::response::Html;
use tera::{Context, Tera};

use crate::error::Error;

pub const FORM: &str = "form.html";
pub const LOGIN: &str = "login.html";
pub const ADMIN: &str = "admin.html";

const SOURCES: [(&str, &str); 4] = [
  ("base.html", include_str!("../templates/base.html")),
  (FORM, include_str!("../templates/form.html")),
  (LOGIN, include_str!("../templates/login.html")),
  (ADMIN, include_str!("../templates/admin.html")),
];

/// The compiled page templates. `.html` names are autoescaped.
pub struct Templates {
  tera: Tera,
}

impl Templates {
  pub fn new() -> Result<Self, Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(SOURCES)?;
    Ok(Self { tera })
  }

  pub fn render(&self, name: &str, context: &Context) -> Result<Html<String>, Error> {
    Ok(Html(self.tera.render(name, context)?))
  }
}
