//! Submission validation.
//!
//! Turns a [`RawForm`] into [`SubmissionFields`] or a [`ValidationError`]
//! whose `Display` text is shown to the submitter as-is. Pure, no I/O.

use thiserror::Error;

use crate::{
  catalog::{GradeLevel, Section, SubjectCatalog},
  submission::{NO_SUBJECTS, RawForm, SubmissionFields},
};

/// Form field names of the required inputs.
pub mod fields {
  pub const FIRST_NAME: &str = "ime";
  pub const LAST_NAME: &str = "priimek";
  pub const EMAIL: &str = "email";
  pub const GRADE_LEVEL: &str = "razred";
  pub const SECTION: &str = "oddelek";
}

/// Why a submission was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error(
    "Izpolnite vsa obvezna polja (ime, priimek, e-pošta, razred, oddelek)."
  )]
  MissingRequired,

  #[error("Neveljavna izbira v polju {field}.")]
  InvalidChoice { field: &'static str },

  #[error("Vnesite učitelja pri predmetu {label}.")]
  MissingTeacher { label: String },
}

/// Validate `form` against `catalog`.
///
/// Checks run in a fixed order: required fields (one combined error), then
/// the grade/section enumerations, then the subjects in catalog order,
/// stopping at the first checked subject without a teacher.
pub fn validate(
  form: &RawForm,
  catalog: &SubjectCatalog,
) -> Result<SubmissionFields, ValidationError> {
  let first_name = form.field(fields::FIRST_NAME);
  let last_name = form.field(fields::LAST_NAME);
  let email = form.field(fields::EMAIL);
  let grade_level = form.field(fields::GRADE_LEVEL);
  let section = form.field(fields::SECTION);

  if [first_name, last_name, email, grade_level, section]
    .iter()
    .any(|v| v.is_empty())
  {
    return Err(ValidationError::MissingRequired);
  }

  let grade_level: GradeLevel = grade_level
    .parse()
    .map_err(|_| ValidationError::InvalidChoice { field: fields::GRADE_LEVEL })?;
  let section: Section = section
    .parse()
    .map_err(|_| ValidationError::InvalidChoice { field: fields::SECTION })?;

  Ok(SubmissionFields {
    first_name: first_name.to_owned(),
    last_name: last_name.to_owned(),
    email: email.to_owned(),
    grade_level,
    section,
    subjects_summary: subjects_summary(form, catalog)?,
  })
}

/// Build the `"Label (Teacher); …"` summary in catalog order.
fn subjects_summary(
  form: &RawForm,
  catalog: &SubjectCatalog,
) -> Result<String, ValidationError> {
  let mut pairs = Vec::new();
  for subject in catalog.iter() {
    if !form.is_checked(&subject.checkbox_field()) {
      continue;
    }
    let teacher = form.field(&subject.teacher_field());
    if teacher.is_empty() {
      return Err(ValidationError::MissingTeacher {
        label: subject.label.clone(),
      });
    }
    pairs.push(format!("{} ({teacher})", subject.label));
  }

  if pairs.is_empty() {
    Ok(NO_SUBJECTS.to_owned())
  } else {
    Ok(pairs.join("; "))
  }
}
