//! The subject catalog and the fixed enumerations offered by the form.
//!
//! The catalog is loaded once at startup and never mutated afterwards. Its
//! order is significant: it drives the checkbox order on the form and the
//! segment order of every subjects summary.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Subjects ────────────────────────────────────────────────────────────────

/// One tutoring subject: a short form-field code and a human label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  pub code:  String,
  pub label: String,
}

impl Subject {
  pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
    Self { code: code.into(), label: label.into() }
  }

  /// Name of the checkbox field for this subject, e.g. `chk_mat`.
  pub fn checkbox_field(&self) -> String { format!("chk_{}", self.code) }

  /// Name of the teacher text field for this subject, e.g. `teacher_mat`.
  pub fn teacher_field(&self) -> String { format!("teacher_{}", self.code) }
}

const DEFAULT_SUBJECTS: &[(&str, &str)] = &[
  ("mat", "Matematika"),
  ("fiz", "Fizika"),
  ("ang", "Angleščina"),
  ("inf", "Informatika"),
  ("kem", "Kemija"),
  ("nem", "Nemščina"),
  ("slo", "Slovenščina"),
  ("bio", "Biologija"),
  ("zgod", "Zgodovina"),
  ("geo", "Geografija"),
  ("spa", "Španščina"),
  ("ita", "Italijanščina"),
  ("fra", "Francoščina"),
];

/// Immutable, ordered list of subjects a student can offer to tutor.
///
/// Construction validates that codes are non-empty and unique, so every
/// form field name derived from the catalog is unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Subject>", into = "Vec<Subject>")]
pub struct SubjectCatalog {
  subjects: Vec<Subject>,
}

impl SubjectCatalog {
  pub fn new(subjects: Vec<Subject>) -> Result<Self> {
    if subjects.is_empty() {
      return Err(Error::EmptyCatalog);
    }
    for (i, subject) in subjects.iter().enumerate() {
      if subject.code.trim().is_empty() {
        return Err(Error::EmptySubjectCode(subject.label.clone()));
      }
      if subjects[..i].iter().any(|s| s.code == subject.code) {
        return Err(Error::DuplicateSubjectCode(subject.code.clone()));
      }
    }
    Ok(Self { subjects })
  }

  pub fn iter(&self) -> impl Iterator<Item = &Subject> { self.subjects.iter() }

  pub fn len(&self) -> usize { self.subjects.len() }

  pub fn is_empty(&self) -> bool { self.subjects.is_empty() }

  pub fn get(&self, code: &str) -> Option<&Subject> {
    self.subjects.iter().find(|s| s.code == code)
  }
}

impl Default for SubjectCatalog {
  fn default() -> Self {
    Self {
      subjects: DEFAULT_SUBJECTS
        .iter()
        .map(|(code, label)| Subject::new(*code, *label))
        .collect(),
    }
  }
}

impl TryFrom<Vec<Subject>> for SubjectCatalog {
  type Error = Error;

  fn try_from(subjects: Vec<Subject>) -> Result<Self> { Self::new(subjects) }
}

impl From<SubjectCatalog> for Vec<Subject> {
  fn from(catalog: SubjectCatalog) -> Self { catalog.subjects }
}

// ─── Grade level ─────────────────────────────────────────────────────────────

/// School year of the registering student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradeLevel {
  First,
  Second,
  Third,
  Fourth,
}

impl GradeLevel {
  pub const ALL: [GradeLevel; 4] =
    [Self::First, Self::Second, Self::Third, Self::Fourth];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::First => "1. letnik",
      Self::Second => "2. letnik",
      Self::Third => "3. letnik",
      Self::Fourth => "4. letnik",
    }
  }
}

impl FromStr for GradeLevel {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|g| g.as_str() == s)
      .ok_or_else(|| Error::UnknownGradeLevel(s.to_owned()))
  }
}

impl fmt::Display for GradeLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl Serialize for GradeLevel {
  fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(self.as_str())
  }
}

// ─── Section ─────────────────────────────────────────────────────────────────

/// Class section within a grade level, a single lowercase letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
  A,
  B,
  C,
  D,
  E,
  F,
}

impl Section {
  pub const ALL: [Section; 6] =
    [Self::A, Self::B, Self::C, Self::D, Self::E, Self::F];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::A => "a",
      Self::B => "b",
      Self::C => "c",
      Self::D => "d",
      Self::E => "e",
      Self::F => "f",
    }
  }
}

impl FromStr for Section {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|sec| sec.as_str() == s)
      .ok_or_else(|| Error::UnknownSection(s.to_owned()))
  }
}

impl fmt::Display for Section {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl Serialize for Section {
  fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(self.as_str())
  }
}
