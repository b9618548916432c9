//! Error types for `instruktorji-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("subject catalog is empty")]
  EmptyCatalog,

  #[error("subject code must not be empty (label {0:?})")]
  EmptySubjectCode(String),

  #[error("duplicate subject code in catalog: {0:?}")]
  DuplicateSubjectCode(String),

  #[error("unknown grade level: {0:?}")]
  UnknownGradeLevel(String),

  #[error("unknown section: {0:?}")]
  UnknownSection(String),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("csv buffer error: {0}")]
  CsvBuffer(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
