//! CSV export of the admin listing.
//!
//! The output targets spreadsheet applications configured for a Slovenian
//! locale: fields are separated by `;` and the UTF-8 text is prefixed with a
//! byte-order mark so accented characters are detected on import.

use crate::{Error, Result, submission::Submission};

/// UTF-8 byte-order mark written before the header row.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Download name of the exported file.
pub const EXPORT_FILE_NAME: &str = "instruktorji.csv";

/// Header row of the export, id first.
pub const EXPORT_HEADERS: [&str; 8] = [
  "ID",
  "Datum",
  "Ime",
  "Priimek",
  "E-pošta",
  "Razred",
  "Oddelek",
  "Predmeti (učitelj)",
];

/// Encode `submissions` in the given order.
pub fn encode(submissions: &[Submission]) -> Result<Vec<u8>> {
  let mut writer = csv::WriterBuilder::new()
    .delimiter(b';')
    .terminator(csv::Terminator::CRLF)
    .from_writer(UTF8_BOM.to_vec());

  writer.write_record(EXPORT_HEADERS)?;
  for s in submissions {
    writer.write_record([
      s.id.to_string().as_str(),
      s.timestamp.as_str(),
      s.first_name.as_str(),
      s.last_name.as_str(),
      s.email.as_str(),
      s.grade_level.as_str(),
      s.section.as_str(),
      s.subjects_summary.as_str(),
    ])?;
  }

  writer.into_inner().map_err(|e| Error::CsvBuffer(e.to_string()))
}
