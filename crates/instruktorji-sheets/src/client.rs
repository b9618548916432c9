//! Minimal Google Sheets v4 REST client: just the calls the mirror makes.

use reqwest::Url;
use serde::Deserialize;
use serde_json::json;

use crate::{Error, Result, auth::TokenSource};

/// Rows given to a newly created worksheet.
const NEW_SHEET_ROWS: usize = 1_000;

/// Minimum column count of a newly created worksheet.
const NEW_SHEET_MIN_COLUMNS: usize = 10;

#[derive(Deserialize)]
struct SpreadsheetMeta {
  #[serde(default)]
  sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
  properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
  title: String,
}

#[derive(Deserialize)]
struct ValueRange {
  #[serde(default)]
  values: Vec<Vec<serde_json::Value>>,
}

/// Authorised access to one spreadsheet.
pub struct SheetsClient {
  http:           reqwest::Client,
  tokens:         TokenSource,
  api_base:       String,
  spreadsheet_id: String,
}

impl SheetsClient {
  pub fn new(
    http: reqwest::Client,
    tokens: TokenSource,
    api_base: impl Into<String>,
    spreadsheet_id: impl Into<String>,
  ) -> Self {
    Self {
      http,
      tokens,
      api_base: api_base.into(),
      spreadsheet_id: spreadsheet_id.into(),
    }
  }

  /// `{api_base}/spreadsheets/{id}{suffix}/{segments…}`, each piece
  /// percent-encoded as a path segment.
  fn url(&self, suffix: &str, segments: &[&str]) -> Result<Url> {
    let mut url =
      Url::parse(&self.api_base).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    {
      let mut path = url
        .path_segments_mut()
        .map_err(|()| Error::InvalidUrl(self.api_base.clone()))?;
      path
        .pop_if_empty()
        .push("spreadsheets")
        .push(&format!("{}{suffix}", self.spreadsheet_id));
      for s in segments {
        path.push(s);
      }
    }
    Ok(url)
  }

  /// Titles of every worksheet; doubles as the "open by key" check.
  pub async fn sheet_titles(&self) -> Result<Vec<String>> {
    let mut url = self.url("", &[])?;
    url.query_pairs_mut().append_pair("fields", "sheets.properties.title");

    let meta: SpreadsheetMeta = self
      .http
      .get(url)
      .bearer_auth(self.tokens.bearer().await?)
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;

    Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
  }

  /// Add a worksheet sized for `columns` columns.
  pub async fn add_sheet(&self, title: &str, columns: usize) -> Result<()> {
    let body = json!({
      "requests": [{
        "addSheet": {
          "properties": {
            "title": title,
            "gridProperties": {
              "rowCount": NEW_SHEET_ROWS,
              "columnCount": columns.max(NEW_SHEET_MIN_COLUMNS),
            }
          }
        }
      }]
    });

    self
      .http
      .post(self.url(":batchUpdate", &[])?)
      .bearer_auth(self.tokens.bearer().await?)
      .json(&body)
      .send()
      .await?
      .error_for_status()?;
    Ok(())
  }

  /// Whether `range` holds no values at all.
  pub async fn is_empty(&self, range: &str) -> Result<bool> {
    let values: ValueRange = self
      .http
      .get(self.url("", &["values", range])?)
      .bearer_auth(self.tokens.bearer().await?)
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;
    Ok(values.values.is_empty())
  }

  /// Append `row` after the last non-empty row of `range`, verbatim.
  pub async fn append_row(&self, range: &str, row: &[String]) -> Result<()> {
    let mut url = self.url("", &["values", &format!("{range}:append")])?;
    url
      .query_pairs_mut()
      .append_pair("valueInputOption", "RAW")
      .append_pair("insertDataOption", "INSERT_ROWS");

    self
      .http
      .post(url)
      .bearer_auth(self.tokens.bearer().await?)
      .json(&json!({ "values": [row] }))
      .send()
      .await?
      .error_for_status()?;
    Ok(())
  }
}

/// A1-notation range covering a whole worksheet, e.g. `'Instruktorji'`.
pub fn sheet_range(title: &str) -> String {
  format!("'{}'", title.replace('\'', "''"))
}
