//! Remote tabular store access.
//!
//! [`SheetsBackend`] is the seam between the store logic and the remote
//! spreadsheet service: fetch a whole grid, fetch just the header row, append
//! one row, write one cell. All four are fallible, retryable operations;
//! retry is applied by the caller ([`crate::store`]), not here.
//!
//! [`HttpSheetsBackend`] talks to the Google Sheets v4 values API with
//! `reqwest`. Authentication stays outside this crate: the backend consumes a
//! ready bearer token supplied by the host's auth bootstrap.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use crate::error::{RemoteError, RemoteResult};
use crate::events;

const MODULE: &str = "sheetstore::remote";

/// Structural metadata reported by the store for an append.
#[derive(Debug, Clone, Default)]
pub struct AppendOutcome {
    /// A1 range the store says it wrote, e.g. `orders!A10:O10`.
    /// May be empty if the store omitted it.
    pub updated_range: String,
}

impl AppendOutcome {
    /// Recover the 1-based row number from the reported range.
    ///
    /// Returns 0 when the range cannot be parsed; the write itself already
    /// succeeded by the time this runs, so parse failure is not an error.
    pub fn row_number(&self) -> u64 {
        static ROW_RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"![A-Z]+(\d+)").expect("valid range regex"));
        ROW_RE
            .captures(&self.updated_range)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    }
}

/// The four operations the store needs from a remote tabular service.
#[async_trait]
pub trait SheetsBackend: Send + Sync {
    /// Fetch every cell of a named resource as a grid of strings.
    async fn fetch_grid(&self, resource: &str) -> RemoteResult<Vec<Vec<String>>>;

    /// Fetch only the header row of a named resource.
    async fn fetch_header_row(&self, resource: &str) -> RemoteResult<Vec<String>>;

    /// Append one row of values to a named resource.
    async fn append_row(&self, resource: &str, values: &[String]) -> RemoteResult<AppendOutcome>;

    /// Write a single cell (1-based row and column) of a named resource.
    async fn update_cell(
        &self,
        resource: &str,
        row: u64,
        col: usize,
        value: &str,
    ) -> RemoteResult<()>;
}

/// Convert a 1-based column index to A1 letters (1 -> A, 27 -> AA).
pub fn column_letters(col: usize) -> String {
    debug_assert!(col >= 1);
    let mut col = col;
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        col = (col - 1) / 26;
    }
    letters.iter().rev().collect()
}

// =============================================================================
// Google Sheets v4 values API client
// =============================================================================

const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// reqwest-backed [`SheetsBackend`] for the Google Sheets values API.
#[derive(Clone)]
pub struct HttpSheetsBackend {
    client: reqwest::Client,
    api_base: String,
    spreadsheet_id: String,
    access_token: String,
}

/// `values.get` response body.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// `values.append` response body.
#[derive(Debug, Deserialize)]
struct AppendResponse {
    #[serde(default)]
    updates: AppendUpdates,
}

#[derive(Debug, Default, Deserialize)]
struct AppendUpdates {
    #[serde(rename = "updatedRange", default)]
    updated_range: String,
}

/// Error body shape the API uses for non-success statuses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl HttpSheetsBackend {
    /// Create a backend for one spreadsheet with an already-authorized token.
    pub fn new(spreadsheet_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        let spreadsheet_id = spreadsheet_id.into();
        events::info("sheet_open", MODULE, json!({ "spreadsheet_id": &spreadsheet_id }));
        Self {
            client: reqwest::Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            spreadsheet_id,
            access_token: access_token.into(),
        }
    }

    /// Point the backend at a different API base (tests, proxies).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn values_url(&self, range: &str) -> String {
        format!("{}/{}/values/{}", self.api_base, self.spreadsheet_id, range)
    }

    async fn get_values(&self, range: &str) -> RemoteResult<Vec<Vec<String>>> {
        let response = self
            .client
            .get(self.values_url(range))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        let body = Self::read_success_body(response).await?;
        let range: ValueRange = serde_json::from_str(&body)
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;
        Ok(range.values)
    }

    /// Return the body of a success response, or map an error status to
    /// [`RemoteError::Api`] with the message the store reported.
    async fn read_success_body(response: reqwest::Response) -> RemoteResult<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl SheetsBackend for HttpSheetsBackend {
    async fn fetch_grid(&self, resource: &str) -> RemoteResult<Vec<Vec<String>>> {
        events::info("resource_open", MODULE, json!({ "name": resource }));
        self.get_values(resource).await
    }

    async fn fetch_header_row(&self, resource: &str) -> RemoteResult<Vec<String>> {
        events::info("resource_open", MODULE, json!({ "name": resource }));
        let mut grid = self.get_values(&format!("{}!1:1", resource)).await?;
        Ok(if grid.is_empty() { Vec::new() } else { grid.swap_remove(0) })
    }

    async fn append_row(&self, resource: &str, values: &[String]) -> RemoteResult<AppendOutcome> {
        let url = format!(
            "{}:append?valueInputOption=USER_ENTERED&insertDataOption=INSERT_ROWS",
            self.values_url(resource)
        );
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "values": [values] }))
            .send()
            .await
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        let body = Self::read_success_body(response).await?;
        let parsed: AppendResponse = serde_json::from_str(&body)
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;
        Ok(AppendOutcome {
            updated_range: parsed.updates.updated_range,
        })
    }

    async fn update_cell(
        &self,
        resource: &str,
        row: u64,
        col: usize,
        value: &str,
    ) -> RemoteResult<()> {
        let cell = format!("{}!{}{}", resource, column_letters(col), row);
        let url = format!("{}?valueInputOption=USER_ENTERED", self.values_url(&cell));
        let response = self
            .client
            .put(url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "values": [[value]] }))
            .send()
            .await
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        Self::read_success_body(response).await?;
        Ok(())
    }
}
