//! Spreadsheet store — native Google Sheets/Drive client over plain HTTP,
//! plus the collaborator seams the writer is built against.
//!
//! No SDK: token refresh, Drive lookup, value reads/appends, and grid
//! formatting are direct REST calls. The writer itself never sees any of
//! this — it talks to `SheetConnector`/`SheetStore`.

pub mod formatting;
pub mod writer;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_FILES_API: &str = "https://www.googleapis.com/drive/v3/files";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sheets API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// OAuth client credentials plus a long-lived refresh token, read from the
/// credentials file named in config. Connecting exchanges the refresh token
/// for a fresh access token — good for the lifetime of one run.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ServiceCredentials {
    pub fn from_file(path: &str) -> Result<Self, SheetError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SheetError::Credentials(format!("{path}: {e}")))?;
        serde_json::from_str(&content)
            .map_err(|e| SheetError::Credentials(format!("{path}: {e}")))
    }
}

/// Row and grid operations on one connected worksheet.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Every row currently in the table, header included. Empty cells come
    /// back as empty strings; a fresh sheet comes back as no rows at all.
    async fn read_all(&self) -> Result<Vec<Vec<String>>, SheetError>;

    /// Appends rows after the current last row, in one call.
    async fn append_rows(&self, rows: Vec<Vec<String>>) -> Result<(), SheetError>;

    /// Bolds the header row and freezes it. Cosmetic.
    async fn bold_freeze_header(&self, columns: usize) -> Result<(), SheetError>;

    /// Checkbox data-validation on `column` for the 1-based row range
    /// `first_row..=last_row`. Cosmetic.
    async fn checkbox_validation(
        &self,
        column: usize,
        first_row: usize,
        last_row: usize,
    ) -> Result<(), SheetError>;
}

/// Authenticates and opens (or lazily creates) the named spreadsheet.
#[async_trait]
pub trait SheetConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn SheetStore>, SheetError>;
}

pub struct GoogleSheetsConnector {
    client: Client,
    credentials_file: String,
    sheet_name: String,
}

impl GoogleSheetsConnector {
    pub fn new(credentials_file: String, sheet_name: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            credentials_file,
            sheet_name,
        }
    }

    async fn access_token(&self, creds: &ServiceCredentials) -> Result<String, SheetError> {
        let response = self
            .client
            .post(&creds.token_uri)
            .form(&[
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("refresh_token", creds.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(SheetError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let value: serde_json::Value = serde_json::from_str(&body)?;
        value["access_token"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| SheetError::Credentials("no access_token in token response".to_string()))
    }

    async fn find_spreadsheet(&self, token: &str) -> Result<Option<String>, SheetError> {
        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            self.sheet_name.replace('\'', "\\'"),
            SPREADSHEET_MIME
        );
        let response = self
            .client
            .get(DRIVE_FILES_API)
            .bearer_auth(token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name)"),
                ("pageSize", "1"),
            ])
            .send()
            .await?;

        let value = expect_json(response).await?;
        Ok(value["files"]
            .as_array()
            .and_then(|files| files.first())
            .and_then(|file| file["id"].as_str())
            .map(str::to_string))
    }

    async fn create_spreadsheet(&self, token: &str) -> Result<String, SheetError> {
        let response = self
            .client
            .post(SHEETS_API)
            .bearer_auth(token)
            .json(&json!({ "properties": { "title": self.sheet_name } }))
            .send()
            .await?;

        let value = expect_json(response).await?;
        value["spreadsheetId"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| SheetError::Api {
                status: 200,
                message: "create reply missing spreadsheetId".to_string(),
            })
    }

    async fn first_worksheet(
        &self,
        token: &str,
        spreadsheet_id: &str,
    ) -> Result<(i64, String), SheetError> {
        let url = format!("{SHEETS_API}/{spreadsheet_id}");
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("fields", "sheets(properties(sheetId,title))")])
            .send()
            .await?;

        let value = expect_json(response).await?;
        let props = &value["sheets"][0]["properties"];
        match (props["sheetId"].as_i64(), props["title"].as_str()) {
            (Some(id), Some(title)) => Ok((id, title.to_string())),
            _ => Err(SheetError::Api {
                status: 200,
                message: "spreadsheet has no worksheets".to_string(),
            }),
        }
    }
}

#[async_trait]
impl SheetConnector for GoogleSheetsConnector {
    async fn connect(&self) -> Result<Box<dyn SheetStore>, SheetError> {
        let creds = ServiceCredentials::from_file(&self.credentials_file)?;
        let token = self.access_token(&creds).await?;

        let spreadsheet_id = match self.find_spreadsheet(&token).await? {
            Some(id) => id,
            None => {
                info!("Sheet '{}' not found. Creating new sheet.", self.sheet_name);
                self.create_spreadsheet(&token).await?
            }
        };

        let (worksheet_id, worksheet_title) = self.first_worksheet(&token, &spreadsheet_id).await?;
        debug!("Connected to spreadsheet {spreadsheet_id} (worksheet '{worksheet_title}')");

        Ok(Box::new(Worksheet {
            client: self.client.clone(),
            token,
            spreadsheet_id,
            worksheet_id,
            worksheet_title,
        }))
    }
}

/// One worksheet of a connected spreadsheet.
pub struct Worksheet {
    client: Client,
    token: String,
    spreadsheet_id: String,
    worksheet_id: i64,
    worksheet_title: String,
}

impl Worksheet {
    async fn batch_update(&self, requests: serde_json::Value) -> Result<(), SheetError> {
        let url = format!("{SHEETS_API}/{}:batchUpdate", self.spreadsheet_id);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&json!({ "requests": requests }))
            .send()
            .await?;
        expect_json(response).await?;
        Ok(())
    }
}

#[async_trait]
impl SheetStore for Worksheet {
    async fn read_all(&self) -> Result<Vec<Vec<String>>, SheetError> {
        let url = format!(
            "{SHEETS_API}/{}/values/{}",
            self.spreadsheet_id, self.worksheet_title
        );
        let response = self.client.get(&url).bearer_auth(&self.token).send().await?;
        let value = expect_json(response).await?;

        // "values" is absent entirely on an empty sheet
        let rows = value["values"]
            .as_array()
            .map(|rows| {
                rows.iter()
                    .map(|row| {
                        row.as_array()
                            .map(|cells| {
                                cells
                                    .iter()
                                    .map(|cell| cell.as_str().unwrap_or_default().to_string())
                                    .collect()
                            })
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }

    async fn append_rows(&self, rows: Vec<Vec<String>>) -> Result<(), SheetError> {
        let url = format!(
            "{SHEETS_API}/{}/values/{}:append",
            self.spreadsheet_id, self.worksheet_title
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": rows }))
            .send()
            .await?;
        expect_json(response).await?;
        Ok(())
    }

    async fn bold_freeze_header(&self, columns: usize) -> Result<(), SheetError> {
        self.batch_update(json!([
            {
                "repeatCell": {
                    "range": {
                        "sheetId": self.worksheet_id,
                        "startRowIndex": 0,
                        "endRowIndex": 1,
                        "startColumnIndex": 0,
                        "endColumnIndex": columns
                    },
                    "cell": { "userEnteredFormat": { "textFormat": { "bold": true } } },
                    "fields": "userEnteredFormat.textFormat.bold"
                }
            },
            {
                "updateSheetProperties": {
                    "properties": {
                        "sheetId": self.worksheet_id,
                        "gridProperties": { "frozenRowCount": 1 }
                    },
                    "fields": "gridProperties.frozenRowCount"
                }
            }
        ]))
        .await
    }

    async fn checkbox_validation(
        &self,
        column: usize,
        first_row: usize,
        last_row: usize,
    ) -> Result<(), SheetError> {
        // Grid ranges are 0-based and half-open; rows arrive 1-based inclusive.
        self.batch_update(json!([
            {
                "setDataValidation": {
                    "range": {
                        "sheetId": self.worksheet_id,
                        "startRowIndex": first_row - 1,
                        "endRowIndex": last_row,
                        "startColumnIndex": column,
                        "endColumnIndex": column + 1
                    },
                    "rule": {
                        "condition": { "type": "BOOLEAN" },
                        "showCustomUi": true
                    }
                }
            }
        ]))
        .await
    }
}

async fn expect_json(response: reqwest::Response) -> Result<serde_json::Value, SheetError> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(SheetError::Api {
            status: status.as_u16(),
            message: body,
        });
    }
    if body.is_empty() {
        return Ok(serde_json::Value::Null);
    }
    Ok(serde_json::from_str(&body)?)
}
