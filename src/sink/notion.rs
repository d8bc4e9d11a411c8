//! Notion database sink: one page per completed batch.

use std::time::Duration;

use reqwest::{blocking::Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use super::{ResultSink, SinkError};
use crate::{config::NotionSettings, quiz::SessionRecord};

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com";
pub const NOTION_VERSION: &str = "2022-06-28";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug)]
pub struct NotionSink {
    token: String,
    database_id: String,
    base_url: String,
    timeout_secs: u64,
    client: Client,
}

#[derive(Deserialize)]
struct NotionErrorBody {
    #[serde(default)]
    message: String,
}

impl NotionSink {
    pub fn new(
        token: &str,
        database_id: &str,
        base_url: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, SinkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SinkError::Network(e.to_string()))?;

        Ok(Self {
            token: token.to_string(),
            database_id: database_id.to_string(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            timeout_secs,
            client,
        })
    }

    /// Build from settings, failing when credentials are missing
    pub fn from_settings(settings: &NotionSettings) -> Result<Self, SinkError> {
        let token = settings
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| SinkError::NotConfigured("no Notion token (set NOTION_TOKEN)".into()))?;
        let database_id = settings
            .database_id
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| {
                SinkError::NotConfigured("no Notion database id (set NOTION_DATABASE_ID)".into())
            })?;

        Self::new(
            token,
            database_id,
            settings.base_url.clone(),
            settings.timeout_secs,
        )
    }

    fn page_body(&self, record: &SessionRecord) -> Value {
        page_body(&self.database_id, record)
    }

    fn map_transport_error(&self, e: reqwest::Error) -> SinkError {
        if e.is_timeout() {
            SinkError::Timeout(self.timeout_secs)
        } else {
            SinkError::Network(e.to_string())
        }
    }
}

/// Page payload for the results database. The title column is left empty;
/// the date column carries the day instead.
pub fn page_body(database_id: &str, record: &SessionRecord) -> Value {
    json!({
        "parent": { "database_id": database_id },
        "properties": {
            "Title": { "title": [ { "text": { "content": "" } } ] },
            "Date": { "date": { "start": record.date } },
            "Operation": { "rich_text": [ { "text": { "content": record.operation.to_string() } } ] },
            "Time Taken": { "number": record.elapsed_secs },
            "Correct Answers": { "number": record.correct },
            "Total Questions": { "number": record.total },
            "Accuracy": { "number": record.accuracy_percent }
        }
    })
}

impl ResultSink for NotionSink {
    fn name(&self) -> &str {
        "Notion"
    }

    #[instrument(skip(self, record), fields(operation = %record.operation))]
    fn send(&mut self, record: &SessionRecord) -> Result<(), SinkError> {
        let url = format!("{}/v1/pages", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&self.page_body(record))
            .send()
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if status.is_success() {
            info!("record saved to Notion");
            return Ok(());
        }

        let text = response.text().unwrap_or_default();
        let message = serde_json::from_str::<NotionErrorBody>(&text)
            .map(|b| b.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or(text);

        warn!(status = status.as_u16(), %message, "Notion rejected record");

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SinkError::Unauthorized(message),
            StatusCode::BAD_REQUEST => SinkError::Validation(message),
            _ => SinkError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }
}
