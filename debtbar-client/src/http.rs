//! `LedgerSource` over the store's three HTTP functions.
//!
//! Endpoints (all GET, no body):
//! - `fetch-debt`  -> 200 `{ "debt": [entry, ..] }` | 500 `{ message, error }`
//! - `add-debt`    -> 200 `{ message }` | 403 `{ message }` | 500 `{ message, error }`
//! - `remove-debt` -> same as `add-debt`
//!
//! The store derives the caller's identity from its network origin.

use debtbar_core::{AppendOutcome, Direction, LedgerEntry, LedgerSource, SourceError};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const FUNCTIONS_PATH: &str = ".netlify/functions";

#[derive(Debug, Clone)]
pub struct HttpLedgerSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLedgerSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self, function: &str) -> String {
        format!("{}/{FUNCTIONS_PATH}/{function}", self.base_url)
    }

    async fn get(&self, function: &str) -> Result<(StatusCode, String), SourceError> {
        let url = self.endpoint(function);
        debug!(%url, "requesting");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Unavailable(format!("{function}: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| SourceError::Unavailable(format!("{function}: reading body: {e}")))?;
        debug!(%status, bytes = body.len(), "response");
        Ok((status, body))
    }
}

impl LedgerSource for HttpLedgerSource {
    async fn fetch_all(&self) -> Result<Vec<LedgerEntry>, SourceError> {
        let (status, body) = self.get("fetch-debt").await?;
        classify_fetch(status, &body)
    }

    async fn append(&self, direction: Direction) -> Result<AppendOutcome, SourceError> {
        let function = match direction {
            Direction::Add => "add-debt",
            Direction::Remove => "remove-debt",
        };
        let (status, body) = self.get(function).await?;
        classify_append(status, &body)
    }
}

#[derive(Deserialize)]
struct FetchBody {
    #[serde(alias = "entries")]
    debt: Vec<LedgerEntry>,
}

#[derive(Deserialize, Default)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<Value>,
}

/// Interpret a `fetch-debt` response.
pub fn classify_fetch(status: StatusCode, body: &str) -> Result<Vec<LedgerEntry>, SourceError> {
    if !status.is_success() {
        return Err(fault(status, body));
    }
    let parsed: FetchBody = serde_json::from_str(body).map_err(|e| SourceError::Fault {
        message: "Malformed debt data".to_string(),
        detail: Some(e.to_string()),
    })?;
    Ok(parsed.debt)
}

/// Interpret an `add-debt` / `remove-debt` response.
pub fn classify_append(status: StatusCode, body: &str) -> Result<AppendOutcome, SourceError> {
    if status == StatusCode::FORBIDDEN {
        let message = parse_message(body)
            .message
            .unwrap_or_else(|| debtbar_core::ALREADY_CONTRIBUTED.to_string());
        return Ok(AppendOutcome::AlreadyContributed { message });
    }
    if !status.is_success() {
        return Err(fault(status, body));
    }
    let message = parse_message(body).message.unwrap_or_default();
    Ok(AppendOutcome::Accepted { message })
}

fn parse_message(body: &str) -> MessageBody {
    serde_json::from_str(body).unwrap_or_default()
}

fn fault(status: StatusCode, body: &str) -> SourceError {
    let parsed = parse_message(body);
    SourceError::Fault {
        message: parsed
            .message
            .unwrap_or_else(|| format!("store responded {status}")),
        detail: parsed.error.map(|e| match e {
            Value::String(s) => s,
            other => other.to_string(),
        }),
    }
}
