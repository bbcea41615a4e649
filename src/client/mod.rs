//! HTTP client for the remote extraction service.
//!
//! All network exchange lives here: multipart upload of statement PDFs to
//! `/api/parse` (single) and `/api/batch-parse` (multiple), plus the
//! informational `/api/issuers` and `/health` endpoints. Nothing in this
//! module mutates application state; callers map the returned wire types
//! into records.

use crate::models::{RecordStatus, StatementFields};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Message shown when a failed single-file call carries no service message.
pub const FALLBACK_SINGLE_MESSAGE: &str = "Failed to parse statement";
/// Message shown when a failed batch call carries no service message.
pub const FALLBACK_BATCH_MESSAGE: &str = "Failed to parse statements";

/// Errors from the extraction service exchange.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Cannot connect to extraction service at {0}")]
    Connect(String),

    /// Non-2xx response; `message` is the service's own message when
    /// present, otherwise a generic fallback.
    #[error("{message}")]
    Service { status: u16, message: String },

    #[error("Failed to read {path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to decode service response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("Failed to send request: {0}")]
    Http(#[source] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// 2xx body of `POST /api/parse`.
#[derive(Debug, Deserialize)]
pub struct ParseResponse {
    pub data: StatementFields,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub parsed_at: Option<String>,
}

/// 2xx body of `POST /api/batch-parse`.
#[derive(Debug, Deserialize)]
pub struct BatchParseResponse {
    pub results: Vec<BatchItem>,
    /// Files the service rejected before parsing (bad type, unreadable).
    #[serde(default)]
    pub errors: Option<Vec<BatchError>>,
    #[serde(default)]
    pub parsed_at: Option<String>,
}

/// One per-file outcome inside a batch response.
#[derive(Debug, Deserialize)]
pub struct BatchItem {
    pub filename: String,
    #[serde(default)]
    pub data: Option<StatementFields>,
    pub status: RecordStatus,
}

/// A rejected file reported alongside the batch results.
#[derive(Debug, Deserialize)]
pub struct BatchError {
    pub filename: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `GET /api/issuers`.
#[derive(Debug, Deserialize)]
pub struct IssuersResponse {
    pub supported_issuers: Vec<String>,
}

/// Body of `GET /health`.
#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Non-2xx error payload.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Build a [`ClientError::Service`] from a non-2xx status and raw body,
/// using the service's message when one is present.
fn service_error(status: u16, body: &str, fallback: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| fallback.to_string());

    ClientError::Service { status, message }
}

/// Client for the remote extraction service.
pub struct ExtractionClient {
    http: reqwest::Client,
    base_url: String,
    timeout_seconds: u64,
}

impl ExtractionClient {
    /// Create a client with a mandatory request timeout.
    pub fn new(base_url: String, timeout_seconds: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url,
            timeout_seconds,
        }
    }

    /// Submit one file to `POST /api/parse`.
    ///
    /// An optional issuer hint narrows the service's pattern matching.
    pub async fn parse_single(
        &self,
        path: &Path,
        issuer_hint: Option<&str>,
    ) -> Result<ParseResponse> {
        let url = format!("{}/api/parse", self.base_url);
        let filename = display_name(path);
        info!("Submitting {} to {}", filename, url);

        let mut form = Form::new().part("file", self.pdf_part(path).await?);
        if let Some(issuer) = issuer_hint {
            form = form.text("issuer", issuer.to_string());
        }

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(service_error(status, &body, FALLBACK_SINGLE_MESSAGE));
        }

        response.json().await.map_err(ClientError::Decode)
    }

    /// Submit two or more files to `POST /api/batch-parse` as a single
    /// multipart request with a repeated `files` field.
    pub async fn parse_batch(&self, paths: &[impl AsRef<Path>]) -> Result<BatchParseResponse> {
        let url = format!("{}/api/batch-parse", self.base_url);
        info!("Submitting {} files to {}", paths.len(), url);

        let mut form = Form::new();
        for path in paths {
            form = form.part("files", self.pdf_part(path.as_ref()).await?);
        }

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(service_error(status, &body, FALLBACK_BATCH_MESSAGE));
        }

        response.json().await.map_err(ClientError::Decode)
    }

    /// Fetch the issuer list from `GET /api/issuers`.
    pub async fn supported_issuers(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/issuers", self.base_url);
        debug!("Fetching issuer list from {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(service_error(status, &body, "Failed to list issuers"));
        }

        let body: IssuersResponse = response.json().await.map_err(ClientError::Decode)?;
        Ok(body.supported_issuers)
    }

    /// Probe `GET /health`.
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = format!("{}/health", self.base_url);
        debug!("Probing {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(service_error(status, &body, "Service is unhealthy"));
        }

        response.json().await.map_err(ClientError::Decode)
    }

    async fn pdf_part(&self, path: &Path) -> Result<Part> {
        let bytes = tokio::fs::read(path).await.map_err(|e| ClientError::File {
            path: path.display().to_string(),
            source: e,
        })?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());

        Part::bytes(bytes)
            .file_name(display_name(path))
            .mime_str("application/pdf")
            .map_err(ClientError::Http)
    }

    fn map_send_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout(self.timeout_seconds)
        } else if e.is_connect() {
            ClientError::Connect(self.base_url.clone())
        } else {
            ClientError::Http(e)
        }
    }
}

/// Filename component of a path, as sent to the service.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
