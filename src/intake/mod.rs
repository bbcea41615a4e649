//! Intake orchestration.
//!
//! The controller owns the pending file selection and the result store,
//! picks the submission strategy by file count (one file goes to
//! `/api/parse`, two or more to `/api/batch-parse`), maps service
//! responses into record drafts, and hands them to the store. On any
//! failed call the store is left untouched; the error carries the
//! service's message for display.

use crate::client::{BatchParseResponse, ClientError, ExtractionClient, ParseResponse};
use crate::models::RecordDraft;
use crate::store::ResultStore;
use chrono::Utc;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("No files selected")]
    EmptySelection,

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Orchestrates submissions against the extraction service.
pub struct IntakeController {
    client: ExtractionClient,
    store: ResultStore,
    pending: Vec<PathBuf>,
    issuer_hint: Option<String>,
    in_flight: bool,
}

impl IntakeController {
    pub fn new(client: ExtractionClient, issuer_hint: Option<String>) -> Self {
        Self {
            client,
            store: ResultStore::new(),
            pending: Vec::new(),
            issuer_hint,
            in_flight: false,
        }
    }

    /// Replace the pending selection. The caller has already filtered the
    /// paths to acceptable file types.
    pub fn select(&mut self, files: Vec<PathBuf>) {
        self.pending = files;
    }

    pub fn pending(&self) -> &[PathBuf] {
        &self.pending
    }

    /// Advisory flag for the presentation layer; true while a submission
    /// is outstanding. Not a lock.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Mutable store access for the user-initiated remove and clear intents.
    pub fn store_mut(&mut self) -> &mut ResultStore {
        &mut self.store
    }

    /// Submit the pending selection and prepend the resulting records.
    ///
    /// Returns the number of records added. The pending selection is
    /// cleared on every completion path, success or failure, so the next
    /// selection starts fresh. A failed call adds no records.
    pub async fn submit(&mut self) -> Result<usize, IntakeError> {
        let files = std::mem::take(&mut self.pending);
        if files.is_empty() {
            return Err(IntakeError::EmptySelection);
        }

        self.in_flight = true;
        let outcome = self.exchange(&files).await;
        self.in_flight = false;

        let drafts = outcome?;
        let added = drafts.len();
        self.store.add(drafts);
        info!("Submission complete: {} records added", added);
        Ok(added)
    }

    async fn exchange(&self, files: &[PathBuf]) -> Result<Vec<RecordDraft>, IntakeError> {
        if files.len() == 1 {
            let path = &files[0];
            let filename = crate::client::display_name(path);
            let response = self
                .client
                .parse_single(path, self.issuer_hint.as_deref())
                .await?;
            Ok(vec![draft_from_single(filename, response)])
        } else {
            let response = self.client.parse_batch(files).await?;
            Ok(drafts_from_batch(response))
        }
    }
}

/// Map a single-file success response into one success draft.
///
/// The service's `parsed_at` is preferred; a local timestamp fills in when
/// it is absent.
pub fn draft_from_single(filename: String, response: ParseResponse) -> RecordDraft {
    let parsed_at = response.parsed_at.unwrap_or_else(local_timestamp);
    RecordDraft::success(filename, response.data, parsed_at)
}

/// Map a batch response into drafts, preserving the service's order,
/// filenames, and per-file statuses.
///
/// Files the service rejected before parsing (reported in `errors`) become
/// error drafts appended after the parsed results.
pub fn drafts_from_batch(response: BatchParseResponse) -> Vec<RecordDraft> {
    let parsed_at = response.parsed_at.unwrap_or_else(local_timestamp);

    let mut drafts: Vec<RecordDraft> = response
        .results
        .into_iter()
        .map(|item| RecordDraft {
            filename: item.filename,
            data: item.data,
            status: item.status,
            parsed_at: parsed_at.clone(),
        })
        .collect();

    if let Some(rejected) = response.errors {
        for item in rejected {
            warn!(
                "Service rejected {}: {}",
                item.filename,
                item.error.as_deref().unwrap_or("no detail")
            );
            drafts.push(RecordDraft::failure(item.filename, parsed_at.clone()));
        }
    }

    drafts
}

fn local_timestamp() -> String {
    Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confidence, RecordStatus};

    fn parse_response(json: &str) -> ParseResponse {
        serde_json::from_str(json).unwrap()
    }

    fn batch_response(json: &str) -> BatchParseResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_single_success_maps_to_one_record() {
        let response = parse_response(
            r#"{"data": {"extraction_confidence": "high"}, "parsed_at": "T1"}"#,
        );
        let draft = draft_from_single("stmt.pdf".to_string(), response);

        assert_eq!(draft.filename, "stmt.pdf");
        assert_eq!(draft.status, RecordStatus::Success);
        assert_eq!(draft.parsed_at, "T1");
        assert_eq!(
            draft.data.unwrap().extraction_confidence,
            Some(Confidence::High)
        );
    }

    #[test]
    fn test_single_without_timestamp_gets_local_fallback() {
        let response = parse_response(r#"{"data": {}}"#);
        let draft = draft_from_single("stmt.pdf".to_string(), response);
        assert!(!draft.parsed_at.is_empty());
    }

    #[test]
    fn test_batch_preserves_order_and_statuses() {
        let response = batch_response(
            r#"{
                "results": [
                    {"filename": "a.pdf", "data": {"extraction_confidence": "high"}, "status": "success"},
                    {"filename": "b.pdf", "data": {"extraction_confidence": "low"}, "status": "success"},
                    {"filename": "c.pdf", "data": null, "status": "error"}
                ],
                "parsed_at": "T2"
            }"#,
        );
        let drafts = drafts_from_batch(response);

        assert_eq!(drafts.len(), 3);
        assert_eq!(drafts[0].filename, "a.pdf");
        assert_eq!(drafts[1].filename, "b.pdf");
        assert_eq!(drafts[2].filename, "c.pdf");
        assert_eq!(drafts[2].status, RecordStatus::Error);
        assert!(drafts[2].data.is_none());
        assert!(drafts.iter().all(|d| d.parsed_at == "T2"));
    }

    #[test]
    fn test_batch_rejected_files_become_error_drafts() {
        let response = batch_response(
            r#"{
                "results": [
                    {"filename": "a.pdf", "data": {}, "status": "success"}
                ],
                "errors": [{"filename": "b.txt", "error": "Invalid file type"}],
                "parsed_at": "T3"
            }"#,
        );
        let drafts = drafts_from_batch(response);

        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[1].filename, "b.txt");
        assert_eq!(drafts[1].status, RecordStatus::Error);
    }

    #[tokio::test]
    async fn test_submit_with_empty_selection_is_an_error() {
        let client = ExtractionClient::new("http://localhost:5000".to_string(), 5);
        let mut controller = IntakeController::new(client, None);

        let result = controller.submit().await;
        assert!(matches!(result, Err(IntakeError::EmptySelection)));
        assert!(controller.store().is_empty());
        assert!(!controller.is_in_flight());
    }

    #[tokio::test]
    async fn test_failed_call_leaves_store_unchanged() {
        use crate::models::Stats;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stmt.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        // Port 9 (discard) is not serving HTTP; the call fails at transport
        // level and must leave the store untouched and the selection clear.
        let client = ExtractionClient::new("http://127.0.0.1:9".to_string(), 2);
        let mut controller = IntakeController::new(client, None);
        controller.select(vec![path]);

        let result = controller.submit().await;
        assert!(matches!(result, Err(IntakeError::Client(_))));
        assert!(controller.store().is_empty());
        assert_eq!(controller.store().stats(), Stats::default());
        assert!(controller.pending().is_empty());
        assert!(!controller.is_in_flight());
    }

    #[test]
    fn test_select_replaces_pending() {
        let client = ExtractionClient::new("http://localhost:5000".to_string(), 5);
        let mut controller = IntakeController::new(client, None);

        controller.select(vec![PathBuf::from("a.pdf")]);
        controller.select(vec![PathBuf::from("b.pdf"), PathBuf::from("c.pdf")]);
        assert_eq!(controller.pending().len(), 2);
    }
}
