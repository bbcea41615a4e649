//! Data models for the statement intake client.
//!
//! This module contains the core data structures shared across the
//! application: extracted statement fields, intake records, and the
//! derived summary statistics.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Extraction-quality label reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Most expected fields were found in the document.
    High,
    /// Roughly half of the expected fields were found.
    Medium,
    /// Few fields were found; values are likely unreliable.
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}

impl Confidence {
    /// Numeric weight used when averaging confidence across records.
    pub fn weight(&self) -> u32 {
        match self {
            Confidence::High => 100,
            Confidence::Medium => 65,
            Confidence::Low => 30,
        }
    }
}

/// Outcome status of a single record.
///
/// Batch responses tag each file independently, so an overall 2xx call
/// can still carry `error` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Success,
    Error,
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordStatus::Success => write!(f, "success"),
            RecordStatus::Error => write!(f, "error"),
        }
    }
}

/// Named fields extracted from one statement.
///
/// Every field is optional; the service omits what it could not find and
/// the report layer substitutes a placeholder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_last_4_digits: Option<String>,
    /// Unknown labels from the service are treated as absent rather than
    /// failing deserialization.
    #[serde(
        default,
        deserialize_with = "confidence_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub extraction_confidence: Option<Confidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_balance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_payment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_credit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_cycle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_holder: Option<String>,
}

fn confidence_or_none<'de, D>(deserializer: D) -> Result<Option<Confidence>, D::Error>
where
    D: Deserializer<'de>,
{
    let label: Option<String> = Option::deserialize(deserializer)?;
    Ok(label.and_then(|s| match s.to_lowercase().as_str() {
        "high" => Some(Confidence::High),
        "medium" => Some(Confidence::Medium),
        "low" => Some(Confidence::Low),
        _ => None,
    }))
}

/// A record as produced by the intake controller, before the store has
/// assigned it an identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDraft {
    /// Original document name.
    pub filename: String,
    /// Extracted fields; present only on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<StatementFields>,
    /// Per-file outcome.
    pub status: RecordStatus,
    /// Timestamp reported by the service, or a local RFC 3339 fallback.
    pub parsed_at: String,
}

impl RecordDraft {
    /// Creates a successful draft carrying extracted fields.
    pub fn success(filename: String, data: StatementFields, parsed_at: String) -> Self {
        Self {
            filename,
            data: Some(data),
            status: RecordStatus::Success,
            parsed_at,
        }
    }

    /// Creates a failed draft with no field data.
    pub fn failure(filename: String, parsed_at: String) -> Self {
        Self {
            filename,
            data: None,
            status: RecordStatus::Error,
            parsed_at,
        }
    }
}

/// One processed-or-failed statement, as held by the result store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementRecord {
    /// Store-assigned identifier, unique within the store.
    pub id: u64,
    /// Original document name.
    pub filename: String,
    /// Extracted fields; present only on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<StatementFields>,
    /// Per-file outcome.
    pub status: RecordStatus,
    /// Timestamp reported by the service, or a local RFC 3339 fallback.
    pub parsed_at: String,
}

impl StatementRecord {
    /// Builds a record from a draft and a store-assigned id.
    pub fn from_draft(id: u64, draft: RecordDraft) -> Self {
        Self {
            id,
            filename: draft.filename,
            data: draft.data,
            status: draft.status,
            parsed_at: draft.parsed_at,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RecordStatus::Success
    }

    /// Confidence weight this record contributes to the average.
    ///
    /// Failed records and records with no confidence label contribute 0.
    pub fn confidence_weight(&self) -> u32 {
        self.data
            .as_ref()
            .and_then(|d| d.extraction_confidence)
            .map(|c| c.weight())
            .unwrap_or(0)
    }
}

/// Derived summary over the current record collection.
///
/// Never mutated directly; always recomputed from the store contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Number of records in the store.
    pub total_parsed: usize,
    /// Percentage of records with success status, rounded.
    ///
    /// 100 for an empty store (vacuous-success convention).
    pub success_rate: u32,
    /// Rounded mean of per-record confidence weights; 0 for an empty store.
    pub avg_confidence: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            total_parsed: 0,
            success_rate: 100,
            avg_confidence: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_weights() {
        assert_eq!(Confidence::High.weight(), 100);
        assert_eq!(Confidence::Medium.weight(), 65);
        assert_eq!(Confidence::Low.weight(), 30);
    }

    #[test]
    fn test_confidence_deserializes_lowercase() {
        let fields: StatementFields =
            serde_json::from_str(r#"{"extraction_confidence": "high"}"#).unwrap();
        assert_eq!(fields.extraction_confidence, Some(Confidence::High));
    }

    #[test]
    fn test_unknown_confidence_is_absent() {
        let fields: StatementFields =
            serde_json::from_str(r#"{"extraction_confidence": "certain"}"#).unwrap();
        assert_eq!(fields.extraction_confidence, None);
    }

    #[test]
    fn test_fields_all_optional() {
        let fields: StatementFields = serde_json::from_str("{}").unwrap();
        assert_eq!(fields, StatementFields::default());
    }

    #[test]
    fn test_record_status_wire_format() {
        assert_eq!(
            serde_json::from_str::<RecordStatus>(r#""success""#).unwrap(),
            RecordStatus::Success
        );
        assert_eq!(
            serde_json::from_str::<RecordStatus>(r#""error""#).unwrap(),
            RecordStatus::Error
        );
    }

    #[test]
    fn test_failed_record_contributes_zero() {
        let record = StatementRecord::from_draft(
            1,
            RecordDraft::failure("a.pdf".to_string(), "T1".to_string()),
        );
        assert_eq!(record.confidence_weight(), 0);
        assert!(!record.is_success());
    }

    #[test]
    fn test_stats_empty_defaults() {
        let stats = Stats::default();
        assert_eq!(stats.total_parsed, 0);
        assert_eq!(stats.success_rate, 100);
        assert_eq!(stats.avg_confidence, 0);
    }
}
