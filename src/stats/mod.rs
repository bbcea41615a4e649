//! Aggregate statistics over intake records.
//!
//! Pure, deterministic functions from the current record collection to a
//! summary value. No hidden state and no I/O; the result store calls
//! [`compute`] after every mutation.

use crate::models::{StatementRecord, Stats};
use std::collections::HashMap;

/// Compute summary statistics for the given records.
///
/// An empty slice yields the vacuous defaults: a success rate of 100 and
/// an average confidence of 0.
pub fn compute(records: &[StatementRecord]) -> Stats {
    let total = records.len();
    if total == 0 {
        return Stats::default();
    }

    let successes = records.iter().filter(|r| r.is_success()).count();
    let success_rate = ((successes as f64 / total as f64) * 100.0).round() as u32;

    let weight_sum: u32 = records.iter().map(|r| r.confidence_weight()).sum();
    let avg = weight_sum as f64 / total as f64;
    let avg_confidence = if avg.is_finite() { avg.round() as u32 } else { 0 };

    Stats {
        total_parsed: total,
        success_rate,
        avg_confidence,
    }
}

/// Count successful records per detected card issuer.
///
/// Records without an issuer field are grouped under `"Unknown"`.
pub fn issuer_distribution(records: &[StatementRecord]) -> HashMap<String, usize> {
    let mut dist: HashMap<String, usize> = HashMap::new();

    for record in records.iter().filter(|r| r.is_success()) {
        let issuer = record
            .data
            .as_ref()
            .and_then(|d| d.card_issuer.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        *dist.entry(issuer).or_default() += 1;
    }

    dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confidence, RecordDraft, StatementFields};

    fn success_record(id: u64, confidence: Option<Confidence>) -> StatementRecord {
        let fields = StatementFields {
            card_issuer: Some("Chase".to_string()),
            extraction_confidence: confidence,
            ..Default::default()
        };
        StatementRecord::from_draft(
            id,
            RecordDraft::success(format!("stmt_{id}.pdf"), fields, "T1".to_string()),
        )
    }

    fn error_record(id: u64) -> StatementRecord {
        StatementRecord::from_draft(
            id,
            RecordDraft::failure(format!("stmt_{id}.pdf"), "T1".to_string()),
        )
    }

    #[test]
    fn test_empty_defaults() {
        let stats = compute(&[]);
        assert_eq!(stats, Stats::default());
    }

    #[test]
    fn test_total_matches_record_count() {
        let records = vec![success_record(1, Some(Confidence::High)), error_record(2)];
        assert_eq!(compute(&records).total_parsed, 2);
    }

    #[test]
    fn test_single_high_confidence_success() {
        let records = vec![success_record(1, Some(Confidence::High))];
        let stats = compute(&records);
        assert_eq!(stats.total_parsed, 1);
        assert_eq!(stats.success_rate, 100);
        assert_eq!(stats.avg_confidence, 100);
    }

    #[test]
    fn test_mixed_batch_rounding() {
        // Two successes (high, low) and one error: 2/3 -> 67,
        // (100 + 30 + 0) / 3 -> 43.
        let records = vec![
            success_record(1, Some(Confidence::High)),
            success_record(2, Some(Confidence::Low)),
            error_record(3),
        ];
        let stats = compute(&records);
        assert_eq!(stats.success_rate, 67);
        assert_eq!(stats.avg_confidence, 43);
    }

    #[test]
    fn test_absent_confidence_counts_as_zero() {
        let records = vec![
            success_record(1, Some(Confidence::Medium)),
            success_record(2, None),
        ];
        let stats = compute(&records);
        assert_eq!(stats.success_rate, 100);
        assert_eq!(stats.avg_confidence, 33); // (65 + 0) / 2 rounded
    }

    #[test]
    fn test_all_errors() {
        let records = vec![error_record(1), error_record(2)];
        let stats = compute(&records);
        assert_eq!(stats.success_rate, 0);
        assert_eq!(stats.avg_confidence, 0);
    }

    #[test]
    fn test_issuer_distribution_skips_failures() {
        let records = vec![
            success_record(1, Some(Confidence::High)),
            success_record(2, None),
            error_record(3),
        ];
        let dist = issuer_distribution(&records);
        assert_eq!(dist.get("Chase"), Some(&2));
        assert_eq!(dist.len(), 1);
    }
}
