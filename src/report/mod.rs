//! Report rendering for intake results.
//!
//! This module renders the current record collection and its statistics
//! as a console table, a Markdown document, or JSON. Fields the service
//! could not extract are shown as the configured placeholder, never
//! omitted with an error.

use crate::config::ReportConfig;
use crate::models::{StatementFields, StatementRecord, Stats};
use crate::stats::issuer_distribution;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(
    records: &[StatementRecord],
    stats: Stats,
    config: &ReportConfig,
) -> String {
    let mut output = String::new();

    output.push_str("# Statement Intake Report\n\n");
    output.push_str(&format!(
        "Generated: {}\n\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output.push_str(&generate_summary_section(stats));

    if config.issuer_summary {
        output.push_str(&generate_issuer_section(records));
    }

    output.push_str(&generate_results_section(records, &config.placeholder));

    output
}

/// Generate the summary section (the stat cards).
fn generate_summary_section(stats: Stats) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str(&format!(
        "- **Statements Processed:** {}\n",
        stats.total_parsed
    ));
    section.push_str(&format!("- **Success Rate:** {}%\n", stats.success_rate));
    section.push_str(&format!(
        "- **Avg Confidence:** {}%\n",
        stats.avg_confidence
    ));
    section.push('\n');

    section
}

/// Generate the per-issuer breakdown.
fn generate_issuer_section(records: &[StatementRecord]) -> String {
    let dist = issuer_distribution(records);
    if dist.is_empty() {
        return String::new();
    }

    let mut issuers: Vec<_> = dist.into_iter().collect();
    issuers.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut section = String::new();
    section.push_str("## Issuers\n\n");
    for (issuer, count) in issuers {
        section.push_str(&format!("- {}: {}\n", issuer, count));
    }
    section.push('\n');

    section
}

/// Generate one subsection per record, newest first.
fn generate_results_section(records: &[StatementRecord], placeholder: &str) -> String {
    let mut section = String::new();

    section.push_str("## Results\n\n");

    if records.is_empty() {
        section.push_str("No statements parsed yet.\n");
        return section;
    }

    for record in records {
        section.push_str(&format!("### {}\n\n", record.filename));
        section.push_str(&format!("- **Status:** {}\n", record.status));
        section.push_str(&format!("- **Parsed At:** {}\n", record.parsed_at));

        match &record.data {
            Some(data) => {
                section.push('\n');
                section.push_str("| Field | Value |\n");
                section.push_str("|-------|-------|\n");
                for (label, value) in field_rows(data) {
                    section.push_str(&format!(
                        "| {} | {} |\n",
                        label,
                        value.unwrap_or(placeholder)
                    ));
                }
            }
            None => {
                section.push_str("- **Detail:** extraction failed, no data returned\n");
            }
        }
        section.push('\n');
    }

    section
}

/// Render a console summary of the records and statistics.
pub fn render_table(
    records: &[StatementRecord],
    stats: Stats,
    config: &ReportConfig,
) -> String {
    let mut lines = Vec::new();

    for record in records {
        if let Some(data) = &record.data {
            let issuer = data
                .card_issuer
                .as_deref()
                .unwrap_or(config.placeholder.as_str());
            let last4 = data
                .card_last_4_digits
                .as_deref()
                .unwrap_or(config.placeholder.as_str());
            let balance = data
                .total_balance
                .as_deref()
                .unwrap_or(config.placeholder.as_str());
            let confidence = data
                .extraction_confidence
                .map(|c| c.to_string())
                .unwrap_or_else(|| config.placeholder.clone());

            lines.push(format!(
                "  ✅ {} — {} •••• {} | balance {} | {} confidence",
                record.filename, issuer, last4, balance, confidence
            ));
        } else {
            lines.push(format!("  ❌ {} — extraction failed", record.filename));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "  📊 {} parsed | success rate {}% | avg confidence {}%",
        stats.total_parsed, stats.success_rate, stats.avg_confidence
    ));

    lines.join("\n")
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    stats: Stats,
    results: &'a [StatementRecord],
}

/// Generate the report as pretty-printed JSON.
pub fn generate_json_report(records: &[StatementRecord], stats: Stats) -> Result<String> {
    let report = JsonReport {
        generated_at: Utc::now().to_rfc3339(),
        stats,
        results: records,
    };

    serde_json::to_string_pretty(&report).context("Failed to serialize report")
}

/// Write report content to a file.
pub fn write_report(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

/// Labeled field values in presentation order.
fn field_rows(data: &StatementFields) -> Vec<(&'static str, Option<&str>)> {
    vec![
        ("Card Issuer", data.card_issuer.as_deref()),
        ("Card Number", data.card_last_4_digits.as_deref()),
        ("Account Holder", data.account_holder.as_deref()),
        ("Statement Date", data.statement_date.as_deref()),
        ("Payment Due Date", data.payment_due_date.as_deref()),
        ("Total Balance", data.total_balance.as_deref()),
        ("Minimum Payment", data.minimum_payment.as_deref()),
        ("Credit Limit", data.credit_limit.as_deref()),
        ("Available Credit", data.available_credit.as_deref()),
        ("Billing Cycle", data.billing_cycle.as_deref()),
    ]
}
