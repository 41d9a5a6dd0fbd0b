//! Aggregation and reporting over the accumulated result log
//!
//! Pure functions over [`BenchRecord`]s, no network access. Grouping
//! preserves first-seen model order; averages are computed only over the
//! successful subset of each model's records and omitted entirely when a
//! model has no successes.
//!
//! The durable artifact is a flat JSON array of redacted entries: full
//! response bodies are cut down to a 200-character preview so the file
//! stays reviewable even for long completions.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CotejarError, Result};
use crate::http_client::BenchRecord;

/// Number of characters kept in a response preview
pub const PREVIEW_CHARS: usize = 200;

/// A failed test listed for diagnostic display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedTest {
    /// Test case key
    pub test_name: String,
    /// Captured failure description
    pub error_message: String,
}

/// Per-model statistics over the result log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    /// Endpoint display name the statistics belong to
    pub model_name: String,
    /// Count of successful records
    pub successful: usize,
    /// Count of all records for this model
    pub total: usize,
    /// Mean response time over successes; absent when none succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_response_time: Option<f64>,
    /// Mean throughput over successes; absent when none succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_tokens_per_second: Option<f64>,
    /// Individual failures for diagnostic display
    pub failures: Vec<FailedTest>,
}

/// Group records by model and compute per-model statistics
///
/// Models appear in first-seen order. Averages cover only the successful
/// subset, so an all-failed model reports counts but no means.
#[must_use]
pub fn summarize(records: &[BenchRecord]) -> Vec<ModelSummary> {
    let mut summaries: Vec<ModelSummary> = Vec::new();
    let mut sums: Vec<(f64, f64)> = Vec::new();

    for record in records {
        let idx = match summaries
            .iter()
            .position(|s| s.model_name == record.model_name)
        {
            Some(idx) => idx,
            None => {
                summaries.push(ModelSummary {
                    model_name: record.model_name.clone(),
                    successful: 0,
                    total: 0,
                    avg_response_time: None,
                    avg_tokens_per_second: None,
                    failures: Vec::new(),
                });
                sums.push((0.0, 0.0));
                summaries.len() - 1
            }
        };

        let summary = &mut summaries[idx];
        summary.total += 1;
        if record.success {
            summary.successful += 1;
            sums[idx].0 += record.response_time;
            sums[idx].1 += record.tokens_per_second;
        } else {
            summary.failures.push(FailedTest {
                test_name: record.test_name.clone(),
                error_message: record.error_message.clone().unwrap_or_default(),
            });
        }
    }

    for (summary, (time_sum, tps_sum)) in summaries.iter_mut().zip(sums) {
        if summary.successful > 0 {
            let n = summary.successful as f64;
            summary.avg_response_time = Some(time_sum / n);
            summary.avg_tokens_per_second = Some(tps_sum / n);
        }
    }

    summaries
}

/// Print the console summary report
pub fn print_summary(summaries: &[ModelSummary]) {
    println!();
    println!("{}", "=".repeat(50));
    println!("BENCHMARK SUMMARY");
    println!("{}", "=".repeat(50));

    for summary in summaries {
        println!();
        println!("{}:", summary.model_name);
        println!(
            "  Successful tests: {}/{}",
            summary.successful, summary.total
        );

        if let Some(avg) = summary.avg_response_time {
            println!("  Average response time: {avg:.2}s");
        }
        if let Some(avg) = summary.avg_tokens_per_second {
            println!("  Average tokens/second: {avg:.1}");
        }

        if !summary.failures.is_empty() {
            println!("  Failed tests: {}", summary.failures.len());
            for failure in &summary.failures {
                println!("    - {}: {}", failure.test_name, failure.error_message);
            }
        }
    }
}

/// One redacted entry of the durable JSON artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactedRecord {
    /// Test case key
    pub test_name: String,
    /// Endpoint display name
    pub model_name: String,
    /// Wall-clock elapsed seconds
    pub response_time: f64,
    /// Estimated tokens generated
    pub tokens_generated: u64,
    /// Derived throughput
    pub tokens_per_second: f64,
    /// Whether the call succeeded
    pub success: bool,
    /// Failure description; null on success
    pub error_message: Option<String>,
    /// RFC 3339 record timestamp
    pub timestamp: String,
    /// First 200 characters of the response, "..."-marked when truncated
    pub response_preview: String,
}

impl From<&BenchRecord> for RedactedRecord {
    fn from(record: &BenchRecord) -> Self {
        Self {
            test_name: record.test_name.clone(),
            model_name: record.model_name.clone(),
            response_time: record.response_time,
            tokens_generated: record.tokens_generated,
            tokens_per_second: record.tokens_per_second,
            success: record.success,
            error_message: record.error_message.clone(),
            timestamp: record.timestamp.clone(),
            response_preview: preview(&record.response_text),
        }
    }
}

/// Truncate a response to its first [`PREVIEW_CHARS`] characters
///
/// Char-based, not byte-based: slicing at a fixed byte offset can split a
/// UTF-8 sequence, and model output is routinely non-ASCII.
fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        None => text.to_string(),
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
    }
}

/// The durable summary artifact: a flat ordered array of redacted entries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuiteReport {
    /// Redacted entries in result-log order
    pub entries: Vec<RedactedRecord>,
}

impl SuiteReport {
    /// Build the artifact from the result log, preserving log order
    #[must_use]
    pub fn from_records(records: &[BenchRecord]) -> Self {
        Self {
            entries: records.iter().map(RedactedRecord::from).collect(),
        }
    }

    /// Serialize to pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the artifact, replacing any previous file wholesale
    ///
    /// # Errors
    ///
    /// Returns [`CotejarError::SerializationError`] or
    /// [`CotejarError::IoError`].
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self
            .to_json()
            .map_err(|e| CotejarError::SerializationError(e.to_string()))?;
        fs::write(path, json).map_err(|e| CotejarError::IoError {
            message: format!("failed to write results to {}: {e}", path.display()),
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn record(model: &str, test: &str, time: f64, tokens: u64, success: bool) -> BenchRecord {
        BenchRecord {
            test_name: test.to_string(),
            model_name: model.to_string(),
            response_text: String::new(),
            response_time: time,
            tokens_generated: if success { tokens } else { 0 },
            tokens_per_second: if success && time > 0.0 {
                tokens as f64 / time
            } else {
                0.0
            },
            success,
            error_message: if success {
                None
            } else {
                Some("HTTP 500: server error".to_string())
            },
            timestamp: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    // =========================================================================
    // summarize
    // =========================================================================

    #[test]
    fn test_summarize_mixed_results() {
        let log = vec![
            record("Cerebras", "t1", 1.0, 100, true),
            record("Cerebras", "t2", 2.0, 200, true),
            record("Cerebras", "t3", 0.5, 0, false),
        ];
        let summaries = summarize(&log);

        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];
        assert_eq!(s.successful, 2);
        assert_eq!(s.total, 3);
        // 1.0s/100tok and 2.0s/200tok both run at 100 tok/s
        assert!((s.avg_response_time.unwrap() - 1.5).abs() < 1e-9);
        assert!((s.avg_tokens_per_second.unwrap() - 100.0).abs() < 1e-9);
        assert_eq!(s.failures.len(), 1);
        assert_eq!(s.failures[0].test_name, "t3");
        assert_eq!(s.failures[0].error_message, "HTTP 500: server error");
    }

    #[test]
    fn test_summarize_all_failed_omits_averages() {
        let log = vec![
            record("Broken", "t1", 0.1, 0, false),
            record("Broken", "t2", 0.2, 0, false),
        ];
        let summaries = summarize(&log);

        assert_eq!(summaries[0].successful, 0);
        assert_eq!(summaries[0].total, 2);
        assert!(summaries[0].avg_response_time.is_none());
        assert!(summaries[0].avg_tokens_per_second.is_none());
    }

    #[test]
    fn test_summarize_preserves_first_seen_order() {
        let log = vec![
            record("Beta", "t1", 1.0, 10, true),
            record("Alpha", "t1", 1.0, 10, true),
            record("Beta", "t2", 1.0, 10, true),
        ];
        let summaries = summarize(&log);
        let names: Vec<&str> = summaries.iter().map(|s| s.model_name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "Alpha"]);
        assert_eq!(summaries[0].total, 2);
    }

    #[test]
    fn test_summarize_empty_log() {
        assert!(summarize(&[]).is_empty());
    }

    #[test]
    fn test_summary_serialization_omits_absent_averages() {
        let summaries = summarize(&[record("Broken", "t1", 0.1, 0, false)]);
        let json = serde_json::to_string(&summaries).unwrap();
        assert!(!json.contains("avg_response_time"));
        assert!(!json.contains("avg_tokens_per_second"));
    }

    // =========================================================================
    // preview truncation
    // =========================================================================

    #[test]
    fn test_preview_truncates_long_response() {
        let text = "a".repeat(250);
        let p = preview(&text);
        assert_eq!(p.len(), 203);
        assert!(p.ends_with("..."));
        assert_eq!(&p[..200], &text[..200]);
    }

    #[test]
    fn test_preview_keeps_short_response() {
        let text = "b".repeat(150);
        assert_eq!(preview(&text), text);
    }

    #[test]
    fn test_preview_exact_boundary_unmodified() {
        let text = "c".repeat(200);
        assert_eq!(preview(&text), text);
    }

    #[test]
    fn test_preview_multibyte_safe() {
        let text = "é".repeat(250);
        let p = preview(&text);
        assert_eq!(p.chars().count(), 203);
        assert!(p.ends_with("..."));
    }

    proptest! {
        #[test]
        fn prop_preview_bounded(text in ".*") {
            let p = preview(&text);
            prop_assert!(p.chars().count() <= PREVIEW_CHARS + 3);
        }

        #[test]
        fn prop_preview_short_text_unmodified(text in ".{0,200}") {
            prop_assert_eq!(preview(&text), text);
        }
    }

    // =========================================================================
    // artifact
    // =========================================================================

    #[test]
    fn test_report_serializes_as_flat_array() {
        let report = SuiteReport::from_records(&[record("M", "t1", 1.0, 100, true)]);
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["test_name"], "t1");
        // failed/successful alike carry the error_message key (null here)
        assert!(value[0]["error_message"].is_null());
        assert!(value[0]["response_preview"].is_string());
    }

    #[test]
    fn test_report_redacts_response_text() {
        let mut rec = record("M", "t1", 1.0, 100, true);
        rec.response_text = "z".repeat(300);
        let report = SuiteReport::from_records(&[rec]);
        let json = report.to_json().unwrap();

        assert!(!json.contains(&"z".repeat(300)));
        assert_eq!(report.entries[0].response_preview.len(), 203);
    }

    #[test]
    fn test_report_is_pretty_printed() {
        let report = SuiteReport::from_records(&[record("M", "t1", 1.0, 100, true)]);
        assert!(report.to_json().unwrap().contains("\n  "));
    }

    #[test]
    fn test_save_overwrites_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");

        let first = SuiteReport::from_records(&[
            record("M", "t1", 1.0, 100, true),
            record("M", "t2", 1.0, 100, true),
        ]);
        first.save(&path).unwrap();

        let second = SuiteReport::from_records(&[record("M", "t3", 1.0, 100, true)]);
        second.save(&path).unwrap();

        let reloaded: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reloaded.as_array().unwrap().len(), 1);
        assert_eq!(reloaded[0]["test_name"], "t3");
    }

    #[test]
    fn test_save_unwritable_path_errors() {
        let report = SuiteReport::from_records(&[]);
        let err = report
            .save(Path::new("/nonexistent/dir/results.json"))
            .unwrap_err();
        assert!(matches!(err, CotejarError::IoError { .. }));
    }
}
