//! Batch statistics and reporting
//!
//! [`BatchStatistics`] is the only artifact a finished run hands to the
//! reporting layer. It is accumulated by the pipeline's single worker and is
//! never modified once the run completes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Errors listed in full by [`BatchStatistics::format_summary`]
pub const SUMMARY_ERROR_LIMIT: usize = 10;

/// A per-file failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    /// File path relative to the input root
    pub file: String,

    /// Underlying error message, verbatim
    pub message: String,
}

impl FileError {
    pub fn new(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file, self.message)
    }
}

/// Statistics of one batch run
///
/// `successful + failed == total` holds for every completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStatistics {
    /// Files found by discovery
    pub total: usize,

    /// Files anonymized and written
    pub successful: usize,

    /// Files that failed to load, anonymize or write
    pub failed: usize,

    /// Sum of `attributes_before - attributes_after` over successful files
    pub tags_removed_total: usize,

    /// Sum of engine mutation counts over successful files
    pub mutations_total: usize,

    /// Per-file failures in processing order
    pub errors: Vec<FileError>,

    /// When processing started
    pub started_at: DateTime<Utc>,

    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

impl BatchStatistics {
    /// Empty statistics for a run over `total` files
    pub fn new(total: usize) -> Self {
        Self {
            total,
            successful: 0,
            failed: 0,
            tags_removed_total: 0,
            mutations_total: 0,
            errors: Vec::new(),
            started_at: Utc::now(),
            duration_ms: 0,
        }
    }

    /// Record a file written successfully
    pub fn record_success(&mut self, tags_removed: usize, mutations: usize) {
        self.successful += 1;
        self.tags_removed_total += tags_removed;
        self.mutations_total += mutations;
    }

    /// Record a failed file
    pub fn record_failure(&mut self, error: FileError) {
        self.failed += 1;
        self.errors.push(error);
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Files attempted so far
    pub fn processed(&self) -> usize {
        self.successful + self.failed
    }

    /// Check if the run had no per-file failures
    pub fn is_successful(&self) -> bool {
        self.failed == 0
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.successful as f64 / self.total as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total = self.total,
            successful = self.successful,
            failed = self.failed,
            tags_removed = self.tags_removed_total,
            mutations = self.mutations_total,
            duration_ms = self.duration_ms,
            success_rate = format!("{:.2}%", self.success_rate()),
            "Batch completed"
        );

        if !self.errors.is_empty() {
            tracing::warn!(error_count = self.errors.len(), "Batch completed with errors");
        }
    }

    /// Format the statistics as a human-readable report
    ///
    /// Only the first [`SUMMARY_ERROR_LIMIT`] errors are listed.
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("📊 Batch Anonymization Report\n");
        summary.push_str(&format!("  Total files: {}\n", self.total));
        summary.push_str(&format!("  ✅ Successful: {}\n", self.successful));
        summary.push_str(&format!("  ❌ Failed: {}\n", self.failed));
        summary.push_str(&format!("  Tags removed: {}\n", self.tags_removed_total));
        summary.push_str(&format!("  Attributes changed: {}\n", self.mutations_total));
        summary.push_str(&format!("  Duration: {} ms\n", self.duration_ms));
        summary.push_str(&format!("  Success rate: {:.2}%\n", self.success_rate()));

        if !self.errors.is_empty() {
            summary.push_str("\n❌ Errors:\n");
            for error in self.errors.iter().take(SUMMARY_ERROR_LIMIT) {
                summary.push_str(&format!("  - {error}\n"));
            }
            if self.errors.len() > SUMMARY_ERROR_LIMIT {
                summary.push_str(&format!(
                    "  ... and {} more\n",
                    self.errors.len() - SUMMARY_ERROR_LIMIT
                ));
            }
        }

        summary
    }

    /// Write the statistics as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> crate::domain::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_statistics_creation() {
        let stats = BatchStatistics::new(4);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.processed(), 0);
        assert!(stats.errors.is_empty());
        assert!(stats.is_successful());
    }

    #[test]
    fn test_record_success_and_failure() {
        let mut stats = BatchStatistics::new(3);
        stats.record_success(5, 7);
        stats.record_success(2, 3);
        stats.record_failure(FileError::new("b/corrupt.dcm", "unexpected end of file"));

        assert_eq!(stats.successful, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.processed(), stats.total);
        assert_eq!(stats.tags_removed_total, 7);
        assert_eq!(stats.mutations_total, 10);
        assert!(!stats.is_successful());
        assert_eq!(
            stats.errors[0].to_string(),
            "b/corrupt.dcm: unexpected end of file"
        );
    }

    #[test]
    fn test_success_rate() {
        let mut stats = BatchStatistics::new(4);
        stats.record_success(0, 0);
        assert_eq!(stats.success_rate(), 25.0);

        assert_eq!(BatchStatistics::new(0).success_rate(), 100.0);
    }

    #[test]
    fn test_format_summary_truncates_errors() {
        let mut stats = BatchStatistics::new(12);
        for i in 0..12 {
            stats.record_failure(FileError::new(format!("f{i:02}.dcm"), "bad"));
        }

        let summary = stats.format_summary();
        assert!(summary.contains("f09.dcm: bad"));
        assert!(!summary.contains("f10.dcm"));
        assert!(summary.contains("... and 2 more"));
    }

    #[test]
    fn test_with_duration() {
        let stats = BatchStatistics::new(1).with_duration(Duration::from_millis(1500));
        assert_eq!(stats.duration_ms, 1500);
    }

    #[test]
    fn test_write_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports/run.json");
        let mut stats = BatchStatistics::new(1);
        stats.record_failure(FileError::new("a.dcm", "boom"));

        stats.write_json(&path).unwrap();

        let back: BatchStatistics =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, stats);
    }
}
