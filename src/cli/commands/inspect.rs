//! Inspect command implementation
//!
//! Prints a short summary of a DICOM file followed by its metadata table.

use crate::adapters::{DicomFileCodec, RecordCodec};
use crate::domain::{keywords, Record, TagId};
use clap::Args;
use std::path::PathBuf;

/// Tags shown in the file summary
pub const SUMMARY_TAGS: &[TagId] = &[
    keywords::PATIENT_NAME,
    keywords::PATIENT_ID,
    keywords::STUDY_DATE,
    keywords::MODALITY,
    keywords::ROWS,
    keywords::COLUMNS,
];

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// DICOM file to inspect
    pub file: PathBuf,

    /// Maximum number of attributes listed in the metadata table
    #[arg(long, default_value_t = 100)]
    pub limit: usize,

    /// Values longer than this many characters are truncated
    #[arg(long, default_value_t = 100)]
    pub max_value_len: usize,
}

impl InspectArgs {
    /// Execute the inspect command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(file = %self.file.display(), "Inspecting file");

        let record = match DicomFileCodec::new().load(&self.file) {
            Ok(record) => record,
            Err(e) => {
                println!("❌ {e}");
                return Ok(1);
            }
        };

        print!("{}", format_summary(&self.file, &record));
        println!();
        print!("{}", format_table(&record, self.limit, self.max_value_len));

        Ok(0)
    }
}

/// File name, tag count and the [`SUMMARY_TAGS`] values
pub fn format_summary(file: &std::path::Path, record: &Record) -> String {
    let mut summary = String::new();
    summary.push_str(&format!("📄 {}\n", file.display()));
    summary.push_str(&format!("  Total tags: {}\n", record.len()));
    for &tag in SUMMARY_TAGS {
        let value = record
            .get(tag)
            .map(|attr| attr.value.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        summary.push_str(&format!(
            "  {}: {}\n",
            tag.keyword().unwrap_or_default(),
            value
        ));
    }
    summary
}

/// Metadata table of at most `limit` attributes
pub fn format_table(record: &Record, limit: usize, max_value_len: usize) -> String {
    let mut table = String::new();
    table.push_str(&format!("{:<13} {:<32} {}\n", "Tag", "Name", "Value"));

    for attr in record.iter().take(limit) {
        let mut name = attr.display_name();
        if attr.private {
            name.push_str(" [private]");
        }
        table.push_str(&format!(
            "{:<13} {:<32} {}\n",
            attr.tag.to_string(),
            name,
            truncate(&attr.value.to_string(), max_value_len)
        ));
    }

    if record.len() > limit {
        table.push_str(&format!("... and {} more\n", record.len() - limit));
    }
    table
}

/// Cut `value` to `max` characters, marking the cut with `...`
pub fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(max).collect();
    cut.push_str("...");
    cut
}
