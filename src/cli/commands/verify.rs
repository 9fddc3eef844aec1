//! Verify command implementation
//!
//! Compares an anonymized file with its original and reports surviving
//! sensitive tags.

use crate::adapters::{DicomFileCodec, RecordCodec};
use crate::core::verification::Verifier;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the verify command
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Original DICOM file
    pub original: PathBuf,

    /// Anonymized DICOM file
    pub anonymized: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl VerifyArgs {
    /// Execute the verify command
    ///
    /// `placeholder` is the replacement literal of the active configuration.
    pub async fn execute(&self, placeholder: &str) -> anyhow::Result<i32> {
        tracing::info!(
            original = %self.original.display(),
            anonymized = %self.anonymized.display(),
            "Verifying anonymized file"
        );

        let codec = DicomFileCodec::new();
        let records = codec
            .load(&self.original)
            .and_then(|original| Ok((original, codec.load(&self.anonymized)?)));
        let (original, anonymized) = match records {
            Ok(records) => records,
            Err(e) => {
                println!("❌ {e}");
                return Ok(1);
            }
        };

        let report = Verifier::new()
            .with_placeholder(placeholder)
            .verify(&original, &anonymized);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print!("{}", report.format_summary());
        }

        Ok(if report.is_clean() { 0 } else { 1 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_fails() {
        let args = VerifyArgs {
            original: PathBuf::from("/nonexistent/original.dcm"),
            anonymized: PathBuf::from("/nonexistent/anonymized.dcm"),
            json: false,
        };
        assert_eq!(args.execute("ANONYMIZED").await.unwrap(), 1);
    }
}
