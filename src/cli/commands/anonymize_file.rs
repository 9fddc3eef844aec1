//! Anonymize-file command implementation
//!
//! Runs the engine on one file and writes the result to an explicit path.

use super::anonymize::build_rules;
use crate::adapters::{DicomFileCodec, RecordCodec};
use crate::anonymization::RuleOption;
use crate::config::AppConfig;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the anonymize-file command
#[derive(Args, Debug)]
pub struct AnonymizeFileArgs {
    /// DICOM file to anonymize
    pub input: PathBuf,

    /// Where to write the anonymized file
    pub output: PathBuf,

    /// Turn off a rule option for this run (repeatable)
    #[arg(long, value_enum, value_name = "OPTION")]
    pub disable: Vec<RuleOption>,

    /// Overwrite the output file if it exists
    #[arg(long)]
    pub force: bool,
}

impl AnonymizeFileArgs {
    /// Execute the anonymize-file command
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<i32> {
        tracing::info!(input = %self.input.display(), "Anonymizing single file");

        let (rules, engine) = match build_rules(&config.anonymization, &self.disable) {
            Ok(built) => built,
            Err(e) => {
                eprintln!("Configuration validation failed: {e:#}");
                return Ok(2);
            }
        };

        if self.output.exists() && !self.force {
            println!("❌ Output file already exists: {}", self.output.display());
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        if std::fs::canonicalize(&self.input).ok() == std::fs::canonicalize(&self.output).ok()
            && self.output.exists()
        {
            println!("❌ Output file must differ from the input file");
            return Ok(2);
        }

        let codec = DicomFileCodec::new();

        let mut record = match codec.load(&self.input) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load file");
                println!("❌ {e}");
                return Ok(1);
            }
        };
        let before = record.len();

        let outcome = match engine.apply(&mut record, &rules) {
            Ok(outcome) => outcome,
            Err(e) => {
                println!("❌ {}: {e}", self.input.display());
                return Ok(1);
            }
        };

        if let Some(parent) = self.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        if let Err(e) = codec.save(&record, &self.output) {
            println!("❌ {e}");
            return Ok(1);
        }

        println!("✅ Anonymized {}", self.input.display());
        println!("  Output: {}", self.output.display());
        println!("  Tags removed: {}", before.saturating_sub(record.len()));
        println!("  Attributes changed: {}", outcome.mutated);
        println!("  Private tags removed: {}", outcome.private_removed);
        println!("  UIDs regenerated: {}", outcome.uids_regenerated);

        Ok(0)
    }
}
