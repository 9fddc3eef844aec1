//! Anonymize command implementation
//!
//! This module implements the `anonymize` command, which runs the batch
//! pipeline over a directory tree and prints progress while it runs.

use crate::adapters::DicomFileCodec;
use crate::anonymization::{uid, AnonymizationConfig, AnonymizationEngine, RuleOption, RuleSet};
use crate::config::AppConfig;
use crate::core::batch::{BatchEvent, BatchJob, BatchPipeline, ChannelObserver};
use crate::domain::BatchError;
use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the anonymize command
#[derive(Args, Debug)]
pub struct AnonymizeArgs {
    /// Directory containing the DICOM files to anonymize
    pub input: PathBuf,

    /// Directory receiving the anonymized tree (must not overlap the input)
    pub output: PathBuf,

    /// Turn off a rule option for this run (repeatable)
    #[arg(long, value_enum, value_name = "OPTION")]
    pub disable: Vec<RuleOption>,

    /// Write the batch statistics as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Do not print per-file progress
    #[arg(short, long)]
    pub quiet: bool,
}

/// Rule set and engine for one invocation
///
/// `disable` switches options off on top of the configured ones.
pub(crate) fn build_rules(
    config: &AnonymizationConfig,
    disable: &[RuleOption],
) -> anyhow::Result<(RuleSet, AnonymizationEngine)> {
    let mut config = config.clone();
    for option in disable {
        tracing::info!(option = option.key(), "Disabling rule option from CLI");
        config.set_option(*option, false);
    }
    config.validate()?;

    let rules = RuleSet::from_config(&config)?;
    let generator = uid::generator_for(config.uid_root.as_deref())?;
    Ok((rules, AnonymizationEngine::with_uid_generator(generator)))
}

/// Exit code for a run that ended without statistics
/// Progress output is best effort; the worker keeps running regardless
fn flush_stderr() {
    if let Err(e) = std::io::stderr().flush() {
        tracing::debug!(error = %e, "Failed to flush progress output");
    }
}

pub fn exit_code_for(error: &BatchError) -> i32 {
    match error {
        BatchError::Configuration(_) => 2,
        BatchError::NoRecordsFound(_) => 3,
        BatchError::Cancelled { .. } => 130,
        BatchError::Discovery { .. } | BatchError::Fatal(_) => 5,
    }
}

impl AnonymizeArgs {
    /// Execute the anonymize command
    pub async fn execute(
        &self,
        config: &AppConfig,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting anonymize command");

        let (rules, engine) = match build_rules(&config.anonymization, &self.disable) {
            Ok(built) => built,
            Err(e) => {
                tracing::error!(error = %e, "Invalid anonymization rules");
                eprintln!("Configuration validation failed: {e:#}");
                return Ok(2);
            }
        };

        let pipeline = Arc::new(
            BatchPipeline::new(
                Arc::new(DicomFileCodec::new()),
                engine,
                Arc::new(rules),
                config.batch.clone(),
            )
            .with_shutdown_signal(shutdown_signal),
        );

        let job = BatchJob::new(&self.input, &self.output);
        let (observer, mut events) = ChannelObserver::new();

        println!("🚀 Anonymizing {} → {}", self.input.display(), self.output.display());
        println!();

        let handle = pipeline.spawn(job, Arc::new(observer));

        while let Some(event) = events.recv().await {
            match event {
                BatchEvent::Progress(percent) if !self.quiet => {
                    eprint!("\r[{percent:>3}%] ");
                    flush_stderr();
                }
                BatchEvent::Status(status) if !self.quiet => {
                    eprint!("{status}\x1b[K");
                    flush_stderr();
                }
                BatchEvent::Finished(_) => break,
                _ => {}
            }
        }
        if !self.quiet {
            eprintln!();
        }

        let stats = match handle.await {
            Ok(Ok(stats)) => stats,
            Ok(Err(e)) => {
                eprintln!("❌ {e}");
                return Ok(exit_code_for(&e));
            }
            Err(e) => {
                tracing::error!(error = %e, "Batch worker panicked");
                eprintln!("Batch worker failed: {e}");
                return Ok(5);
            }
        };

        println!();
        print!("{}", stats.format_summary());
        println!();

        if let Some(ref path) = self.report {
            stats.write_json(path)?;
            println!("📝 Report written to {}", path.display());
        }

        if stats.is_successful() {
            println!("✅ Anonymization completed successfully!");
            Ok(0)
        } else {
            println!("⚠️  Anonymization completed with failures");
            Ok(1)
        }
    }
}
