//! Batch pipeline - applies the engine to every record file under a tree
//!
//! A run moves through `Idle → Discovering → Processing → Completed`. Files are
//! processed strictly in discovery order by a single worker; a failure on one
//! file is recorded and the run moves on. Only bad paths, an empty input tree,
//! cancellation or an unexpected I/O failure outside a single file end the run
//! early, and those runs deliver no statistics.

use super::discovery::discover_records;
use super::observer::BatchObserver;
use super::statistics::{BatchStatistics, FileError};
use crate::adapters::RecordCodec;
use crate::anonymization::{AnonymizationEngine, RuleSet};
use crate::config::BatchConfig;
use crate::domain::errors::BatchError;
use crate::log_batch_processing;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Input and output roots of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
}

impl BatchJob {
    pub fn new(input_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
        }
    }

    /// Checks the roots before any processing
    ///
    /// The input must be an existing directory, and the output may not be the
    /// input, live inside it, or contain it.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Configuration`] describing the first problem found.
    pub fn validate(&self) -> Result<(), BatchError> {
        if !self.input_root.is_dir() {
            return Err(BatchError::Configuration(format!(
                "Input directory does not exist or is not a directory: {}",
                self.input_root.display()
            )));
        }

        if self.output_root.exists() && !self.output_root.is_dir() {
            return Err(BatchError::Configuration(format!(
                "Output path exists and is not a directory: {}",
                self.output_root.display()
            )));
        }

        let input = normalize(&self.input_root)?;
        let output = normalize(&self.output_root)?;

        if output == input {
            return Err(BatchError::Configuration(format!(
                "Output directory must differ from the input directory: {}",
                self.output_root.display()
            )));
        }
        if output.starts_with(&input) {
            return Err(BatchError::Configuration(format!(
                "Output directory {} must not be inside the input directory {}",
                self.output_root.display(),
                self.input_root.display()
            )));
        }
        if input.starts_with(&output) {
            return Err(BatchError::Configuration(format!(
                "Output directory {} must not contain the input directory {}",
                self.output_root.display(),
                self.input_root.display()
            )));
        }

        Ok(())
    }
}

/// Resolves `path` against its nearest existing ancestor
///
/// `.` and `..` are folded lexically first, then the longest existing prefix is
/// canonicalized so symlinks resolve, and the missing tail is appended.
fn normalize(path: &Path) -> Result<PathBuf, BatchError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| BatchError::Configuration(format!("Cannot resolve {}: {e}", path.display())))?
            .join(path)
    };

    let mut lexical = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::ParentDir => {
                lexical.pop();
            }
            Component::CurDir => {}
            other => lexical.push(other),
        }
    }

    let mut existing = lexical.as_path();
    let mut rest = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }

    let mut resolved = existing
        .canonicalize()
        .unwrap_or_else(|_| existing.to_path_buf());
    for name in rest.into_iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Discovering,
    Processing,
    Completed { success: bool },
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchState::Idle => write!(f, "idle"),
            BatchState::Discovering => write!(f, "discovering"),
            BatchState::Processing => write!(f, "processing"),
            BatchState::Completed { success: true } => write!(f, "completed"),
            BatchState::Completed { success: false } => write!(f, "failed"),
        }
    }
}

/// Per-file accounting of a successful write
struct FileOutcome {
    tags_removed: usize,
    mutations: usize,
}

/// Batch pipeline
///
/// Owns everything a run needs and shares nothing mutable, so one pipeline
/// can be reused for several sequential runs.
pub struct BatchPipeline {
    codec: Arc<dyn RecordCodec>,
    engine: AnonymizationEngine,
    rules: Arc<RuleSet>,
    config: BatchConfig,
    shutdown_signal: Option<watch::Receiver<bool>>,
}

impl BatchPipeline {
    /// Create a new batch pipeline
    pub fn new(
        codec: Arc<dyn RecordCodec>,
        engine: AnonymizationEngine,
        rules: Arc<RuleSet>,
        config: BatchConfig,
    ) -> Self {
        Self {
            codec,
            engine,
            rules,
            config,
            shutdown_signal: None,
        }
    }

    /// Honour a shutdown signal at file boundaries
    pub fn with_shutdown_signal(mut self, shutdown_signal: watch::Receiver<bool>) -> Self {
        self.shutdown_signal = Some(shutdown_signal);
        self
    }

    /// Run the batch on a blocking worker thread
    ///
    /// Notifications reach `observer` from that thread while the caller awaits
    /// the handle.
    pub fn spawn(
        self: Arc<Self>,
        job: BatchJob,
        observer: Arc<dyn BatchObserver>,
    ) -> JoinHandle<Result<BatchStatistics, BatchError>> {
        tokio::task::spawn_blocking(move || self.run(&job, observer.as_ref()))
    }

    /// Run the batch on the current thread
    ///
    /// `observer.on_finished` is called exactly once with the returned value.
    pub fn run(
        &self,
        job: &BatchJob,
        observer: &dyn BatchObserver,
    ) -> Result<BatchStatistics, BatchError> {
        let result = self.execute(job, observer);

        match &result {
            Ok(stats) => stats.log_summary(),
            Err(e) => tracing::error!(error = %e, "Batch run failed"),
        }

        observer.on_finished(&result);
        result
    }

    fn execute(
        &self,
        job: &BatchJob,
        observer: &dyn BatchObserver,
    ) -> Result<BatchStatistics, BatchError> {
        let start_time = Instant::now();
        let mut state = BatchState::Idle;

        tracing::info!(
            input = %job.input_root.display(),
            output = %job.output_root.display(),
            "Starting batch run"
        );

        transition(&mut state, BatchState::Discovering);
        if let Err(e) = job.validate() {
            transition(&mut state, BatchState::Completed { success: false });
            return Err(e);
        }

        let files = match discover_records(&job.input_root, &self.config) {
            Ok(files) if files.is_empty() => {
                transition(&mut state, BatchState::Completed { success: false });
                return Err(BatchError::NoRecordsFound(job.input_root.clone()));
            }
            Ok(files) => files,
            Err(e) => {
                transition(&mut state, BatchState::Completed { success: false });
                return Err(e);
            }
        };

        transition(&mut state, BatchState::Processing);
        let result = self.process_all(job, &files, observer);
        transition(
            &mut state,
            BatchState::Completed {
                success: result.is_ok(),
            },
        );

        result.map(|stats| stats.with_duration(start_time.elapsed()))
    }

    fn process_all(
        &self,
        job: &BatchJob,
        files: &[PathBuf],
        observer: &dyn BatchObserver,
    ) -> Result<BatchStatistics, BatchError> {
        std::fs::create_dir_all(&job.output_root).map_err(|e| {
            BatchError::Fatal(format!(
                "Failed to create output directory {}: {e}",
                job.output_root.display()
            ))
        })?;

        let total = files.len();
        let mut stats = BatchStatistics::new(total);

        for (index, source) in files.iter().enumerate() {
            if self.is_cancelled() {
                tracing::warn!(processed = index, total, "Batch cancelled");
                return Err(BatchError::Cancelled {
                    processed: index,
                    total,
                });
            }

            let position = index + 1;
            log_batch_processing!(position, total);

            let relative = source.strip_prefix(&job.input_root).map_err(|_| {
                BatchError::Fatal(format!(
                    "{} is not under the input directory {}",
                    source.display(),
                    job.input_root.display()
                ))
            })?;
            let name = relative.display().to_string();
            let target = job.output_root.join(relative);

            match self.process_file(source, &target) {
                Ok(outcome) => {
                    tracing::debug!(
                        file = %name,
                        tags_removed = outcome.tags_removed,
                        mutations = outcome.mutations,
                        "File anonymized"
                    );
                    stats.record_success(outcome.tags_removed, outcome.mutations);
                }
                Err(message) => {
                    tracing::warn!(file = %name, error = %message, "Failed to anonymize file");
                    stats.record_failure(FileError::new(name.clone(), message));
                }
            }

            observer.on_progress(progress_percent(position, total));
            observer.on_status(&format!("Processing {position}/{total}: {name}"));
        }

        Ok(stats)
    }

    /// Load, anonymize and write one file; any failure is reported as text
    fn process_file(&self, source: &Path, target: &Path) -> Result<FileOutcome, String> {
        let mut record = self.codec.load(source).map_err(|e| e.to_string())?;
        let before = record.len();

        let outcome = self
            .engine
            .apply(&mut record, &self.rules)
            .map_err(|e| e.to_string())?;

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }

        self.codec.save(&record, target).map_err(|e| e.to_string())?;

        Ok(FileOutcome {
            tags_removed: before.saturating_sub(record.len()),
            mutations: outcome.mutated,
        })
    }

    fn is_cancelled(&self) -> bool {
        self.shutdown_signal
            .as_ref()
            .is_some_and(|signal| *signal.borrow())
    }
}

fn transition(state: &mut BatchState, next: BatchState) {
    tracing::debug!(from = %state, to = %next, "Batch state change");
    *state = next;
}

/// `floor(position / total * 100)`
pub fn progress_percent(position: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    u8::try_from(position.min(total) * 100 / total).unwrap_or(100)
}
