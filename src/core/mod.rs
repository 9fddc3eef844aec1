//! Core business logic for the anonymizer.
//!
//! This module contains the batch orchestration and the verification of its
//! results.
//!
//! # Modules
//!
//! - [`batch`] - Discovery, per-file anonymization, statistics and progress
//! - [`verification`] - Sensitive-tag and pixel checks on anonymized records
//!
//! # Batch Workflow
//!
//! 1. **Validate**: Check the input and output roots
//! 2. **Discover**: List record files under the input root in path order
//! 3. **Anonymize**: Load, apply the rule set and write each file
//! 4. **Report**: Hand the final statistics to the observer
//!
//! # Example
//!
//! ```rust,no_run
//! use dicom_anonymizer::adapters::DicomFileCodec;
//! use dicom_anonymizer::anonymization::{AnonymizationConfig, AnonymizationEngine, RuleSet};
//! use dicom_anonymizer::config::BatchConfig;
//! use dicom_anonymizer::core::batch::{BatchJob, BatchPipeline, NoopObserver};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let rules = RuleSet::from_config(&AnonymizationConfig::default())?;
//! let pipeline = BatchPipeline::new(
//!     Arc::new(DicomFileCodec::new()),
//!     AnonymizationEngine::new(),
//!     Arc::new(rules),
//!     BatchConfig::default(),
//! );
//!
//! let job = BatchJob::new("scans", "scans-anonymized");
//! let stats = pipeline.run(&job, &NoopObserver)?;
//!
//! println!("Total: {}", stats.total);
//! println!("Successful: {}", stats.successful);
//! println!("Failed: {}", stats.failed);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod verification;
