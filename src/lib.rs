// DICOM Anonymizer - Rule-driven metadata anonymization for medical images
// Copyright (c) 2025 DICOM Anonymizer Contributors
// Licensed under the MIT License

//! # DICOM Anonymizer
//!
//! A rule-driven tool that redacts personally and institutionally identifying
//! metadata from DICOM files while leaving the pixel data untouched.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Classifying** tags into remove / replace / date-shift rules, plus private-tag
//!   purging and UID regeneration
//! - **Applying** a rule set to one record, all-or-nothing, with per-category counts
//! - **Batch processing** a directory tree into a mirrored, anonymized tree with
//!   progress notifications and per-file failure aggregation
//! - **Verifying** that no sensitive tag survived anonymization
//!
//! ## Architecture
//!
//! The crate follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Batch pipeline and verification
//! - [`anonymization`] - Rule options, rule set, UID generation and the engine
//! - [`adapters`] - Record codecs (DICOM files)
//! - [`domain`] - Tag identifiers, the record model and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dicom_anonymizer::adapters::DicomFileCodec;
//! use dicom_anonymizer::anonymization::{AnonymizationEngine, RuleSet};
//! use dicom_anonymizer::config::load_config_or_default;
//! use dicom_anonymizer::core::batch::{BatchJob, BatchPipeline, NoopObserver};
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config_or_default("dicom-anonymizer.toml")?;
//!     let rules = RuleSet::from_config(&config.anonymization)?;
//!
//!     let pipeline = BatchPipeline::new(
//!         Arc::new(DicomFileCodec::new()),
//!         AnonymizationEngine::new(),
//!         Arc::new(rules),
//!         config.batch,
//!     );
//!
//!     let stats = pipeline.run(&BatchJob::new("scans", "scans-anon"), &NoopObserver)?;
//!     println!("Anonymized {} of {} files", stats.successful, stats.total);
//!     Ok(())
//! }
//! ```
//!
//! ## Single Records
//!
//! The engine works on any [`domain::Record`], whichever codec produced it:
//!
//! ```rust
//! use dicom_anonymizer::anonymization::{AnonymizationEngine, RuleSet};
//! use dicom_anonymizer::domain::{keywords, Attribute, Record};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let rules = RuleSet::builder()
//!     .remove(keywords::PATIENT_NAME)
//!     .date_shift(keywords::STUDY_DATE)
//!     .build()?;
//!
//! let mut record = Record::from_attributes([
//!     Attribute::text(keywords::PATIENT_NAME, "Doe^Jane"),
//!     Attribute::text(keywords::STUDY_DATE, "20210615"),
//! ]);
//!
//! let outcome = AnonymizationEngine::new().apply(&mut record, &rules)?;
//! assert_eq!(outcome.removed, 1);
//! assert_eq!(record.text(keywords::STUDY_DATE), Some("20210101"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Library errors are [`domain::AnonymizerError`] and the module-specific enums it
//! wraps. Per-file failures during a batch never surface as errors; they are
//! collected in the [`core::batch::BatchStatistics`].
//!
//! ## Logging
//!
//! Logging uses the `tracing` crate. Attribute values are never logged, only tag
//! identifiers and counts.

pub mod adapters;
pub mod anonymization;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
