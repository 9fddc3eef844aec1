//! Configuration management for the anonymizer.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Configuration files support:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `DICOM_ANON_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting (an empty file is valid)
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use dicom_anonymizer::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("dicom-anonymizer.toml")?;
//! println!("Strip private tags: {}", config.anonymization.strip_private_tags);
//! println!("Extensions: {:?}", config.batch.extensions);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`AnonymizationConfig`](crate::anonymization::AnonymizationConfig) - Rule options
//! - [`BatchConfig`] - Record-file discovery
//! - [`LoggingConfig`] - Local JSON log files
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [anonymization]
//! remove_patient_identifiers = true
//! shift_dates = true
//! placeholder = "ANONYMIZED"
//! uid_root = "${DICOM_ANON_ORG_ROOT}"
//!
//! [batch]
//! extensions = ["dcm"]
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default, DEFAULT_CONFIG_FILE};
pub use schema::{AppConfig, ApplicationConfig, BatchConfig, LoggingConfig};
