//! Domain models and types for the anonymizer.
//!
//! This module contains the codec-independent record model and the error types
//! shared by every layer.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Tag identifiers** ([`TagId`]) with a keyword table for the standard tags the
//!   rule set and verifier reference
//! - **Record model** ([`Record`], [`Attribute`], [`AttributeValue`])
//! - **Error types** ([`AnonymizerError`], [`CodecError`], [`EngineError`], [`BatchError`])
//! - **Result type alias** ([`Result`])
//!
//! # Example
//!
//! ```rust
//! use dicom_anonymizer::domain::{Attribute, Record, TagId};
//! use std::str::FromStr;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let tag = TagId::from_str("PatientName")?;
//! let record = Record::from_attributes([Attribute::text(tag, "Doe^Jane")]);
//! assert_eq!(record.text(tag), Some("Doe^Jane"));
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod record;
pub mod result;
pub mod tags;

// Re-export commonly used types for convenience
pub use errors::{
    AnonymizerError, BatchError, CodecError, EngineError, RuleSetError, UidError,
};
pub use record::{Attribute, AttributeValue, Record, RecordSource};
pub use result::Result;
pub use tags::{keywords, TagId};
