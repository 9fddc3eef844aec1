//! File-format adapters.
//!
//! - [`codec`] - The [`RecordCodec`] trait the engine and pipeline consume
//! - [`dicom`] - DICOM Part 10 implementation backed by `dicom-object`
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate the container format from
//! the anonymization core. Tests swap in lightweight codecs that implement the
//! same trait.
//!
//! ```rust,no_run
//! use dicom_anonymizer::adapters::{DicomFileCodec, RecordCodec};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let codec = DicomFileCodec::new();
//! let record = codec.load(Path::new("scan.dcm"))?;
//! println!("{} attributes", record.len());
//! codec.save(&record, Path::new("copy.dcm"))?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod dicom;

pub use codec::RecordCodec;
pub use dicom::DicomFileCodec;
