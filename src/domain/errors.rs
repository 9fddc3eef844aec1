//! Domain error types
//!
//! This module defines the error hierarchy for the anonymizer.
//! All errors are domain-specific and don't expose third-party types; codec and
//! library failures are carried as their original message text.

use std::path::PathBuf;
use thiserror::Error;

/// Main anonymizer error type
///
/// This is the primary error type used throughout the application.
/// It wraps the module-specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum AnonymizerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Record codec errors (load/save)
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Anonymization engine errors
    #[error("Anonymization error: {0}")]
    Engine(#[from] EngineError),

    /// Rule set construction errors
    #[error("Rule set error: {0}")]
    RuleSet(#[from] RuleSetError),

    /// Batch run errors
    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),

    /// Verification errors
    #[error("Verification error: {0}")]
    Verification(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Errors raised by a record codec
///
/// The underlying library message is kept verbatim so operators can see exactly
/// why a file could not be read or written.
#[derive(Debug, Error)]
pub enum CodecError {
    /// File could not be parsed into a record
    #[error("Failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// Record could not be serialized to disk
    #[error("Failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },

    /// Record was not produced by this codec and carries no source dataset
    #[error("Record has no source dataset for this codec")]
    MissingSource,

    /// Attribute value cannot be represented by the codec
    #[error("Unsupported value for {tag}: {message}")]
    UnsupportedValue { tag: String, message: String },
}

/// Structural failures of the anonymization engine
///
/// These are detected before the record is mutated, so a failed apply never
/// leaves a partially anonymized record behind.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A UID-bearing attribute does not hold a textual value
    #[error("Cannot regenerate {tag}: attribute holds a {kind} value")]
    NonTextualUid { tag: String, kind: &'static str },

    /// The UID generator failed or produced an invalid UID
    #[error("UID generation failed: {0}")]
    UidGeneration(#[from] UidError),
}

/// UID generation / validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UidError {
    /// UID is longer than the 64 characters DICOM allows
    #[error("UID '{uid}' exceeds 64 characters ({len})")]
    TooLong { uid: String, len: usize },

    /// UID is not a dot-separated list of numeric components
    #[error("UID '{0}' is not a dot-separated numeric identifier")]
    Malformed(String),

    /// Configured UID root is unusable
    #[error("Invalid UID root '{root}': {reason}")]
    InvalidRoot { root: String, reason: String },
}

/// Rule set construction errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleSetError {
    /// Same tag appears in both the remove and replace categories
    #[error("Tag {0} is listed for both removal and replacement")]
    RemoveReplaceOverlap(String),

    /// Same tag appears in both the replace and date-shift categories
    #[error("Tag {0} is listed for both replacement and date shifting")]
    ReplaceDateShiftOverlap(String),
}

/// Terminal errors of a batch run
///
/// Per-record failures are not represented here; they are collected in the
/// batch statistics and never abort the run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// Bad input/output paths, detected before any processing
    #[error("{0}")]
    Configuration(String),

    /// Discovery found no record files
    #[error("No DICOM files found in {0}")]
    NoRecordsFound(PathBuf),

    /// Directory traversal failed
    #[error("Failed to scan {path}: {message}")]
    Discovery { path: PathBuf, message: String },

    /// Run was cancelled at a file boundary
    #[error("Batch cancelled after {processed} of {total} files")]
    Cancelled { processed: usize, total: usize },

    /// Unexpected failure during processing; accumulated statistics are dropped
    #[error("{0}")]
    Fatal(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for AnonymizerError {
    fn from(err: std::io::Error) -> Self {
        AnonymizerError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for AnonymizerError {
    fn from(err: serde_json::Error) -> Self {
        AnonymizerError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for AnonymizerError {
    fn from(err: toml::de::Error) -> Self {
        AnonymizerError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymizer_error_display() {
        let err = AnonymizerError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_codec_error_keeps_message_verbatim() {
        let err = CodecError::Read {
            path: PathBuf::from("scans/corrupt.dcm"),
            message: "unexpected end of file".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to read scans/corrupt.dcm: unexpected end of file"
        );
    }

    #[test]
    fn test_codec_error_conversion() {
        let err: AnonymizerError = CodecError::MissingSource.into();
        assert!(matches!(err, AnonymizerError::Codec(_)));
    }

    #[test]
    fn test_engine_error_from_uid_error() {
        let err: EngineError = UidError::Malformed("abc".to_string()).into();
        assert!(matches!(err, EngineError::UidGeneration(_)));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_batch_error_messages() {
        let err = BatchError::NoRecordsFound(PathBuf::from("/data/in"));
        assert_eq!(err.to_string(), "No DICOM files found in /data/in");

        let err = BatchError::Cancelled {
            processed: 3,
            total: 10,
        };
        assert_eq!(err.to_string(), "Batch cancelled after 3 of 10 files");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: AnonymizerError = io_err.into();
        assert!(matches!(err, AnonymizerError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: AnonymizerError = toml_err.into();
        assert!(matches!(err, AnonymizerError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let err = AnonymizerError::Verification("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
