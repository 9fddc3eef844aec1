//! Post-anonymization verification
//!
//! This module checks that sensitive tags did not survive anonymization and that
//! the pixel payload came through untouched.

pub mod checksum;
pub mod report;
pub mod verify;

pub use report::{SensitiveTag, VerificationReport};
pub use verify::{Verifier, DEFAULT_SENSITIVE_TAGS};
