//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod anonymize;
pub mod anonymize_file;
pub mod init;
pub mod inspect;
pub mod validate;
pub mod verify;
