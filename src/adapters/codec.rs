//! Record codec abstraction
//!
//! This module defines the trait that file-format adapters implement so the
//! engine and batch pipeline never deal with container bytes directly.

use crate::domain::errors::CodecError;
use crate::domain::record::Record;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Reads and writes records
///
/// Implementations must be shareable across threads; the batch pipeline holds
/// one codec behind an `Arc` for the whole run.
pub trait RecordCodec: Send + Sync {
    /// Parse the file at `path` into a record
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Read`] with the underlying message if the file
    /// cannot be opened or parsed.
    fn load(&self, path: &Path) -> Result<Record, CodecError>;

    /// Serialize `record` to a self-contained file at `path`
    ///
    /// The pixel payload carried by the record must be written unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Write`] if the file cannot be written, or
    /// [`CodecError::MissingSource`]/[`CodecError::UnsupportedValue`] if the
    /// record cannot be represented by this codec.
    fn save(&self, record: &Record, path: &Path) -> Result<(), CodecError>;
}

/// Temporary sibling used while writing `path`
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("record"));
    name.push(".part");
    path.with_file_name(name)
}

/// Writes through a temporary sibling and renames it into place
///
/// An interrupted write leaves at most a `.part` file behind, never a
/// truncated output under the final name.
pub fn write_atomically<F, E>(path: &Path, write: F) -> Result<(), CodecError>
where
    F: FnOnce(&Path) -> Result<(), E>,
    E: std::fmt::Display,
{
    let tmp = partial_path(path);

    if let Err(e) = write(&tmp) {
        let _ = std::fs::remove_file(&tmp);
        return Err(CodecError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        });
    }

    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        CodecError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })
}
