//! Checksums for binary payloads
//!
//! Pixel data and other binary attributes are represented in a
//! [`Record`](crate::domain::Record) only by length and SHA-256 digest, which is
//! how the verifier proves the payload survived anonymization unchanged.

use sha2::{Digest, Sha256};

/// Calculate SHA-256 checksum of raw bytes
///
/// Returns a hex-encoded SHA-256 checksum string (64 characters).
///
/// # Examples
///
/// ```
/// use dicom_anonymizer::core::verification::checksum::calculate_checksum_bytes;
///
/// let checksum = calculate_checksum_bytes(b"pixels");
/// assert_eq!(checksum.len(), 64);
/// ```
pub fn calculate_checksum_bytes(data: &[u8]) -> String {
    calculate_checksum_chunks([data])
}

/// Calculate one SHA-256 checksum over several byte chunks
///
/// Used for encapsulated pixel data, where the payload is a list of fragments.
pub fn calculate_checksum_chunks<'a>(chunks: impl IntoIterator<Item = &'a [u8]>) -> String {
    let mut hasher = Sha256::new();
    for chunk in chunks {
        hasher.update(chunk);
    }
    format!("{:x}", hasher.finalize())
}

/// Compare two checksums
pub fn verify_checksum(expected: &str, actual: &str) -> bool {
    expected.eq_ignore_ascii_case(actual)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            calculate_checksum_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_chunks_match_contiguous_bytes() {
        let whole = calculate_checksum_bytes(b"abcdef");
        let chunked = calculate_checksum_chunks([&b"abc"[..], &b"def"[..]]);
        assert_eq!(whole, chunked);
    }

    #[test]
    fn test_different_data_different_checksum() {
        assert_ne!(
            calculate_checksum_bytes(b"frame-1"),
            calculate_checksum_bytes(b"frame-2")
        );
    }

    #[test]
    fn test_verify_checksum_case_insensitive() {
        let checksum = calculate_checksum_bytes(b"x");
        assert!(verify_checksum(&checksum, &checksum.to_uppercase()));
        assert!(!verify_checksum(&checksum, "00"));
    }
}
