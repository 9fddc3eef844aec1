//! UID generation
//!
//! Regenerated identifiers must be collision-free across concurrent engine
//! invocations, so generators are stateless and draw from random UUIDs.

use crate::domain::errors::UidError;
use std::sync::Arc;
use uuid::Uuid;

/// Maximum UID length allowed by DICOM
pub const MAX_UID_LEN: usize = 64;

/// Arc reserved for UUID-derived UIDs
pub const UUID_ROOT: &str = "2.25";

/// Fewest random digits a prefixed UID may carry (about 100 bits)
pub const MIN_SUFFIX_DIGITS: usize = 30;

/// Decimal digits of `u128::MAX`
const MAX_SUFFIX_DIGITS: usize = 39;

/// Source of fresh unique identifiers
pub trait UidGenerator: Send + Sync {
    /// Returns a new UID; every call yields a different value
    fn generate(&self) -> Result<String, UidError>;
}

/// `2.25.<uuid as decimal>` generator
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidUidGenerator;

impl UidGenerator for UuidUidGenerator {
    fn generate(&self) -> Result<String, UidError> {
        Ok(format!("{UUID_ROOT}.{}", Uuid::new_v4().as_u128()))
    }
}

/// Generator that places UUID digits under an organisation root
#[derive(Debug, Clone)]
pub struct PrefixedUidGenerator {
    root: String,
}

impl PrefixedUidGenerator {
    pub fn new(root: impl Into<String>) -> Result<Self, UidError> {
        let root = root.into();
        validate_root(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &str {
        &self.root
    }
}

impl UidGenerator for PrefixedUidGenerator {
    fn generate(&self) -> Result<String, UidError> {
        let room = MAX_UID_LEN.saturating_sub(self.root.len() + 1);
        let value = Uuid::new_v4().as_u128();

        let suffix = if room >= MAX_SUFFIX_DIGITS {
            value
        } else if room >= MIN_SUFFIX_DIGITS {
            // Exactly `room` digits, no leading zero
            let floor = 10_u128.pow((room - 1) as u32);
            floor + value % (9 * floor)
        } else {
            return Err(UidError::InvalidRoot {
                root: self.root.clone(),
                reason: format!("leaves fewer than {MIN_SUFFIX_DIGITS} digits for the suffix"),
            });
        };

        let uid = format!("{}.{suffix}", self.root);
        validate_uid(&uid)?;
        Ok(uid)
    }
}

/// Builds the generator for an optional configured root
pub fn generator_for(root: Option<&str>) -> Result<Arc<dyn UidGenerator>, UidError> {
    match root {
        Some(root) => Ok(Arc::new(PrefixedUidGenerator::new(root)?)),
        None => Ok(Arc::new(UuidUidGenerator)),
    }
}

/// Checks length and component syntax of a UID
///
/// ```
/// use dicom_anonymizer::anonymization::uid::validate_uid;
///
/// assert!(validate_uid("1.2.840.10008.1.2").is_ok());
/// assert!(validate_uid("1.02.3").is_err());
/// ```
pub fn validate_uid(uid: &str) -> Result<(), UidError> {
    if uid.len() > MAX_UID_LEN {
        return Err(UidError::TooLong {
            uid: uid.to_string(),
            len: uid.len(),
        });
    }

    let well_formed = !uid.is_empty()
        && uid.split('.').all(|component| {
            !component.is_empty()
                && component.bytes().all(|b| b.is_ascii_digit())
                && (component == "0" || !component.starts_with('0'))
        });

    if well_formed {
        Ok(())
    } else {
        Err(UidError::Malformed(uid.to_string()))
    }
}

/// Checks that a root is a valid UID with room left for generated digits
pub fn validate_root(root: &str) -> Result<(), UidError> {
    validate_uid(root).map_err(|err| UidError::InvalidRoot {
        root: root.to_string(),
        reason: err.to_string(),
    })?;

    // root + '.' + random suffix
    if root.len() + 1 + MIN_SUFFIX_DIGITS > MAX_UID_LEN {
        return Err(UidError::InvalidRoot {
            root: root.to_string(),
            reason: format!(
                "must be at most {} characters to leave {MIN_SUFFIX_DIGITS} random digits",
                MAX_UID_LEN - 1 - MIN_SUFFIX_DIGITS
            ),
        });
    }

    Ok(())
}
