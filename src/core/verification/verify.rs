//! Post-anonymization verification
//!
//! The verifier compares any two records: it does not assume the anonymized one
//! was produced by this crate's engine, and it never mutates either input.

use super::checksum::verify_checksum;
use super::report::{SensitiveTag, VerificationReport};
use crate::anonymization::config::DEFAULT_PLACEHOLDER;
use crate::domain::{keywords, Record, TagId};
use chrono::Utc;

/// Tags that must not survive anonymization
pub const DEFAULT_SENSITIVE_TAGS: &[TagId] = &[
    keywords::PATIENT_NAME,
    keywords::PATIENT_ID,
    keywords::PATIENT_BIRTH_DATE,
    keywords::REFERRING_PHYSICIAN_NAME,
    keywords::OPERATORS_NAME,
    keywords::INSTITUTION_NAME,
    keywords::STUDY_INSTANCE_UID,
    keywords::SERIES_INSTANCE_UID,
];

/// Verifier for anonymized records
#[derive(Debug, Clone)]
pub struct Verifier {
    sensitive_tags: Vec<TagId>,
    placeholder: String,
}

impl Verifier {
    /// Create a verifier checking [`DEFAULT_SENSITIVE_TAGS`]
    pub fn new() -> Self {
        Self {
            sensitive_tags: DEFAULT_SENSITIVE_TAGS.to_vec(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }

    /// Replacement literal that marks a sensitive value as overwritten
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Replace the list of sensitive tags
    pub fn with_sensitive_tags(mut self, tags: impl IntoIterator<Item = TagId>) -> Self {
        self.sensitive_tags = tags.into_iter().collect();
        self
    }

    pub fn sensitive_tags(&self) -> &[TagId] {
        &self.sensitive_tags
    }

    /// Compare an original record with its anonymized counterpart
    ///
    /// A sensitive tag still present with exactly the placeholder value counts
    /// as replaced; any other surviving value counts as still present.
    ///
    /// # Examples
    ///
    /// ```
    /// use dicom_anonymizer::core::verification::Verifier;
    /// use dicom_anonymizer::domain::{keywords, Attribute, Record};
    ///
    /// let original = Record::from_attributes([
    ///     Attribute::text(keywords::PATIENT_NAME, "Doe^Jane"),
    ///     Attribute::text(keywords::MODALITY, "CT"),
    /// ]);
    /// let anonymized = Record::from_attributes([Attribute::text(keywords::MODALITY, "CT")]);
    ///
    /// let report = Verifier::new().verify(&original, &anonymized);
    /// assert!(report.is_clean());
    /// assert_eq!(report.tags_removed, 1);
    /// ```
    pub fn verify(&self, original: &Record, anonymized: &Record) -> VerificationReport {
        let mut still_present = Vec::new();
        let mut replaced = Vec::new();
        let mut removed = Vec::new();
        let mut never_present = Vec::new();

        for &tag in &self.sensitive_tags {
            let entry = SensitiveTag::new(tag);
            if anonymized.text(tag) == Some(self.placeholder.as_str()) {
                replaced.push(entry);
            } else if anonymized.contains(tag) {
                still_present.push(entry);
            } else if original.contains(tag) {
                removed.push(entry);
            } else {
                never_present.push(entry);
            }
        }

        let pixel_data_unchanged = match (original.pixel_digest(), anonymized.pixel_digest()) {
            (Some(before), Some(after)) => Some(verify_checksum(before, after)),
            _ => None,
        };

        let original_count = original.len();
        let anonymized_count = anonymized.len();

        let report = VerificationReport {
            verified_at: Utc::now(),
            original_count,
            anonymized_count,
            tags_removed: original_count as i64 - anonymized_count as i64,
            still_present,
            replaced,
            removed,
            never_present,
            pixel_data_present: anonymized.has_pixel_data(),
            pixel_data_unchanged,
        };

        if report.is_clean() {
            tracing::info!(
                tags_removed = report.tags_removed,
                replaced = report.replaced.len(),
                "Verification passed: no sensitive values remain"
            );
        } else {
            let surviving: Vec<&str> = report
                .still_present
                .iter()
                .map(|t| t.name.as_str())
                .collect();
            tracing::warn!(
                surviving = ?surviving,
                "Verification found sensitive tags in the anonymized record"
            );
        }

        report
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new()
    }
}
