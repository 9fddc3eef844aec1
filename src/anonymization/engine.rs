//! Anonymization engine
//!
//! [`AnonymizationEngine::apply`] runs a [`RuleSet`] against one [`Record`] in a
//! fixed order:
//!
//! 1. remove
//! 2. replace
//! 3. date-shift
//! 4. private tag purge
//! 5. UID regeneration
//!
//! The only side effect besides mutating the record is drawing fresh UIDs from
//! the configured [`UidGenerator`]. Everything that can fail is checked before
//! the first mutation, so an `Err` always leaves the record untouched.
//!
//! # Examples
//!
//! ```
//! use dicom_anonymizer::anonymization::{AnonymizationConfig, AnonymizationEngine, RuleSet};
//! use dicom_anonymizer::domain::{keywords, Attribute, Record};
//!
//! let rules = RuleSet::from_config(&AnonymizationConfig::default()).unwrap();
//! let engine = AnonymizationEngine::new();
//!
//! let mut record = Record::from_attributes([
//!     Attribute::text(keywords::PATIENT_NAME, "Doe^Jane"),
//!     Attribute::text(keywords::MODALITY, "CT"),
//! ]);
//! let outcome = engine.apply(&mut record, &rules).unwrap();
//!
//! assert_eq!(outcome.removed, 1);
//! assert!(!record.contains(keywords::PATIENT_NAME));
//! assert_eq!(record.text(keywords::MODALITY), Some("CT"));
//! ```

use super::rules::RuleSet;
use super::uid::{self, UidGenerator, UuidUidGenerator};
use crate::domain::errors::EngineError;
use crate::domain::record::{Attribute, AttributeValue, Record};
use crate::domain::tags::TagId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Per-category result of one [`AnonymizationEngine::apply`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymizationOutcome {
    /// Attributes deleted by the remove category
    pub removed: usize,

    /// Attributes overwritten with a literal
    pub replaced: usize,

    /// Date attributes coarsened to the start of the year
    pub date_shifted: usize,

    /// Private attributes purged
    pub private_removed: usize,

    /// UID attributes given a fresh value (not part of `mutated`)
    pub uids_regenerated: usize,

    /// Distinct attributes removed, replaced, shifted or purged
    pub mutated: usize,
}

impl AnonymizationOutcome {
    /// Whether the record was changed at all
    pub fn is_unchanged(&self) -> bool {
        self.mutated == 0 && self.uids_regenerated == 0
    }
}

/// Applies rule sets to records
///
/// The engine holds no per-record state and can be shared across threads.
#[derive(Clone)]
pub struct AnonymizationEngine {
    uid_generator: Arc<dyn UidGenerator>,
}

impl Default for AnonymizationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AnonymizationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnonymizationEngine").finish_non_exhaustive()
    }
}

impl AnonymizationEngine {
    /// Engine that generates UUID-derived (`2.25.`) UIDs
    pub fn new() -> Self {
        Self::with_uid_generator(Arc::new(UuidUidGenerator))
    }

    /// Engine with a custom UID source
    pub fn with_uid_generator(uid_generator: Arc<dyn UidGenerator>) -> Self {
        Self { uid_generator }
    }

    /// Applies `rules` to `record` in place
    ///
    /// # Errors
    ///
    /// Returns an error, without touching the record, if a UID attribute that
    /// would be regenerated does not hold text, or if the generator produces an
    /// invalid UID.
    pub fn apply(
        &self,
        record: &mut Record,
        rules: &RuleSet,
    ) -> Result<AnonymizationOutcome, EngineError> {
        let fresh_uids = self.plan_uids(record, rules)?;

        let mut outcome = AnonymizationOutcome::default();
        let mut touched: HashSet<TagId> = HashSet::new();

        for tag in rules.remove_tags() {
            if record.remove(tag).is_some() {
                outcome.removed += 1;
                touched.insert(tag);
            }
        }

        for (tag, literal) in rules.replacements() {
            if let Some(attr) = record.get_mut(tag) {
                if attr.value.as_text() != Some(literal) {
                    attr.value = AttributeValue::text(literal);
                    outcome.replaced += 1;
                    touched.insert(tag);
                }
            }
        }

        for tag in rules.date_shift_tags() {
            if let Some(attr) = record.get_mut(tag) {
                if shift_date(attr, rules.date_suffix()) {
                    outcome.date_shifted += 1;
                    touched.insert(tag);
                }
            }
        }

        if rules.strip_private() {
            let private: Vec<TagId> = record
                .iter()
                .filter(|attr| attr.private)
                .map(|attr| attr.tag)
                .collect();
            for tag in private {
                record.remove(tag);
                outcome.private_removed += 1;
                touched.insert(tag);
            }
        }

        for (tag, uid) in fresh_uids {
            if let Some(attr) = record.get_mut(tag) {
                attr.value = AttributeValue::text(uid);
                outcome.uids_regenerated += 1;
            }
        }

        outcome.mutated = touched.len();

        tracing::debug!(
            removed = outcome.removed,
            replaced = outcome.replaced,
            date_shifted = outcome.date_shifted,
            private_removed = outcome.private_removed,
            uids_regenerated = outcome.uids_regenerated,
            mutated = outcome.mutated,
            "Record anonymized"
        );

        Ok(outcome)
    }

    /// Draws UIDs for every regeneration target that survives the earlier
    /// categories
    fn plan_uids(
        &self,
        record: &Record,
        rules: &RuleSet,
    ) -> Result<Vec<(TagId, String)>, EngineError> {
        let mut planned = Vec::new();

        for tag in rules.regenerate_tags() {
            let Some(attr) = record.get(tag) else {
                continue;
            };
            if rules.removes(tag) || (rules.strip_private() && attr.private) {
                continue;
            }
            if attr.value.as_text().is_none() {
                return Err(EngineError::NonTextualUid {
                    tag: tag.to_string(),
                    kind: attr.value.kind(),
                });
            }

            let fresh = self.uid_generator.generate()?;
            uid::validate_uid(&fresh)?;
            planned.push((tag, fresh));
        }

        Ok(planned)
    }
}

/// Keeps the year of a date value and replaces the rest with `suffix`
///
/// Values shorter than eight characters, non-textual values and values whose
/// first four characters are not digits are left alone. Returns whether the
/// value changed.
fn shift_date(attr: &mut Attribute, suffix: &str) -> bool {
    let Some(value) = attr.value.as_text() else {
        return false;
    };
    if value.chars().count() < 8 {
        return false;
    }

    let year: String = value.chars().take(4).collect();
    if !year.chars().all(|c| c.is_ascii_digit()) {
        tracing::debug!(tag = %attr.tag, "Date shift skipped: value is not a date");
        return false;
    }

    let shifted = format!("{year}{suffix}");
    if shifted == value {
        return false;
    }
    attr.value = AttributeValue::text(shifted);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::config::AnonymizationConfig;
    use crate::domain::errors::UidError;
    use crate::domain::tags::keywords;
    use test_case::test_case;

    fn default_rules() -> RuleSet {
        RuleSet::from_config(&AnonymizationConfig::default()).unwrap()
    }

    fn shift_only() -> RuleSet {
        RuleSet::builder()
            .date_shift_all(crate::anonymization::rules::DATE_TAGS.iter().copied())
            .build()
            .unwrap()
    }

    fn sample_record() -> Record {
        Record::from_attributes([
            Attribute::text(keywords::SOP_INSTANCE_UID, "1.2.3.4.5"),
            Attribute::text(keywords::STUDY_DATE, "20210615"),
            Attribute::text(keywords::ACQUISITION_DATE, "20210616"),
            Attribute::text(keywords::MODALITY, "MR"),
            Attribute::text(keywords::INSTITUTION_NAME, "General Hospital"),
            Attribute::text(keywords::REFERRING_PHYSICIAN_NAME, "House^Gregory"),
            Attribute::text(keywords::PATIENT_NAME, "Doe^Jane"),
            Attribute::text(keywords::PATIENT_ID, "P-0001"),
            Attribute::text(keywords::STUDY_INSTANCE_UID, "1.2.3.4"),
            Attribute::text(TagId::new(0x0009, 0x0010), "ACME"),
            Attribute::text(TagId::new(0x0009, 0x1001), "scanner secret"),
            Attribute::text(keywords::ROWS, "512"),
            Attribute::new(
                keywords::PIXEL_DATA,
                AttributeValue::Binary {
                    len: 8,
                    digest: "deadbeef".to_string(),
                },
            ),
        ])
    }

    struct FixedUid(&'static str);

    impl UidGenerator for FixedUid {
        fn generate(&self) -> Result<String, UidError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_default_rules_outcome() {
        let engine = AnonymizationEngine::new();
        let mut record = sample_record();
        let before = record.len();

        let outcome = engine.apply(&mut record, &default_rules()).unwrap();

        // PatientName, PatientID, StudyDate, StudyInstanceUID
        assert_eq!(outcome.removed, 4);
        assert_eq!(outcome.replaced, 2);
        assert_eq!(outcome.date_shifted, 1);
        assert_eq!(outcome.private_removed, 2);
        assert_eq!(outcome.uids_regenerated, 1);
        assert_eq!(outcome.mutated, 9);
        assert!(outcome.mutated <= before);
        assert_eq!(record.len(), before - 6);
    }

    #[test]
    fn test_default_rules_postconditions() {
        let engine = AnonymizationEngine::new();
        let rules = default_rules();
        let mut record = sample_record();
        engine.apply(&mut record, &rules).unwrap();

        for tag in rules.remove_tags() {
            assert!(!record.contains(tag), "{tag} should be removed");
        }
        for (tag, literal) in rules.replacements() {
            if let Some(value) = record.text(tag) {
                assert_eq!(value, literal);
            }
        }
        assert!(record.iter().all(|attr| !attr.private));

        assert_eq!(record.text(keywords::MODALITY), Some("MR"));
        assert_eq!(record.text(keywords::ROWS), Some("512"));
        assert_eq!(record.text(keywords::ACQUISITION_DATE), Some("20210101"));
        assert_eq!(record.pixel_digest(), Some("deadbeef"));

        let sop = record.text(keywords::SOP_INSTANCE_UID).unwrap();
        assert_ne!(sop, "1.2.3.4.5");
        assert!(sop.starts_with("2.25."));
    }

    #[test]
    fn test_study_date_shift_scenario() {
        let engine = AnonymizationEngine::new();
        let mut record =
            Record::from_attributes([Attribute::text(keywords::STUDY_DATE, "20210615")]);

        let outcome = engine.apply(&mut record, &shift_only()).unwrap();

        assert_eq!(record.text(keywords::STUDY_DATE), Some("20210101"));
        assert_eq!(outcome.date_shifted, 1);
        assert_eq!(outcome.mutated, 1);
    }

    #[test_case("20210615", "20210101" ; "plain date")]
    #[test_case("19991231235959", "19990101" ; "datetime keeps year only")]
    #[test_case("2021", "2021" ; "too short")]
    #[test_case("2021061", "2021061" ; "seven characters")]
    #[test_case("ABCD0615", "ABCD0615" ; "non numeric year")]
    #[test_case("20210101", "20210101" ; "already shifted")]
    fn test_date_shift_values(input: &str, expected: &str) {
        let engine = AnonymizationEngine::new();
        let mut record =
            Record::from_attributes([Attribute::text(keywords::CONTENT_DATE, input)]);

        let outcome = engine.apply(&mut record, &shift_only()).unwrap();

        assert_eq!(record.text(keywords::CONTENT_DATE), Some(expected));
        assert_eq!(outcome.date_shifted, usize::from(input != expected));
    }

    #[test]
    fn test_date_shift_skips_non_text() {
        let engine = AnonymizationEngine::new();
        let mut record = Record::from_attributes([Attribute::new(
            keywords::STUDY_DATE,
            AttributeValue::Sequence { items: 2 },
        )]);

        let outcome = engine.apply(&mut record, &shift_only()).unwrap();
        assert_eq!(outcome.mutated, 0);
        assert_eq!(
            record.get(keywords::STUDY_DATE).unwrap().value,
            AttributeValue::Sequence { items: 2 }
        );
    }

    #[test]
    fn test_second_pass_only_regenerates() {
        let engine = AnonymizationEngine::new();
        let rules = default_rules();
        let mut record = sample_record();

        engine.apply(&mut record, &rules).unwrap();
        let first_uid = record.text(keywords::SOP_INSTANCE_UID).unwrap().to_string();
        let snapshot = record.clone();

        let second = engine.apply(&mut record, &rules).unwrap();
        assert_eq!(second.mutated, 0);
        assert_eq!(second.uids_regenerated, 1);

        // UID regeneration is not idempotent
        let second_uid = record.text(keywords::SOP_INSTANCE_UID).unwrap();
        assert_ne!(first_uid, second_uid);

        for attr in snapshot.iter().filter(|a| a.tag != keywords::SOP_INSTANCE_UID) {
            assert_eq!(record.get(attr.tag), Some(attr));
        }
    }

    #[test]
    fn test_private_purge_uses_codec_classification() {
        let engine = AnonymizationEngine::new();
        let rules = RuleSet::builder().strip_private(true).build().unwrap();
        let mut record = Record::from_attributes([
            Attribute::text(keywords::MODALITY, "CT").with_private(true),
            Attribute::text(TagId::new(0x0011, 0x0010), "vendor").with_private(false),
        ]);

        let outcome = engine.apply(&mut record, &rules).unwrap();

        assert_eq!(outcome.private_removed, 1);
        assert!(!record.contains(keywords::MODALITY));
        assert!(record.contains(TagId::new(0x0011, 0x0010)));
    }

    #[test]
    fn test_regeneration_skips_removed_tags() {
        let engine = AnonymizationEngine::new();
        let mut record = sample_record();
        let outcome = engine.apply(&mut record, &default_rules()).unwrap();

        assert!(!record.contains(keywords::STUDY_INSTANCE_UID));
        assert_eq!(outcome.uids_regenerated, 1);
    }

    #[test]
    fn test_non_textual_uid_fails_without_mutation() {
        let engine = AnonymizationEngine::new();
        let mut record = sample_record();
        record.insert(Attribute::new(
            keywords::SOP_INSTANCE_UID,
            AttributeValue::Sequence { items: 1 },
        ));
        let snapshot = record.clone();

        let err = engine.apply(&mut record, &default_rules()).unwrap_err();

        assert!(matches!(err, EngineError::NonTextualUid { .. }));
        assert_eq!(record, snapshot);
    }

    #[test]
    fn test_invalid_generated_uid_fails_without_mutation() {
        let engine = AnonymizationEngine::with_uid_generator(Arc::new(FixedUid("1.2.x")));
        let mut record = sample_record();
        let snapshot = record.clone();

        let err = engine.apply(&mut record, &default_rules()).unwrap_err();

        assert!(matches!(err, EngineError::UidGeneration(_)));
        assert_eq!(record, snapshot);
    }

    #[test]
    fn test_custom_uid_generator() {
        let engine = AnonymizationEngine::with_uid_generator(Arc::new(FixedUid("1.2.3.999")));
        let mut record = sample_record();
        engine.apply(&mut record, &default_rules()).unwrap();
        assert_eq!(record.text(keywords::SOP_INSTANCE_UID), Some("1.2.3.999"));
    }

    #[test]
    fn test_empty_rule_set_changes_nothing() {
        let engine = AnonymizationEngine::new();
        let rules = RuleSet::builder().build().unwrap();
        let mut record = sample_record();
        let snapshot = record.clone();

        let outcome = engine.apply(&mut record, &rules).unwrap();

        assert!(outcome.is_unchanged());
        assert_eq!(record, snapshot);
    }
}
