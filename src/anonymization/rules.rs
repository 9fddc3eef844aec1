//! Rule set
//!
//! A [`RuleSet`] is immutable data: the tags to remove, the tags to overwrite with
//! a literal, the tags whose date value is coarsened, plus the two blanket
//! policies (private tag purge and UID regeneration). It is built once per run,
//! either from an [`AnonymizationConfig`] or through [`RuleSetBuilder`], and then
//! shared read-only.

use super::config::AnonymizationConfig;
use crate::domain::errors::RuleSetError;
use crate::domain::tags::{keywords, TagId};
use std::collections::{BTreeMap, BTreeSet};

/// Month/day suffix appended to the year of a shifted date
pub const DATE_SHIFT_SUFFIX: &str = "0101";

/// Patient demographics deleted by `remove_patient_identifiers`
pub const PATIENT_IDENTIFIERS: &[TagId] = &[
    keywords::PATIENT_NAME,
    keywords::PATIENT_ID,
    keywords::PATIENT_BIRTH_DATE,
    keywords::PATIENT_AGE,
    keywords::PATIENT_SEX,
    keywords::PATIENT_ADDRESS,
    keywords::PATIENT_TELEPHONE_NUMBERS,
];

/// Study/series identifiers, dates, times and descriptions deleted by
/// `remove_study_identifiers`
pub const STUDY_IDENTIFIERS: &[TagId] = &[
    keywords::STUDY_INSTANCE_UID,
    keywords::SERIES_INSTANCE_UID,
    keywords::STUDY_DATE,
    keywords::SERIES_DATE,
    keywords::CONTENT_DATE,
    keywords::STUDY_TIME,
    keywords::SERIES_TIME,
    keywords::CONTENT_TIME,
    keywords::ACQUISITION_DATE_TIME,
    keywords::STUDY_DESCRIPTION,
    keywords::SERIES_DESCRIPTION,
];

/// Equipment and site tags deleted by `remove_device_identifiers`
pub const DEVICE_IDENTIFIERS: &[TagId] = &[
    keywords::INSTITUTION_ADDRESS,
    keywords::MANUFACTURER,
    keywords::MANUFACTURER_MODEL_NAME,
    keywords::DEVICE_SERIAL_NUMBER,
    keywords::STATION_NAME,
];

/// Names overwritten by `replace_physician_institution`
pub const PHYSICIAN_INSTITUTION: &[TagId] = &[
    keywords::REFERRING_PHYSICIAN_NAME,
    keywords::PERFORMING_PHYSICIAN_NAME,
    keywords::OPERATORS_NAME,
    keywords::INSTITUTION_NAME,
];

/// Date-valued tags coarsened by `shift_dates`
pub const DATE_TAGS: &[TagId] = &[
    keywords::STUDY_DATE,
    keywords::SERIES_DATE,
    keywords::PATIENT_BIRTH_DATE,
    keywords::CONTENT_DATE,
    keywords::ACQUISITION_DATE,
];

/// UID-bearing tags replaced by `regenerate_uids`
pub const UID_TAGS: &[TagId] = &[
    keywords::SOP_INSTANCE_UID,
    keywords::STUDY_INSTANCE_UID,
    keywords::SERIES_INSTANCE_UID,
];

/// Immutable anonymization policy
///
/// # Examples
///
/// ```
/// use dicom_anonymizer::anonymization::{AnonymizationConfig, RuleSet};
/// use dicom_anonymizer::domain::tags::keywords;
///
/// let rules = RuleSet::from_config(&AnonymizationConfig::default()).unwrap();
/// assert!(rules.removes(keywords::PATIENT_NAME));
/// assert_eq!(rules.replacement(keywords::INSTITUTION_NAME), Some("ANONYMIZED"));
/// assert!(rules.strip_private());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    remove: BTreeSet<TagId>,
    replace: BTreeMap<TagId, String>,
    date_shift: BTreeSet<TagId>,
    date_suffix: String,
    strip_private: bool,
    regenerate: BTreeSet<TagId>,
}

impl RuleSet {
    /// Starts an empty rule set
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::default()
    }

    /// Derives the rule set from the user-toggled options
    pub fn from_config(config: &AnonymizationConfig) -> Result<Self, RuleSetError> {
        let mut builder = Self::builder();

        if config.remove_patient_identifiers {
            builder = builder.remove_all(PATIENT_IDENTIFIERS.iter().copied());
        }
        if config.remove_study_identifiers {
            builder = builder.remove_all(STUDY_IDENTIFIERS.iter().copied());
        }
        if config.remove_device_identifiers {
            builder = builder.remove_all(DEVICE_IDENTIFIERS.iter().copied());
        }
        if config.replace_physician_institution {
            for tag in PHYSICIAN_INSTITUTION {
                builder = builder.replace(*tag, config.placeholder.clone());
            }
        }
        if config.shift_dates {
            builder = builder.date_shift_all(DATE_TAGS.iter().copied());
        }

        builder
            .strip_private(config.strip_private_tags)
            .regenerate_uids(config.regenerate_uids)
            .build()
    }

    /// Tags deleted outright
    pub fn remove_tags(&self) -> impl Iterator<Item = TagId> + '_ {
        self.remove.iter().copied()
    }

    /// Tags overwritten with a literal
    pub fn replacements(&self) -> impl Iterator<Item = (TagId, &str)> + '_ {
        self.replace.iter().map(|(tag, value)| (*tag, value.as_str()))
    }

    /// Tags whose date value is coarsened
    pub fn date_shift_tags(&self) -> impl Iterator<Item = TagId> + '_ {
        self.date_shift.iter().copied()
    }

    /// Tags that receive a fresh UID
    pub fn regenerate_tags(&self) -> impl Iterator<Item = TagId> + '_ {
        self.regenerate.iter().copied()
    }

    pub fn removes(&self, tag: TagId) -> bool {
        self.remove.contains(&tag)
    }

    pub fn replacement(&self, tag: TagId) -> Option<&str> {
        self.replace.get(&tag).map(String::as_str)
    }

    pub fn shifts_date(&self, tag: TagId) -> bool {
        self.date_shift.contains(&tag)
    }

    pub fn regenerates(&self, tag: TagId) -> bool {
        self.regenerate.contains(&tag)
    }

    /// Month/day suffix used by date shifting
    pub fn date_suffix(&self) -> &str {
        &self.date_suffix
    }

    /// Whether every private attribute is purged
    pub fn strip_private(&self) -> bool {
        self.strip_private
    }

    /// A rule set that changes nothing
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty()
            && self.replace.is_empty()
            && self.date_shift.is_empty()
            && !self.strip_private
            && self.regenerate.is_empty()
    }
}

/// Builder for [`RuleSet`]
///
/// Validation happens in [`build`](Self::build): a tag may not be both removed
/// and replaced, nor both replaced and date-shifted.
#[derive(Debug, Clone)]
pub struct RuleSetBuilder {
    remove: BTreeSet<TagId>,
    replace: BTreeMap<TagId, String>,
    date_shift: BTreeSet<TagId>,
    date_suffix: String,
    strip_private: bool,
    regenerate: bool,
}

impl Default for RuleSetBuilder {
    fn default() -> Self {
        Self {
            remove: BTreeSet::new(),
            replace: BTreeMap::new(),
            date_shift: BTreeSet::new(),
            date_suffix: DATE_SHIFT_SUFFIX.to_string(),
            strip_private: false,
            regenerate: false,
        }
    }
}

impl RuleSetBuilder {
    pub fn remove(mut self, tag: TagId) -> Self {
        self.remove.insert(tag);
        self
    }

    pub fn remove_all(mut self, tags: impl IntoIterator<Item = TagId>) -> Self {
        self.remove.extend(tags);
        self
    }

    pub fn replace(mut self, tag: TagId, value: impl Into<String>) -> Self {
        self.replace.insert(tag, value.into());
        self
    }

    pub fn date_shift(mut self, tag: TagId) -> Self {
        self.date_shift.insert(tag);
        self
    }

    pub fn date_shift_all(mut self, tags: impl IntoIterator<Item = TagId>) -> Self {
        self.date_shift.extend(tags);
        self
    }

    pub fn date_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.date_suffix = suffix.into();
        self
    }

    pub fn strip_private(mut self, enabled: bool) -> Self {
        self.strip_private = enabled;
        self
    }

    pub fn regenerate_uids(mut self, enabled: bool) -> Self {
        self.regenerate = enabled;
        self
    }

    /// Validates category overlap and freezes the rule set
    pub fn build(self) -> Result<RuleSet, RuleSetError> {
        if let Some(tag) = self.replace.keys().find(|tag| self.remove.contains(tag)) {
            return Err(RuleSetError::RemoveReplaceOverlap(tag.to_string()));
        }
        if let Some(tag) = self.replace.keys().find(|tag| self.date_shift.contains(tag)) {
            return Err(RuleSetError::ReplaceDateShiftOverlap(tag.to_string()));
        }

        let regenerate = if self.regenerate {
            UID_TAGS.iter().copied().collect()
        } else {
            BTreeSet::new()
        };

        Ok(RuleSet {
            remove: self.remove,
            replace: self.replace,
            date_shift: self.date_shift,
            date_suffix: self.date_suffix,
            strip_private: self.strip_private,
            regenerate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::config::RuleOption;

    #[test]
    fn test_default_rule_set_categories() {
        let rules = RuleSet::from_config(&AnonymizationConfig::default()).unwrap();

        assert_eq!(rules.remove_tags().count(), 23);
        assert_eq!(rules.replacements().count(), 4);
        assert_eq!(rules.date_shift_tags().count(), 5);
        assert_eq!(rules.regenerate_tags().count(), 3);
        assert!(rules.strip_private());
        assert_eq!(rules.date_suffix(), "0101");

        for (_, value) in rules.replacements() {
            assert_eq!(value, "ANONYMIZED");
        }
    }

    #[test]
    fn test_default_categories_are_disjoint_where_required() {
        let rules = RuleSet::from_config(&AnonymizationConfig::default()).unwrap();
        for (tag, _) in rules.replacements() {
            assert!(!rules.removes(tag));
            assert!(!rules.shifts_date(tag));
        }
    }

    #[test]
    fn test_all_options_disabled_is_empty() {
        let mut config = AnonymizationConfig::default();
        for option in RuleOption::ALL {
            config.set_option(option, false);
        }
        let rules = RuleSet::from_config(&config).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_options_map_to_categories() {
        let config = AnonymizationConfig {
            remove_patient_identifiers: false,
            regenerate_uids: false,
            placeholder: "REDACTED".to_string(),
            ..AnonymizationConfig::default()
        };
        let rules = RuleSet::from_config(&config).unwrap();

        assert!(!rules.removes(keywords::PATIENT_NAME));
        assert!(rules.removes(keywords::STUDY_INSTANCE_UID));
        assert!(rules.removes(keywords::STATION_NAME));
        assert_eq!(
            rules.replacement(keywords::OPERATORS_NAME),
            Some("REDACTED")
        );
        assert!(!rules.regenerates(keywords::SOP_INSTANCE_UID));
    }

    #[test]
    fn test_remove_replace_overlap_rejected() {
        let err = RuleSet::builder()
            .remove(keywords::PATIENT_NAME)
            .replace(keywords::PATIENT_NAME, "X")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RuleSetError::RemoveReplaceOverlap("(0010,0010)".to_string())
        );
    }

    #[test]
    fn test_replace_date_shift_overlap_rejected() {
        let err = RuleSet::builder()
            .replace(keywords::STUDY_DATE, "X")
            .date_shift(keywords::STUDY_DATE)
            .build()
            .unwrap_err();
        assert!(matches!(err, RuleSetError::ReplaceDateShiftOverlap(_)));
    }

    #[test]
    fn test_remove_and_date_shift_may_overlap() {
        let rules = RuleSet::builder()
            .remove(keywords::STUDY_DATE)
            .date_shift(keywords::STUDY_DATE)
            .build()
            .unwrap();
        assert!(rules.removes(keywords::STUDY_DATE));
        assert!(rules.shifts_date(keywords::STUDY_DATE));
    }
}
