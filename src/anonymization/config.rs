//! Anonymization configuration
//!
//! The user-visible rule options. Every option is independently toggleable and
//! defaults to `true`; [`RuleSet::from_config`](super::RuleSet::from_config) turns
//! them into the immutable rule set used for a run.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default replacement literal for physician/institution tags
pub const DEFAULT_PLACEHOLDER: &str = "ANONYMIZED";

/// Rule options for anonymization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymizationConfig {
    /// Delete patient name, ID, birth date, age, sex, address and phone
    #[serde(default = "default_enabled")]
    pub remove_patient_identifiers: bool,

    /// Delete study/series UIDs, dates, times and descriptions
    #[serde(default = "default_enabled")]
    pub remove_study_identifiers: bool,

    /// Delete device, station and institution address tags
    #[serde(default = "default_enabled")]
    pub remove_device_identifiers: bool,

    /// Overwrite physician, operator and institution name with the placeholder
    #[serde(default = "default_enabled")]
    pub replace_physician_institution: bool,

    /// Coarsen remaining date tags to the first day of their year
    #[serde(default = "default_enabled")]
    pub shift_dates: bool,

    /// Remove every vendor/private attribute
    #[serde(default = "default_enabled")]
    pub strip_private_tags: bool,

    /// Replace SOP/Study/Series instance UIDs with fresh values
    #[serde(default = "default_enabled")]
    pub regenerate_uids: bool,

    /// Replacement literal
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Organisation UID root for regenerated UIDs (UUID-derived `2.25` arc when unset)
    #[serde(default)]
    pub uid_root: Option<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}

impl Default for AnonymizationConfig {
    fn default() -> Self {
        Self {
            remove_patient_identifiers: true,
            remove_study_identifiers: true,
            remove_device_identifiers: true,
            replace_physician_institution: true,
            shift_dates: true,
            strip_private_tags: true,
            regenerate_uids: true,
            placeholder: default_placeholder(),
            uid_root: None,
        }
    }
}

impl AnonymizationConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.replace_physician_institution && self.placeholder.trim().is_empty() {
            anyhow::bail!("placeholder cannot be empty when replace_physician_institution is enabled");
        }

        if let Some(ref root) = self.uid_root {
            crate::anonymization::uid::validate_root(root)
                .with_context(|| format!("Invalid uid_root '{root}'"))?;
        }

        Ok(())
    }

    /// Turn a single option on or off by its configuration key
    pub fn set_option(&mut self, option: RuleOption, enabled: bool) {
        match option {
            RuleOption::RemovePatientIdentifiers => self.remove_patient_identifiers = enabled,
            RuleOption::RemoveStudyIdentifiers => self.remove_study_identifiers = enabled,
            RuleOption::RemoveDeviceIdentifiers => self.remove_device_identifiers = enabled,
            RuleOption::ReplacePhysicianInstitution => {
                self.replace_physician_institution = enabled
            }
            RuleOption::ShiftDates => self.shift_dates = enabled,
            RuleOption::StripPrivateTags => self.strip_private_tags = enabled,
            RuleOption::RegenerateUids => self.regenerate_uids = enabled,
        }
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        for option in RuleOption::ALL {
            let var = format!("DICOM_ANON_ANONYMIZATION_{}", option.key().to_uppercase());
            if let Ok(val) = std::env::var(&var) {
                let enabled: bool = val
                    .parse()
                    .with_context(|| format!("Invalid {var} value"))?;
                self.set_option(option, enabled);
            }
        }

        if let Ok(val) = std::env::var("DICOM_ANON_ANONYMIZATION_PLACEHOLDER") {
            self.placeholder = val;
        }

        if let Ok(val) = std::env::var("DICOM_ANON_ANONYMIZATION_UID_ROOT") {
            self.uid_root = Some(val);
        }

        Ok(())
    }
}

/// Individually toggleable rule option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RuleOption {
    RemovePatientIdentifiers,
    RemoveStudyIdentifiers,
    RemoveDeviceIdentifiers,
    ReplacePhysicianInstitution,
    ShiftDates,
    StripPrivateTags,
    RegenerateUids,
}

impl RuleOption {
    /// Every option, in configuration file order
    pub const ALL: [RuleOption; 7] = [
        RuleOption::RemovePatientIdentifiers,
        RuleOption::RemoveStudyIdentifiers,
        RuleOption::RemoveDeviceIdentifiers,
        RuleOption::ReplacePhysicianInstitution,
        RuleOption::ShiftDates,
        RuleOption::StripPrivateTags,
        RuleOption::RegenerateUids,
    ];

    /// Configuration key of this option
    pub fn key(&self) -> &'static str {
        match self {
            RuleOption::RemovePatientIdentifiers => "remove_patient_identifiers",
            RuleOption::RemoveStudyIdentifiers => "remove_study_identifiers",
            RuleOption::RemoveDeviceIdentifiers => "remove_device_identifiers",
            RuleOption::ReplacePhysicianInstitution => "replace_physician_institution",
            RuleOption::ShiftDates => "shift_dates",
            RuleOption::StripPrivateTags => "strip_private_tags",
            RuleOption::RegenerateUids => "regenerate_uids",
        }
    }
}

impl std::str::FromStr for RuleOption {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        RuleOption::ALL
            .into_iter()
            .find(|option| option.key() == normalized)
            .ok_or_else(|| {
                format!(
                    "Unknown rule option '{s}'. Expected one of: {}",
                    RuleOption::ALL.map(|o| o.key()).join(", ")
                )
            })
    }
}
