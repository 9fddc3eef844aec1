//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the anonymizer configuration file.

use crate::anonymization::{RuleOption, RuleSet};
use crate::config::AppConfig;
use clap::Args;
use std::path::Path;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// `loaded` is the result of loading `config_path`, which already includes
    /// environment overrides and validation.
    pub async fn execute(
        &self,
        config_path: &Path,
        loaded: &crate::domain::Result<AppConfig>,
    ) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path.display(), "Validating configuration");

        println!("🔍 Validating configuration file: {}", config_path.display());
        println!();

        let config = match loaded {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let rules = match RuleSet::from_config(&config.anonymization) {
            Ok(rules) => rules,
            Err(e) => {
                println!("❌ Rule set is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!();
        print!("{}", format_config_summary(config, &rules));
        println!();
        Ok(0)
    }
}

fn enabled(config: &AppConfig, option: RuleOption) -> bool {
    let anon = &config.anonymization;
    match option {
        RuleOption::RemovePatientIdentifiers => anon.remove_patient_identifiers,
        RuleOption::RemoveStudyIdentifiers => anon.remove_study_identifiers,
        RuleOption::RemoveDeviceIdentifiers => anon.remove_device_identifiers,
        RuleOption::ReplacePhysicianInstitution => anon.replace_physician_institution,
        RuleOption::ShiftDates => anon.shift_dates,
        RuleOption::StripPrivateTags => anon.strip_private_tags,
        RuleOption::RegenerateUids => anon.regenerate_uids,
    }
}

fn format_config_summary(config: &AppConfig, rules: &RuleSet) -> String {
    let mut summary = String::from("Configuration Summary:\n");
    summary.push_str(&format!("  Log Level: {}\n", config.application.log_level));
    summary.push_str("  Rule Options:\n");
    for option in RuleOption::ALL {
        let mark = if enabled(config, option) { "✅" } else { "⏭️ " };
        summary.push_str(&format!("    {mark} {}\n", option.key()));
    }
    summary.push_str(&format!(
        "  Placeholder: {}\n",
        config.anonymization.placeholder
    ));
    summary.push_str(&format!(
        "  UID Root: {}\n",
        config
            .anonymization
            .uid_root
            .as_deref()
            .unwrap_or("2.25 (UUID-derived)")
    ));
    summary.push_str(&format!(
        "  Rules: {} remove, {} replace, {} date-shift, {} regenerate\n",
        rules.remove_tags().count(),
        rules.replacements().count(),
        rules.date_shift_tags().count(),
        rules.regenerate_tags().count()
    ));
    summary.push_str(&format!("  Extensions: {:?}\n", config.batch.extensions));
    summary.push_str(&format!(
        "  File Logging: {}\n",
        if config.logging.local_enabled {
            config.logging.local_path.as_str()
        } else {
            "disabled"
        }
    ));
    summary
}
