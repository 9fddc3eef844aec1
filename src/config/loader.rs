//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::AppConfig;
use crate::domain::errors::AnonymizerError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Configuration file looked up when none is given
pub const DEFAULT_CONFIG_FILE: &str = "dicom-anonymizer.toml";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into AppConfig
/// 4. Applies environment variable overrides (DICOM_ANON_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use dicom_anonymizer::config::loader::load_config;
///
/// let config = load_config("dicom-anonymizer.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(AnonymizerError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        AnonymizerError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let config: AppConfig = toml::from_str(&contents)
        .map_err(|e| AnonymizerError::Configuration(format!("Failed to parse TOML: {e}")))?;

    finalize(config)
}

/// Loads `path` if it exists, otherwise starts from the built-in defaults
///
/// Environment overrides and validation apply in both cases.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "No configuration file, using defaults");
        finalize(AppConfig::default())
    }
}

fn finalize(mut config: AppConfig) -> Result<AppConfig> {
    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        AnonymizerError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| AnonymizerError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        // Comments are copied verbatim
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(AnonymizerError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn env_flag(name: &str) -> Result<Option<bool>> {
    match std::env::var(name) {
        Ok(val) => val.parse().map(Some).map_err(|_| {
            AnonymizerError::Configuration(format!("Invalid {name} value '{val}': expected true or false"))
        }),
        Err(_) => Ok(None),
    }
}

/// Applies environment variable overrides using the DICOM_ANON_* prefix
///
/// Environment variables follow the pattern: DICOM_ANON_<SECTION>_<KEY>
/// For example: DICOM_ANON_APPLICATION_LOG_LEVEL, DICOM_ANON_ANONYMIZATION_SHIFT_DATES
fn apply_env_overrides(config: &mut AppConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("DICOM_ANON_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Rule option overrides
    config
        .anonymization
        .apply_env_overrides()
        .map_err(|e| AnonymizerError::Configuration(format!("{e:#}")))?;

    // Batch overrides
    if let Ok(val) = std::env::var("DICOM_ANON_BATCH_EXTENSIONS") {
        config.batch.extensions = val
            .split(',')
            .map(str::trim)
            .filter(|ext| !ext.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(follow) = env_flag("DICOM_ANON_BATCH_FOLLOW_LINKS")? {
        config.batch.follow_links = follow;
    }

    // Logging overrides
    if let Some(enabled) = env_flag("DICOM_ANON_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = enabled;
    }
    if let Ok(val) = std::env::var("DICOM_ANON_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("DICOM_ANON_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
