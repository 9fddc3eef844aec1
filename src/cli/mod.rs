//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the anonymizer using clap.

pub mod commands;

use crate::config::{load_config, load_config_or_default, AppConfig, DEFAULT_CONFIG_FILE};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DICOM Anonymizer - rule-driven metadata redaction for medical images
#[derive(Parser, Debug)]
#[command(name = "dicom-anonymizer")]
#[command(version, about, long_about = None)]
#[command(author = "DICOM Anonymizer Contributors")]
pub struct Cli {
    /// Path to configuration file [default: dicom-anonymizer.toml, if present]
    #[arg(short, long, env = "DICOM_ANON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "DICOM_ANON_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Configuration file the commands read
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load the configuration
    ///
    /// An explicitly passed file must exist; the default file is optional.
    pub fn load_config(&self) -> crate::domain::Result<AppConfig> {
        match &self.config {
            Some(path) => load_config(path),
            None => load_config_or_default(DEFAULT_CONFIG_FILE),
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Anonymize every DICOM file under a directory tree
    Anonymize(commands::anonymize::AnonymizeArgs),

    /// Anonymize a single DICOM file
    AnonymizeFile(commands::anonymize_file::AnonymizeFileArgs),

    /// Show the metadata of a DICOM file
    Inspect(commands::inspect::InspectArgs),

    /// Check an anonymized file against its original
    Verify(commands::verify::VerifyArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::RuleOption;

    #[test]
    fn test_cli_parse_anonymize() {
        let cli = Cli::parse_from(["dicom-anonymizer", "anonymize", "in", "out"]);
        assert!(cli.config.is_none());
        assert_eq!(cli.config_path(), PathBuf::from(DEFAULT_CONFIG_FILE));
        match cli.command {
            Commands::Anonymize(args) => {
                assert_eq!(args.input, PathBuf::from("in"));
                assert_eq!(args.output, PathBuf::from("out"));
                assert!(args.disable.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_disable_options() {
        let cli = Cli::parse_from([
            "dicom-anonymizer",
            "anonymize",
            "in",
            "out",
            "--disable",
            "shift-dates",
            "--disable",
            "strip-private-tags",
        ]);
        match cli.command {
            Commands::Anonymize(args) => assert_eq!(
                args.disable,
                vec![RuleOption::ShiftDates, RuleOption::StripPrivateTags]
            ),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["dicom-anonymizer", "--config", "custom.toml", "init"]);
        assert_eq!(cli.config_path(), PathBuf::from("custom.toml"));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["dicom-anonymizer", "--log-level", "debug", "validate-config"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_inspect_defaults() {
        let cli = Cli::parse_from(["dicom-anonymizer", "inspect", "scan.dcm"]);
        match cli.command {
            Commands::Inspect(args) => {
                assert_eq!(args.limit, 100);
                assert_eq!(args.max_value_len, 100);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_verify_and_single_file() {
        let cli = Cli::parse_from(["dicom-anonymizer", "verify", "a.dcm", "b.dcm"]);
        assert!(matches!(cli.command, Commands::Verify(_)));

        let cli = Cli::parse_from(["dicom-anonymizer", "anonymize-file", "a.dcm", "b.dcm"]);
        assert!(matches!(cli.command, Commands::AnonymizeFile(_)));
    }

    #[test]
    fn test_load_explicit_missing_config_fails() {
        let cli = Cli::parse_from([
            "dicom-anonymizer",
            "--config",
            "/nonexistent/dicom-anonymizer.toml",
            "validate-config",
        ]);
        assert!(cli.load_config().is_err());
    }
}
