//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::config::DEFAULT_CONFIG_FILE;
use clap::Args;
use std::fs;
use std::path::PathBuf;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output.display(), "Initializing configuration file");

        println!("📝 Initializing anonymizer configuration");
        println!();

        if self.output.exists() && !self.force {
            println!(
                "❌ Configuration file already exists: {}",
                self.output.display()
            );
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        match fs::write(&self.output, Self::generate_default_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output.display());
                println!();
                println!("Next steps:");
                println!("  1. Edit {} to choose the rule options", self.output.display());
                println!("  2. Validate configuration: dicom-anonymizer validate-config");
                println!("  3. Run: dicom-anonymizer anonymize <INPUT> <OUTPUT>");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate the commented default configuration
    pub fn generate_default_config() -> String {
        r#"# DICOM Anonymizer Configuration File
#
# Every value can be overridden with an environment variable named
# DICOM_ANON_<SECTION>_<KEY>, e.g. DICOM_ANON_ANONYMIZATION_SHIFT_DATES=false.
# ${VAR} references are substituted from the environment (or .env).

[application]
# Log level: trace, debug, info, warn, error
log_level = "info"

[anonymization]
# Delete patient name, ID, birth date, age, sex, address and telephone
remove_patient_identifiers = true

# Delete study/series UIDs, study/series/content dates and times, descriptions
remove_study_identifiers = true

# Delete manufacturer, model, device serial number, station name and institution address
remove_device_identifiers = true

# Overwrite referring/performing physician, operator and institution name
replace_physician_institution = true

# Coarsen the remaining date tags to the first day of their year (20210615 -> 20210101)
shift_dates = true

# Remove every vendor/private (odd group) attribute
strip_private_tags = true

# Replace SOP/Study/Series instance UIDs with freshly generated ones
regenerate_uids = true

# Literal written into replaced tags
placeholder = "ANONYMIZED"

# Organisation UID root for regenerated UIDs; the UUID-derived 2.25 arc is used when unset
# uid_root = "${DICOM_ANON_UID_ROOT}"

[batch]
# Extensions of the files treated as DICOM records (case-insensitive)
extensions = ["dcm"]

# Follow symbolic links while scanning the input directory
follow_links = false

[logging]
# Enable JSON file logging in addition to the console
local_enabled = false

# Directory for log files
local_path = "./logs"

# Log rotation: daily, hourly or never
local_rotation = "daily"
"#
        .to_string()
    }
}
