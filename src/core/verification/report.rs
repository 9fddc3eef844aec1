//! Verification report structures
//!
//! This module defines the structures for reporting verification results.

use crate::domain::TagId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One sensitive tag as it appears in a verification report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitiveTag {
    /// Tag identifier
    pub tag: TagId,

    /// Keyword, or the tag literal for tags outside the keyword table
    pub name: String,
}

impl SensitiveTag {
    pub fn new(tag: TagId) -> Self {
        Self {
            tag,
            name: tag
                .keyword()
                .map(str::to_string)
                .unwrap_or_else(|| tag.to_string()),
        }
    }
}

/// Comparison of an original record against its anonymized counterpart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// When the verification was performed
    pub verified_at: DateTime<Utc>,

    /// Attributes in the original record
    pub original_count: usize,

    /// Attributes in the anonymized record
    pub anonymized_count: usize,

    /// `original_count - anonymized_count`; negative when attributes were added
    pub tags_removed: i64,

    /// Sensitive tags still present in the anonymized record with a real value
    pub still_present: Vec<SensitiveTag>,

    /// Sensitive tags kept in the anonymized record with the placeholder value
    #[serde(default)]
    pub replaced: Vec<SensitiveTag>,

    /// Sensitive tags present in the original but absent from the anonymized record
    pub removed: Vec<SensitiveTag>,

    /// Sensitive tags absent from both records
    pub never_present: Vec<SensitiveTag>,

    /// Whether the anonymized record carries pixel data (informational)
    pub pixel_data_present: bool,

    /// Whether the pixel payload digests match; `None` unless both records carry one
    pub pixel_data_unchanged: Option<bool>,
}

impl VerificationReport {
    /// Check if no sensitive value survived; replaced tags do not count
    pub fn is_clean(&self) -> bool {
        self.still_present.is_empty()
    }

    /// Format the report as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("📊 Verification Report\n");
        summary.push_str(&format!("  Verified at: {}\n", self.verified_at));
        summary.push_str(&format!("  Original tags: {}\n", self.original_count));
        summary.push_str(&format!("  Anonymized tags: {}\n", self.anonymized_count));
        summary.push_str(&format!("  Tags removed: {}\n", self.tags_removed));
        summary.push_str(&format!(
            "  Pixel data present: {}\n",
            if self.pixel_data_present { "yes" } else { "no" }
        ));
        match self.pixel_data_unchanged {
            Some(true) => summary.push_str("  ✅ Pixel data unchanged\n"),
            Some(false) => summary.push_str("  ❌ Pixel data changed\n"),
            None => {}
        }

        summary.push('\n');
        if self.is_clean() {
            summary.push_str("✅ No sensitive tags remain\n");
        } else {
            summary.push_str("❌ Sensitive tags still present:\n");
            for tag in &self.still_present {
                summary.push_str(&format!("  - {} {}\n", tag.tag, tag.name));
            }
        }

        if !self.replaced.is_empty() {
            summary.push_str("\n🔁 Replaced with placeholder:\n");
            for tag in &self.replaced {
                summary.push_str(&format!("  - {} {}\n", tag.tag, tag.name));
            }
        }

        if !self.removed.is_empty() {
            summary.push_str("\n✅ Removed:\n");
            for tag in &self.removed {
                summary.push_str(&format!("  - {} {}\n", tag.tag, tag.name));
            }
        }

        summary
    }
}
