//! Anonymization rules and engine
//!
//! This module turns the user-visible rule options into an immutable
//! [`RuleSet`] and applies it to one [`Record`](crate::domain::Record) at a time.
//!
//! # Architecture
//!
//! - **Config**: the toggleable options ([`AnonymizationConfig`])
//! - **Rules**: the remove / replace / date-shift categories plus the private purge
//!   and UID regeneration policies ([`RuleSet`])
//! - **UID generation**: collision-free identifier sources ([`uid::UidGenerator`])
//! - **Engine**: ordered, all-or-nothing application to a record
//!   ([`AnonymizationEngine`])

pub mod config;
pub mod engine;
pub mod rules;
pub mod uid;

// Re-export main types
pub use config::{AnonymizationConfig, RuleOption};
pub use engine::{AnonymizationEngine, AnonymizationOutcome};
pub use rules::{RuleSet, RuleSetBuilder};
pub use uid::{PrefixedUidGenerator, UidGenerator, UuidUidGenerator};
