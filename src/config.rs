//! Segmentation configuration.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `SEGMENTATION_CYCLE_POLICY`: `fallback` or `reject` (default: fallback)
//! - `SEGMENTATION_SUMMARY_PREVIEW_CHARS`: characters of text per summary entry (default: 400)
//! - `SEGMENTATION_RECORD_FIELD`: job field the record is attached to (default: contentSegments)

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DEFAULT_RECORD_FIELD;

/// Default number of characters kept per summary entry.
pub const DEFAULT_SUMMARY_PREVIEW_CHARS: usize = 400;

/// What to do when the prerequisite graph is cyclic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    /// Keep proposal order and strip forward references.
    #[default]
    Fallback,
    /// Fail the job so the caller can request a new proposal.
    Reject,
}

impl CyclePolicy {
    /// Parse a cycle policy from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fallback" | "" => Some(Self::Fallback),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

impl fmt::Display for CyclePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fallback => write!(f, "fallback"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

/// Settings for one orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Cycle handling.
    pub cycle_policy: CyclePolicy,
    /// Characters of text per entry in the summary sent to the generator.
    pub summary_preview_chars: usize,
    /// Name of the job field the record is attached to.
    pub record_field: String,
}

impl SegmentationConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let cycle_policy = match lookup("SEGMENTATION_CYCLE_POLICY") {
            Some(raw) => CyclePolicy::from_str(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "Unknown SEGMENTATION_CYCLE_POLICY, using fallback");
                CyclePolicy::Fallback
            }),
            None => defaults.cycle_policy,
        };
        Self {
            cycle_policy,
            summary_preview_chars: lookup("SEGMENTATION_SUMMARY_PREVIEW_CHARS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.summary_preview_chars),
            record_field: lookup("SEGMENTATION_RECORD_FIELD")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.record_field),
        }
    }

    /// Set the cycle policy.
    pub fn with_cycle_policy(mut self, cycle_policy: CyclePolicy) -> Self {
        self.cycle_policy = cycle_policy;
        self
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            cycle_policy: CyclePolicy::Fallback,
            summary_preview_chars: DEFAULT_SUMMARY_PREVIEW_CHARS,
            record_field: DEFAULT_RECORD_FIELD.to_string(),
        }
    }
}
