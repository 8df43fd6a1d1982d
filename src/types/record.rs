//! Persisted segmentation record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::segment::ContentSegment;

/// Identifier of a processing job.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Create a job id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// How the final order was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderStrategy {
    /// Kahn's algorithm over an acyclic prerequisite graph.
    Topological,
    /// The graph was cyclic; proposal order was kept.
    ProposalOrderFallback,
}

impl fmt::Display for OrderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topological => write!(f, "topological"),
            Self::ProposalOrderFallback => write!(f, "proposal_order_fallback"),
        }
    }
}

/// The artifact attached to a job once segmentation succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationRecord {
    /// Job the segments belong to.
    pub job_id: JobId,
    /// Segments sorted by `order`.
    pub segments: Vec<ContentSegment>,
    /// How the order was obtained.
    pub ordering: OrderStrategy,
    /// Proposal indices of the cycle that forced the fallback, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<Vec<usize>>,
    /// Id-independent fingerprint of the segment sequence.
    pub fingerprint: String,
    /// Schema version of this record.
    pub schema_version: String,
    /// When the record was produced.
    pub created_at: DateTime<Utc>,
}

impl SegmentationRecord {
    /// Whether the cycle fallback was used.
    pub fn used_fallback(&self) -> bool {
        self.ordering == OrderStrategy::ProposalOrderFallback
    }

    /// Segment titles in final order.
    pub fn titles(&self) -> Vec<&str> {
        self.segments.iter().map(|s| s.title.as_str()).collect()
    }
}
