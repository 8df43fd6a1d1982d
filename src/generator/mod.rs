//! Proposal generation seam.
//!
//! A `ProposalGenerator` receives a compact summary of the extracted content
//! and returns the raw response text. Parsing and validation happen in the
//! pipeline; generators never interpret their own output.

pub mod scripted;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::{ExtractionSummary, JobId};

/// Input sent to a proposal generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRequest {
    /// Job being segmented.
    pub job_id: JobId,
    /// What the document contains.
    pub summary: ExtractionSummary,
}

/// A proposal generator failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeneratorError {
    /// No response within the deadline.
    #[error("Proposal generator timed out after {elapsed:?}")]
    Timeout {
        /// How long the call ran.
        elapsed: Duration,
    },

    /// The provider refused the call for quota reasons.
    #[error("Proposal generator rate limited (retry after {retry_after:?})")]
    RateLimited {
        /// Suggested wait, when the provider sent one.
        retry_after: Option<Duration>,
    },

    /// The provider answered with something that is not a response body.
    #[error("Malformed generator response: {message}")]
    MalformedResponse {
        /// Description of the problem.
        message: String,
    },

    /// Any other provider failure.
    #[error("Proposal generator failed: {message}")]
    Provider {
        /// Provider error message.
        message: String,
    },
}

impl GeneratorError {
    /// Whether retrying the same request may succeed.
    ///
    /// The orchestrator never retries; this is for callers that do.
    pub fn is_retryable(&self) -> bool {
        match self {
            GeneratorError::Timeout { .. } => true,
            GeneratorError::RateLimited { .. } => true,
            GeneratorError::MalformedResponse { .. } => false,
            GeneratorError::Provider { .. } => false,
        }
    }
}

/// Produces a segmentation proposal for a document summary.
#[async_trait]
pub trait ProposalGenerator: Send + Sync {
    /// Return the raw proposal text for a request.
    async fn propose(&self, request: &ProposalRequest) -> Result<String, GeneratorError>;
}

pub use scripted::ScriptedGenerator;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(GeneratorError::Timeout { elapsed: Duration::from_secs(30) }.is_retryable());
        assert!(GeneratorError::RateLimited { retry_after: None }.is_retryable());
        assert!(!GeneratorError::MalformedResponse { message: "empty body".into() }.is_retryable());
        assert!(!GeneratorError::Provider { message: "invalid key".into() }.is_retryable());
    }
}
