//! Error taxonomy for the pipeline and the orchestrator.

use crate::generator::GeneratorError;
use crate::parse::ProposalParseError;
use crate::types::JobId;
use crate::validate::ValidationError;

/// Boxed collaborator error, kept as `source` without reinterpretation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A proposal could not be turned into segments.
#[derive(Debug, thiserror::Error)]
pub enum SegmentationError {
    /// The response text is not JSON.
    #[error(transparent)]
    Parse(#[from] ProposalParseError),

    /// The JSON is not a well-formed proposal.
    #[error("Proposal rejected: {0}")]
    Validation(#[from] ValidationError),

    /// Prerequisites form a cycle and the cycle policy rejects it.
    #[error("Prerequisite cycle through segments {cycle:?}")]
    CyclicProposal {
        /// Proposal indices on the cycle, in path order.
        cycle: Vec<usize>,
    },
}

/// A segmentation job failed.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// No extraction snapshot exists for the job.
    #[error("No extracted content for job {job_id}")]
    MissingInput {
        /// The job that was requested.
        job_id: JobId,
    },

    /// The proposal generator failed.
    #[error("Proposal generation failed: {0}")]
    Generator(#[from] GeneratorError),

    /// The proposal could not be segmented.
    #[error(transparent)]
    Segmentation(#[from] SegmentationError),

    /// Reading the extraction snapshot failed.
    #[error("Failed to read extracted content: {0}")]
    ExtractionStore(#[source] BoxError),

    /// Attaching the record to the job failed.
    #[error("Failed to persist segmentation: {0}")]
    Persistence(#[source] BoxError),
}

impl OrchestratorError {
    /// Whether the failure came from the proposal itself.
    ///
    /// Such jobs may succeed with a freshly generated proposal.
    pub fn is_bad_proposal(&self) -> bool {
        matches!(self, Self::Segmentation(_))
            || matches!(self, Self::Generator(GeneratorError::MalformedResponse { .. }))
    }
}
