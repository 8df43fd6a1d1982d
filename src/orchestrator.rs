//! Segmentation orchestrator.
//!
//! Drives one job end to end:
//!
//! ```text
//! JobStore::get_extracted_content → ExtractionSummary → ProposalGenerator::propose
//!     → pipeline::segment_text → SegmentationRecord → JobStore::update_field
//! ```
//!
//! The generator and the store are the only suspension points. Generator
//! failures are surfaced unchanged and never retried here.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{info_span, Instrument};

use crate::config::SegmentationConfig;
use crate::error::OrchestratorError;
use crate::generator::{ProposalGenerator, ProposalRequest};
use crate::pipeline::{self, Segmentation};
use crate::store::JobStore;
use crate::types::{ExtractedContent, ExtractionSummary, JobId, SegmentationRecord};
use crate::SEGMENTATION_SCHEMA_VERSION;

/// Runs segmentation jobs against a store and a generator.
pub struct SegmentationOrchestrator<S, G> {
    store: Arc<S>,
    generator: Arc<G>,
    config: SegmentationConfig,
}

impl<S, G> SegmentationOrchestrator<S, G>
where
    S: JobStore,
    G: ProposalGenerator,
{
    /// Create an orchestrator with default configuration.
    pub fn new(store: Arc<S>, generator: Arc<G>) -> Self {
        Self::with_config(store, generator, SegmentationConfig::default())
    }

    /// Create an orchestrator with explicit configuration.
    pub fn with_config(store: Arc<S>, generator: Arc<G>, config: SegmentationConfig) -> Self {
        Self {
            store,
            generator,
            config,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Segment a job using a freshly generated proposal.
    pub async fn run(&self, job_id: &JobId) -> Result<SegmentationRecord, OrchestratorError> {
        let span = info_span!("segmentation_job", job_id = %job_id);
        async {
            let content = self.load_content(job_id).await?;

            let request = ProposalRequest {
                job_id: job_id.clone(),
                summary: ExtractionSummary::from_content(&content, self.config.summary_preview_chars),
            };
            tracing::info!(
                pages = request.summary.pages.len(),
                figures = request.summary.figures.len(),
                tables = request.summary.tables.len(),
                "Requesting segmentation proposal"
            );

            let text = self.generator.propose(&request).await.map_err(|err| {
                tracing::warn!(error = %err, retryable = err.is_retryable(), "Proposal generation failed");
                err
            })?;

            let segmentation = pipeline::segment_text(&content, &text, self.config.cycle_policy)?;
            self.persist(job_id, segmentation).await
        }
        .instrument(span)
        .await
    }

    /// Segment a job using a proposal supplied by the caller.
    ///
    /// The generator is not called.
    pub async fn segment_with_proposal(
        &self,
        job_id: &JobId,
        proposal: &Value,
    ) -> Result<SegmentationRecord, OrchestratorError> {
        let span = info_span!("segmentation_job", job_id = %job_id, supplied_proposal = true);
        async {
            let content = self.load_content(job_id).await?;
            let segmentation = pipeline::segment(&content, proposal, self.config.cycle_policy)?;
            self.persist(job_id, segmentation).await
        }
        .instrument(span)
        .await
    }

    async fn load_content(&self, job_id: &JobId) -> Result<ExtractedContent, OrchestratorError> {
        self.store
            .get_extracted_content(job_id)
            .await
            .map_err(|err| OrchestratorError::ExtractionStore(Box::new(err)))?
            .ok_or_else(|| OrchestratorError::MissingInput { job_id: job_id.clone() })
    }

    async fn persist(
        &self,
        job_id: &JobId,
        segmentation: Segmentation,
    ) -> Result<SegmentationRecord, OrchestratorError> {
        let record = SegmentationRecord {
            job_id: job_id.clone(),
            segments: segmentation.segments,
            ordering: segmentation.ordering,
            cycle: segmentation.cycle,
            fingerprint: segmentation.fingerprint,
            schema_version: SEGMENTATION_SCHEMA_VERSION.to_string(),
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&record)
            .map_err(|err| OrchestratorError::Persistence(Box::new(err)))?;
        self.store
            .update_field(job_id, &self.config.record_field, value)
            .await
            .map_err(|err| OrchestratorError::Persistence(Box::new(err)))?;

        tracing::info!(
            segments = record.segments.len(),
            ordering = %record.ordering,
            fingerprint = %record.fingerprint,
            "Segmentation persisted"
        );
        Ok(record)
    }
}
