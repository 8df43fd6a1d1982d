//! Pure segmentation pipeline.
//!
//! ```text
//! raw JSON → validate → DependencyGraph → order_segments → SegmentAssembler → Segmentation
//! ```
//!
//! No I/O and no shared state: the same snapshot and proposal always yield
//! the same segments up to freshly generated ids.

use serde_json::Value;

use crate::assembler::{AssemblyReport, SegmentAssembler};
use crate::canonical::segmentation_fingerprint;
use crate::config::CyclePolicy;
use crate::error::SegmentationError;
use crate::graph::{order_segments, DependencyGraph};
use crate::parse::parse_proposal_text;
use crate::types::{ContentSegment, ExtractedContent, OrderStrategy};
use crate::validate::{diagnose_proposal, validate_proposal};

/// Output of one pipeline run.
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Segments sorted by `order`.
    pub segments: Vec<ContentSegment>,
    /// How the order was obtained.
    pub ordering: OrderStrategy,
    /// Cycle that forced the fallback, if any.
    pub cycle: Option<Vec<usize>>,
    /// References dropped during assembly.
    pub report: AssemblyReport,
    /// Id-independent fingerprint of `segments`.
    pub fingerprint: String,
}

impl Segmentation {
    /// Whether the cycle fallback was used.
    pub fn used_fallback(&self) -> bool {
        self.ordering == OrderStrategy::ProposalOrderFallback
    }
}

/// Segment a snapshot according to an already-parsed proposal.
pub fn segment(
    content: &ExtractedContent,
    raw: &Value,
    policy: CyclePolicy,
) -> Result<Segmentation, SegmentationError> {
    let proposal = validate_proposal(raw).map_err(|err| {
        let diagnostics = diagnose_proposal(raw);
        tracing::warn!(
            error = %err,
            failing_segments = diagnostics.len(),
            "Proposal failed validation"
        );
        for diagnostic in diagnostics.iter().skip(1) {
            tracing::debug!(error = %diagnostic, "Further validation failure");
        }
        err
    })?;

    let graph = DependencyGraph::build(&proposal);
    tracing::debug!(
        segments = graph.node_count(),
        edges = graph.edge_count(),
        "Built prerequisite graph"
    );

    let ordering = order_segments(&graph);
    if let (CyclePolicy::Reject, Some(cycle)) = (policy, ordering.cycle()) {
        return Err(SegmentationError::CyclicProposal { cycle: cycle.to_vec() });
    }

    let assembly = SegmentAssembler::new(content).assemble(&proposal, &ordering);
    if !assembly.report.is_clean() {
        tracing::warn!(
            unresolved = assembly.report.unresolved.len(),
            dropped_prerequisites = assembly.report.dropped_prerequisites.len(),
            empty_page_ranges = assembly.report.empty_page_ranges,
            "Assembly dropped references"
        );
    }

    let fingerprint = segmentation_fingerprint(&assembly.segments);
    Ok(Segmentation {
        segments: assembly.segments,
        ordering: ordering.strategy(),
        cycle: ordering.cycle().map(<[usize]>::to_vec),
        report: assembly.report,
        fingerprint,
    })
}

/// Segment a snapshot according to a raw generator response.
pub fn segment_text(
    content: &ExtractedContent,
    text: &str,
    policy: CyclePolicy,
) -> Result<Segmentation, SegmentationError> {
    let raw = parse_proposal_text(text)?;
    segment(content, &raw, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ValidationErrorKind;
    use serde_json::json;

    fn content() -> ExtractedContent {
        ExtractedContent::new()
            .with_page(1, "Vectors")
            .with_page(2, "Matrices")
            .with_page(3, "Eigenvalues")
    }

    fn chain() -> Value {
        json!({
            "segments": [
                {"title": "Vectors", "contentIndices": {"pageRanges": [[1, 1]]}, "prerequisites": []},
                {"title": "Matrices", "contentIndices": {"pageRanges": [[2, 2]]}, "prerequisites": [0]},
                {"title": "Eigenvalues", "contentIndices": {"pageRanges": [[3, 3]]}, "prerequisites": [1]}
            ]
        })
    }

    #[test]
    fn test_linear_chain() {
        let result = segment(&content(), &chain(), CyclePolicy::Fallback).unwrap();
        assert_eq!(result.ordering, OrderStrategy::Topological);
        assert_eq!(result.segments.len(), 3);
        assert_eq!(result.segments[2].prerequisites, vec![result.segments[1].id]);
        assert!(result.report.is_clean());
    }

    #[test]
    fn test_cycle_policies() {
        let raw = json!({
            "segments": [
                {"title": "A", "contentIndices": {}, "prerequisites": [1]},
                {"title": "B", "contentIndices": {}, "prerequisites": [0]}
            ]
        });

        let fallback = segment(&content(), &raw, CyclePolicy::Fallback).unwrap();
        assert!(fallback.used_fallback());
        assert_eq!(fallback.cycle, Some(vec![0, 1]));

        let rejected = segment(&content(), &raw, CyclePolicy::Reject).unwrap_err();
        assert!(matches!(rejected, SegmentationError::CyclicProposal { .. }));
    }

    #[test]
    fn test_validation_failure_is_surfaced() {
        let raw = json!({"segments": [{"title": "", "contentIndices": {}}]});
        match segment(&content(), &raw, CyclePolicy::Fallback) {
            Err(SegmentationError::Validation(err)) => {
                assert_eq!(err.kind(), ValidationErrorKind::EmptyTitle)
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_segment_text_strips_fence() {
        let text = format!("```json\n{}\n```", chain());
        let result = segment_text(&content(), &text, CyclePolicy::Fallback).unwrap();
        assert_eq!(result.segments.len(), 3);
    }

    #[test]
    fn test_segment_text_rejects_prose() {
        let err = segment_text(&content(), "Sure! Here are your segments.", CyclePolicy::Fallback)
            .unwrap_err();
        assert!(matches!(err, SegmentationError::Parse(_)));
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = segment(&content(), &chain(), CyclePolicy::Fallback).unwrap();
        let b = segment(&content(), &chain(), CyclePolicy::Fallback).unwrap();
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_ne!(a.segments[0].id, b.segments[0].id);
    }
}
