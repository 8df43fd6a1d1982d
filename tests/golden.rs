//! Golden tests for the segmentation kernel.
//!
//! These tests verify determinism and correctness of the pipeline and the
//! orchestrator on fixed scenarios.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::{json, Value};
use segmentation_kernel::{
    segment, segment_text, ContentBlockType, CyclePolicy, ExtractedContent, GeneratorError,
    InMemoryJobStore, JobId, OrchestratorError, OrderStrategy, ScriptedGenerator,
    SegmentationError, SegmentationOrchestrator, SegmentationRecord, ValidationErrorKind,
};

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn make_textbook() -> ExtractedContent {
    ExtractedContent::new()
        .with_page(1, "Chapter 1. Sets")
        .with_page(2, "Chapter 2. Functions")
        .with_page(3, "")
        .with_page(4, "Chapter 3. Cardinality")
        .with_figure("fig-venn", 1, "Venn diagram")
        .with_table("tab-maps", 2, "| injective | surjective |")
        .with_formula("eq-cantor", 4, "|A| < |P(A)|")
        .with_citation("cite-cantor", 4, "Cantor, 1891")
}

fn seg(title: &str, pages: Value, prerequisites: Value) -> Value {
    json!({
        "title": title,
        "contentIndices": {"pageRanges": pages},
        "prerequisites": prerequisites,
    })
}

fn linear_chain() -> Value {
    json!({
        "segments": [
            seg("Sets", json!([[1, 1]]), json!([])),
            seg("Functions", json!([[2, 3]]), json!([0])),
            seg("Cardinality", json!([[4, 4]]), json!([1])),
        ]
    })
}

fn make_store(job: &str) -> Arc<InMemoryJobStore> {
    let store = InMemoryJobStore::new();
    store.insert_job(JobId::new(job), make_textbook());
    Arc::new(store)
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_linear_chain() {
    let result = segment(&make_textbook(), &linear_chain(), CyclePolicy::Fallback).unwrap();

    let titles: Vec<_> = result.segments.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Sets", "Functions", "Cardinality"]);
    assert_eq!(result.ordering, OrderStrategy::Topological);

    assert!(result.segments[0].prerequisites.is_empty());
    assert_eq!(result.segments[1].prerequisites, vec![result.segments[0].id]);
    assert_eq!(result.segments[2].prerequisites, vec![result.segments[1].id]);

    // page 3 is blank
    assert_eq!(result.segments[1].content_blocks.len(), 1);
}

#[test]
fn test_dependencies_reorder_proposal() {
    let raw = json!({
        "segments": [
            seg("Cardinality", json!([[4, 4]]), json!([2])),
            seg("Sets", json!([[1, 1]]), json!([])),
            seg("Functions", json!([[2, 2]]), json!([1])),
        ]
    });
    let result = segment(&make_textbook(), &raw, CyclePolicy::Fallback).unwrap();

    let titles: Vec<_> = result.segments.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Sets", "Functions", "Cardinality"]);
    for (order, segment) in result.segments.iter().enumerate() {
        assert_eq!(segment.order, order);
    }
}

#[test]
fn test_cycle_falls_back_to_proposal_order() {
    let raw = json!({
        "segments": [
            seg("Sets", json!([[1, 1]]), json!([2])),
            seg("Functions", json!([[2, 2]]), json!([0])),
            seg("Cardinality", json!([[4, 4]]), json!([1])),
        ]
    });
    let result = segment(&make_textbook(), &raw, CyclePolicy::Fallback).unwrap();

    assert_eq!(result.ordering, OrderStrategy::ProposalOrderFallback);
    let titles: Vec<_> = result.segments.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Sets", "Functions", "Cardinality"]);

    // The forward reference 0 → 2 is stripped, backward ones survive.
    assert!(result.segments[0].prerequisites.is_empty());
    assert_eq!(result.segments[1].prerequisites, vec![result.segments[0].id]);
    assert_eq!(result.segments[2].prerequisites, vec![result.segments[1].id]);
    assert_eq!(result.report.dropped_prerequisites.len(), 1);
}

#[test]
fn test_hallucinated_id_dropped() {
    let raw = json!({
        "segments": [{
            "title": "Sets",
            "contentIndices": {
                "pageRanges": [[1, 1]],
                "figureIds": ["fig-venn", "fig-imaginary"],
                "tableIds": ["tab-maps"],
                "formulaIds": ["eq-cantor"],
                "citationIds": ["cite-nobody"],
            },
            "prerequisites": [],
        }]
    });
    let result = segment(&make_textbook(), &raw, CyclePolicy::Fallback).unwrap();
    let segment = &result.segments[0];

    assert_eq!(segment.count_blocks(ContentBlockType::Text), 1);
    assert_eq!(segment.count_blocks(ContentBlockType::Figure), 1);
    assert_eq!(segment.count_blocks(ContentBlockType::Table), 1);
    assert_eq!(segment.count_blocks(ContentBlockType::Formula), 1);
    assert_eq!(segment.count_blocks(ContentBlockType::Citation), 0);

    let unresolved: BTreeSet<_> = result.report.unresolved.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(unresolved, BTreeSet::from(["fig-imaginary", "cite-nobody"]));
}

#[test]
fn test_each_rejection_kind() {
    let cases = vec![
        (json!({"segments": []}), ValidationErrorKind::EmptyProposal),
        (json!({"segments": [42]}), ValidationErrorKind::MalformedSegment),
        (json!({"segments": [{"title": "  ", "contentIndices": {}}]}), ValidationErrorKind::EmptyTitle),
        (json!({"segments": [{"title": "A"}]}), ValidationErrorKind::MissingContentIndices),
        (
            json!({"segments": [{"title": "A", "contentIndices": {"pageRanges": [[3, 1]]}}]}),
            ValidationErrorKind::BadPageRange,
        ),
        (
            json!({"segments": [{"title": "A", "contentIndices": {"figureIds": "fig-1"}}]}),
            ValidationErrorKind::BadIdListType,
        ),
        (
            json!({"segments": [{"title": "A", "contentIndices": {"tableIds": [7]}}]}),
            ValidationErrorKind::BadIdElement,
        ),
        (
            json!({"segments": [{"title": "A", "contentIndices": {}, "prerequisites": "0"}]}),
            ValidationErrorKind::BadPrerequisiteList,
        ),
        (
            json!({"segments": [{"title": "A", "contentIndices": {}, "prerequisites": [5]}]}),
            ValidationErrorKind::BadPrerequisiteIndex,
        ),
        (
            json!({"segments": [{"title": "A", "contentIndices": {}, "prerequisites": [0]}]}),
            ValidationErrorKind::SelfReferentialPrerequisite,
        ),
    ];

    for (raw, expected) in cases {
        match segment(&make_textbook(), &raw, CyclePolicy::Fallback) {
            Err(SegmentationError::Validation(err)) => assert_eq!(err.kind(), expected, "{raw}"),
            other => panic!("expected {expected:?} for {raw}, got {other:?}"),
        }
    }
}

#[test]
fn test_fenced_response_accepted() {
    let text = format!("```json\n{}\n```", linear_chain());
    let result = segment_text(&make_textbook(), &text, CyclePolicy::Fallback).unwrap();
    assert_eq!(result.segments.len(), 3);
}

// ─────────────────────────────────────────────────────────────────────────────
// Determinism
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_same_proposal_same_segments_100_runs() {
    let content = make_textbook();
    let raw = linear_chain();
    let first = segment(&content, &raw, CyclePolicy::Fallback).unwrap();

    for _ in 0..100 {
        let run = segment(&content, &raw, CyclePolicy::Fallback).unwrap();
        assert_eq!(run.fingerprint, first.fingerprint);
        for (a, b) in run.segments.iter().zip(&first.segments) {
            assert_eq!(a.title, b.title);
            assert_eq!(a.order, b.order);
            assert_eq!(a.content_blocks, b.content_blocks);
            assert_eq!(a.prerequisites.len(), b.prerequisites.len());
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_orchestrator_end_to_end() {
    let store = make_store("job-golden");
    let generator = Arc::new(
        ScriptedGenerator::new().with_response(format!("```json\n{}\n```", linear_chain())),
    );
    let orchestrator = SegmentationOrchestrator::new(store.clone(), generator);

    let job = JobId::new("job-golden");
    let record = orchestrator.run(&job).await.unwrap();
    assert_eq!(record.titles(), vec!["Sets", "Functions", "Cardinality"]);
    assert!(!record.used_fallback());

    let stored: SegmentationRecord =
        serde_json::from_value(store.field(&job, "contentSegments").unwrap()).unwrap();
    assert_eq!(stored.fingerprint, record.fingerprint);
    assert_eq!(stored.segments, record.segments);
}

#[tokio::test]
async fn test_orchestrator_record_wire_shape() {
    let store = make_store("job-wire");
    let orchestrator = SegmentationOrchestrator::new(store.clone(), Arc::new(ScriptedGenerator::new()));

    let job = JobId::new("job-wire");
    orchestrator.segment_with_proposal(&job, &linear_chain()).await.unwrap();

    let stored = store.field(&job, "contentSegments").unwrap();
    let first = &stored["segments"][0];
    assert!(first["id"].is_string());
    assert_eq!(first["order"], json!(0));
    assert_eq!(first["contentBlocks"][0]["type"], json!("text"));
    assert_eq!(first["contentBlocks"][0]["pageReference"], json!(1));
    assert_eq!(stored["ordering"], json!("topological"));
    assert!(stored.get("cycle").is_none());
}

#[tokio::test]
async fn test_orchestrator_parse_error() {
    let store = make_store("job-prose");
    let generator = Arc::new(ScriptedGenerator::new().with_response("I could not segment this document."));
    let orchestrator = SegmentationOrchestrator::new(store.clone(), generator);

    let job = JobId::new("job-prose");
    let err = orchestrator.run(&job).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::Segmentation(SegmentationError::Parse(_))));
    assert!(err.is_bad_proposal());
    assert!(store.field(&job, "contentSegments").is_none());
}

#[tokio::test]
async fn test_orchestrator_rate_limit_passthrough() {
    let store = make_store("job-busy");
    let generator = Arc::new(
        ScriptedGenerator::new().with_error(GeneratorError::RateLimited { retry_after: None }),
    );
    let orchestrator = SegmentationOrchestrator::new(store, generator.clone());

    let err = orchestrator.run(&JobId::new("job-busy")).await.unwrap_err();
    match err {
        OrchestratorError::Generator(inner) => assert!(inner.is_retryable()),
        other => panic!("expected generator error, got {other:?}"),
    }
    assert_eq!(generator.requests().len(), 1);
}

#[tokio::test]
async fn test_orchestrator_missing_extraction() {
    let store = InMemoryJobStore::new();
    store.insert_empty_job(JobId::new("job-empty"));
    let orchestrator = SegmentationOrchestrator::new(Arc::new(store), Arc::new(ScriptedGenerator::new()));

    let err = orchestrator.run(&JobId::new("job-empty")).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::MissingInput { .. }));
}
