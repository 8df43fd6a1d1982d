//! # segmentation-kernel
//!
//! Validated, dependency-ordered topic segmentation of extracted documents.
//!
//! The kernel answers one question:
//!
//! > Given a document's extracted content and a proposed split into topics,
//! > in which order should the topics be studied, and what does each contain?
//!
//! ## Core Contract
//!
//! 1. Reject malformed proposals with a precise, typed error
//! 2. Order segments so every prerequisite precedes its dependents
//! 3. Fall back to proposal order when prerequisites form a cycle
//! 4. Resolve every referenced page and element against the snapshot
//!
//! ## Architecture
//!
//! ```text
//! JobStore → ExtractionSummary → ProposalGenerator → parse → validate
//!     → DependencyGraph → find_cycle → order_segments → SegmentAssembler → JobStore
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same snapshot + same proposal → same titles, order, blocks and fingerprint
//! - Ties among unconstrained segments keep proposal order
//! - Prerequisite references always point to a strictly earlier segment

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod parse;
pub mod validate;
pub mod graph;
pub mod assembler;
pub mod pipeline;
pub mod canonical;
pub mod config;
pub mod error;
pub mod generator;
pub mod store;
pub mod orchestrator;
pub mod telemetry;

// Re-exports
pub use types::{
    ExtractedContent, ExtractionSummary, Page, Figure, Table, Formula, Citation,
    SegmentationProposal, ProposalSegment, ContentIndices, PageRange,
    SegmentId, ContentSegment, ContentBlock, ContentBlockType,
    JobId, OrderStrategy, SegmentationRecord,
};
pub use parse::{parse_proposal_text, strip_code_fence, ProposalParseError};
pub use validate::{
    validate_proposal, diagnose_proposal, ValidationError, ValidationErrorKind, PageRangeFault,
};
pub use graph::{DependencyGraph, Ordering, find_cycle, has_cycle, kahn_order, order_segments};
pub use assembler::{SegmentAssembler, Assembly, AssemblyReport, UnresolvedReference, DroppedPrerequisite};
pub use pipeline::{segment, segment_text, Segmentation};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex, segmentation_fingerprint};
pub use config::{CyclePolicy, SegmentationConfig};
pub use error::{SegmentationError, OrchestratorError};
pub use generator::{ProposalGenerator, ProposalRequest, GeneratorError, ScriptedGenerator};
pub use store::{JobStore, InMemoryJobStore};
#[cfg(feature = "postgres")]
pub use store::PostgresJobStore;
pub use orchestrator::SegmentationOrchestrator;
pub use telemetry::{init_tracing, LogFormat};

/// Schema version of the persisted segmentation record.
/// Increment on breaking changes to any schema type.
pub const SEGMENTATION_SCHEMA_VERSION: &str = "1.0.0";

/// Default job field the segmentation record is attached to.
pub const DEFAULT_RECORD_FIELD: &str = "contentSegments";
