//! Core types for the segmentation kernel.

pub mod extraction;
pub mod proposal;
pub mod segment;
pub mod record;

pub use extraction::{
    ExtractedContent, ExtractionIndex, ExtractionSummary, ElementPreview, PagePreview,
    Page, Figure, Table, Formula, Citation, ReferencedElement,
};
pub use proposal::{SegmentationProposal, ProposalSegment, ContentIndices, PageRange};
pub use segment::{SegmentId, ContentSegment, ContentBlock, ContentBlockType};
pub use record::{JobId, OrderStrategy, SegmentationRecord};
