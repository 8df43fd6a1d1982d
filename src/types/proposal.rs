//! Typed segmentation proposal.
//!
//! Values of these types are produced by `ProposalValidator` from the
//! generator's loosely-typed response. The graph builder and assembler
//! still re-check indices they rely on, since these fields are public.

use serde::Serialize;

/// Inclusive 1-based page range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PageRange {
    /// First page (>= 1).
    pub start: u32,
    /// Last page (>= start).
    pub end: u32,
}

impl PageRange {
    /// Create a new page range.
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// A range covering one page.
    pub fn single(page: u32) -> Self {
        Self::new(page, page)
    }

    /// Whether `page` lies inside the range.
    pub fn contains(&self, page: u32) -> bool {
        self.start <= page && page <= self.end
    }
}

/// References from one proposed segment into the extraction snapshot.
///
/// Ids are not checked against the snapshot; unknown ids are dropped at
/// assembly time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentIndices {
    /// Page ranges whose text belongs to the segment.
    pub page_ranges: Vec<PageRange>,
    /// Referenced figure ids.
    pub figure_ids: Vec<String>,
    /// Referenced table ids.
    pub table_ids: Vec<String>,
    /// Referenced formula ids.
    pub formula_ids: Vec<String>,
    /// Referenced citation ids.
    pub citation_ids: Vec<String>,
}

impl ContentIndices {
    /// Indices covering the given page ranges only.
    pub fn pages(ranges: impl IntoIterator<Item = PageRange>) -> Self {
        Self {
            page_ranges: ranges.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Total number of element ids referenced.
    pub fn element_reference_count(&self) -> usize {
        self.figure_ids.len() + self.table_ids.len() + self.formula_ids.len() + self.citation_ids.len()
    }
}

/// One candidate segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalSegment {
    /// Non-empty title.
    pub title: String,
    /// Material claimed by the segment.
    pub content_indices: ContentIndices,
    /// Indices of segments this one depends on.
    pub prerequisites: Vec<usize>,
}

impl ProposalSegment {
    /// Create a proposal segment.
    pub fn new(title: impl Into<String>, content_indices: ContentIndices, prerequisites: Vec<usize>) -> Self {
        Self {
            title: title.into(),
            content_indices,
            prerequisites,
        }
    }
}

/// An ordered decomposition of a document into candidate segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SegmentationProposal {
    /// Segments in proposal order.
    pub segments: Vec<ProposalSegment>,
}

impl SegmentationProposal {
    /// Create a proposal from its segments.
    pub fn new(segments: Vec<ProposalSegment>) -> Self {
        Self { segments }
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the proposal has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
