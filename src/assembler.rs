//! Segment assembly.
//!
//! Turns a validated proposal and its ordering into the final
//! `ContentSegment` list:
//!
//! 1. Visit proposal segments in final order
//! 2. Emit one text block per existing, non-blank page in each range
//! 3. Emit one block per resolved figure, table, formula and citation id
//! 4. Assign a fresh `SegmentId`
//! 5. Keep a prerequisite only if its final order is strictly smaller
//!
//! Step 5 is what keeps references backward-only when the ordering is the
//! cycle fallback. Unresolved ids and dropped prerequisites are not errors;
//! they are collected in an `AssemblyReport`.

use std::collections::BTreeSet;

use crate::graph::Ordering;
use crate::types::{
    ContentBlock, ContentBlockType, ContentIndices, ContentSegment, ExtractedContent,
    ExtractionIndex, ReferencedElement, SegmentId, SegmentationProposal,
};

/// An element id the extraction snapshot does not contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    /// Proposal index of the referencing segment.
    pub segment: usize,
    /// Kind of element referenced.
    pub block_type: ContentBlockType,
    /// The unknown id.
    pub id: String,
}

/// A prerequisite claim removed because it did not point strictly backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DroppedPrerequisite {
    /// Proposal index of the dependent segment.
    pub segment: usize,
    /// Proposal index of the claimed prerequisite.
    pub prerequisite: usize,
}

/// Everything assembly silently dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Ids with no match in the snapshot.
    pub unresolved: Vec<UnresolvedReference>,
    /// Prerequisites pointing forward, to the segment itself, or out of range.
    pub dropped_prerequisites: Vec<DroppedPrerequisite>,
    /// Page ranges that produced no text at all.
    pub empty_page_ranges: usize,
}

impl AssemblyReport {
    /// Whether nothing was dropped.
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty() && self.dropped_prerequisites.is_empty() && self.empty_page_ranges == 0
    }
}

/// Output of assembly.
#[derive(Debug, Clone)]
pub struct Assembly {
    /// Segments sorted by `order`.
    pub segments: Vec<ContentSegment>,
    /// What was dropped along the way.
    pub report: AssemblyReport,
}

/// Resolves proposal segments against one extraction snapshot.
pub struct SegmentAssembler<'a> {
    index: ExtractionIndex<'a>,
}

impl<'a> SegmentAssembler<'a> {
    /// Create an assembler over a snapshot.
    pub fn new(content: &'a ExtractedContent) -> Self {
        Self {
            index: content.index(),
        }
    }

    /// Assemble all segments in the given order.
    ///
    /// `ordering` should come from `order_segments` for the same proposal;
    /// an ordering of a different length is replaced by proposal order.
    pub fn assemble(&self, proposal: &SegmentationProposal, ordering: &Ordering) -> Assembly {
        if ordering.len() != proposal.len() {
            tracing::warn!(
                ordered = ordering.len(),
                proposed = proposal.len(),
                "Ordering does not match proposal, using proposal order"
            );
            return self.assemble(proposal, &Ordering::proposal_order(proposal.len()));
        }

        let positions = ordering.positions();
        let mut report = AssemblyReport::default();
        let mut segments: Vec<ContentSegment> = Vec::with_capacity(ordering.len());

        for (order, &index) in ordering.permutation().iter().enumerate() {
            let proposed = &proposal.segments[index];
            let content_blocks = self.resolve_blocks(index, &proposed.content_indices, &mut report);

            let mut seen = BTreeSet::new();
            let mut prerequisites = Vec::new();
            for &prerequisite in &proposed.prerequisites {
                match positions.get(prerequisite) {
                    Some(&prerequisite_order) if prerequisite_order < order => {
                        if seen.insert(prerequisite_order) {
                            prerequisites.push(segments[prerequisite_order].id);
                        }
                    }
                    _ => {
                        tracing::debug!(
                            segment = index,
                            prerequisite,
                            "Dropping prerequisite that does not precede its segment"
                        );
                        report.dropped_prerequisites.push(DroppedPrerequisite { segment: index, prerequisite });
                    }
                }
            }

            segments.push(ContentSegment {
                id: SegmentId::generate(),
                title: proposed.title.clone(),
                order,
                content_blocks,
                prerequisites,
            });
        }

        Assembly { segments, report }
    }

    fn resolve_blocks(
        &self,
        segment: usize,
        indices: &ContentIndices,
        report: &mut AssemblyReport,
    ) -> Vec<ContentBlock> {
        let mut blocks = Vec::new();

        for range in &indices.page_ranges {
            let before = blocks.len();
            blocks.extend(
                self.index
                    .pages_in(range.start, range.end)
                    .filter(|page| !page.is_blank())
                    .map(|page| ContentBlock::text(page.text.clone(), page.page_number)),
            );
            if blocks.len() == before {
                report.empty_page_ranges += 1;
            }
        }

        resolve_elements(segment, &indices.figure_ids, |id| self.index.figure(id), &mut blocks, report);
        resolve_elements(segment, &indices.table_ids, |id| self.index.table(id), &mut blocks, report);
        resolve_elements(segment, &indices.formula_ids, |id| self.index.formula(id), &mut blocks, report);
        resolve_elements(segment, &indices.citation_ids, |id| self.index.citation(id), &mut blocks, report);

        blocks
    }
}

fn resolve_elements<'e, T, F>(
    segment: usize,
    ids: &[String],
    lookup: F,
    blocks: &mut Vec<ContentBlock>,
    report: &mut AssemblyReport,
) where
    T: ReferencedElement + 'e,
    F: Fn(&str) -> Option<&'e T>,
{
    for id in ids {
        match lookup(id) {
            Some(element) => blocks.push(element.to_block()),
            None => {
                let kind = T::BLOCK_TYPE;
                tracing::debug!(segment, kind = %kind, id = %id, "Dropping unresolved element reference");
                report.unresolved.push(UnresolvedReference {
                    segment,
                    block_type: T::BLOCK_TYPE,
                    id: id.clone(),
                });
            }
        }
    }
}
