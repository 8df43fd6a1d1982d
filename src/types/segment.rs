//! Output segment types.
//!
//! A `ContentSegment` is the authoritative artifact handed to narration.
//! Segments are created once by the assembler and never mutated afterwards.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use std::fmt;

/// Unique identifier for an emitted content segment.
///
/// Wraps a UUID and implements `Ord` for deterministic ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(Uuid);

impl SegmentId {
    /// Create a SegmentId from a UUID.
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a fresh random SegmentId.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a SegmentId from a UUID string.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SegmentId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Kind of material a content block carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentBlockType {
    /// Text of one page.
    Text,
    /// A figure's caption.
    Figure,
    /// A table's rendered content.
    Table,
    /// A formula's LaTeX source.
    Formula,
    /// A bibliography entry.
    Citation,
}

impl ContentBlockType {
    /// Parse a block type from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "figure" => Some(Self::Figure),
            "table" => Some(Self::Table),
            "formula" => Some(Self::Formula),
            "citation" => Some(Self::Citation),
            _ => None,
        }
    }
}

impl fmt::Display for ContentBlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Figure => write!(f, "figure"),
            Self::Table => write!(f, "table"),
            Self::Formula => write!(f, "formula"),
            Self::Citation => write!(f, "citation"),
        }
    }
}

/// One atomic piece of resolved material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    /// Kind of material.
    #[serde(rename = "type")]
    pub block_type: ContentBlockType,
    /// The material itself.
    pub content: String,
    /// Page the material was found on (1-based).
    pub page_reference: u32,
}

impl ContentBlock {
    /// Create a new content block.
    pub fn new(block_type: ContentBlockType, content: impl Into<String>, page_reference: u32) -> Self {
        Self {
            block_type,
            content: content.into(),
            page_reference,
        }
    }

    /// Create a text block for one page.
    pub fn text(content: impl Into<String>, page_reference: u32) -> Self {
        Self::new(ContentBlockType::Text, content, page_reference)
    }
}

/// A final, ordered unit of material.
///
/// Every id in `prerequisites` belongs to a segment whose `order` is
/// strictly less than this segment's `order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSegment {
    /// Stable identifier for the lifetime of the job.
    pub id: SegmentId,
    /// Topic title.
    pub title: String,
    /// 0-based final position.
    pub order: usize,
    /// Resolved material, in presentation order.
    pub content_blocks: Vec<ContentBlock>,
    /// Earlier segments this one builds on.
    pub prerequisites: Vec<SegmentId>,
}

impl ContentSegment {
    /// Number of blocks of the given type.
    pub fn count_blocks(&self, block_type: ContentBlockType) -> usize {
        self.content_blocks
            .iter()
            .filter(|b| b.block_type == block_type)
            .count()
    }

    /// Check whether this segment lists `id` as a prerequisite.
    pub fn depends_on(&self, id: &SegmentId) -> bool {
        self.prerequisites.contains(id)
    }
}
