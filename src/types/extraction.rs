//! Extraction snapshot types.
//!
//! `ExtractedContent` is produced upstream by the extraction stage and is
//! read-only here. Ids are unique within each collection and page numbers
//! start at 1.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::segment::{ContentBlock, ContentBlockType};

/// Text of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// 1-based page number.
    pub page_number: u32,
    /// Extracted text.
    pub text: String,
}

impl Page {
    /// Create a new page.
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }

    /// Whether the page carries no readable text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A figure found in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Figure {
    /// Unique figure id.
    pub id: String,
    /// Page the figure appears on.
    pub page_number: u32,
    /// Caption text.
    #[serde(default)]
    pub caption: String,
    /// Object-store key of the rendered image, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_key: Option<String>,
}

/// A table found in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Unique table id.
    pub id: String,
    /// Page the table appears on.
    pub page_number: u32,
    /// Caption text.
    #[serde(default)]
    pub caption: String,
    /// Rendered table content.
    #[serde(default)]
    pub content: String,
}

/// A formula found in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Formula {
    /// Unique formula id.
    pub id: String,
    /// Page the formula appears on.
    pub page_number: u32,
    /// LaTeX source.
    pub latex: String,
}

/// A bibliography entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    /// Unique citation id.
    pub id: String,
    /// Page the citation appears on.
    pub page_number: u32,
    /// Citation text.
    pub text: String,
}

/// An element that can be referenced by id from a proposal.
pub trait ReferencedElement {
    /// Block type emitted for this element.
    const BLOCK_TYPE: ContentBlockType;

    /// Element id.
    fn id(&self) -> &str;

    /// Page the element appears on.
    fn page_number(&self) -> u32;

    /// Text carried into the content block.
    fn block_content(&self) -> &str;

    /// Build the content block for this element.
    fn to_block(&self) -> ContentBlock {
        ContentBlock::new(Self::BLOCK_TYPE, self.block_content(), self.page_number())
    }
}

impl ReferencedElement for Figure {
    const BLOCK_TYPE: ContentBlockType = ContentBlockType::Figure;
    fn id(&self) -> &str { &self.id }
    fn page_number(&self) -> u32 { self.page_number }
    fn block_content(&self) -> &str { &self.caption }
}

impl ReferencedElement for Table {
    const BLOCK_TYPE: ContentBlockType = ContentBlockType::Table;
    fn id(&self) -> &str { &self.id }
    fn page_number(&self) -> u32 { self.page_number }
    fn block_content(&self) -> &str { &self.content }
}

impl ReferencedElement for Formula {
    const BLOCK_TYPE: ContentBlockType = ContentBlockType::Formula;
    fn id(&self) -> &str { &self.id }
    fn page_number(&self) -> u32 { self.page_number }
    fn block_content(&self) -> &str { &self.latex }
}

impl ReferencedElement for Citation {
    const BLOCK_TYPE: ContentBlockType = ContentBlockType::Citation;
    fn id(&self) -> &str { &self.id }
    fn page_number(&self) -> u32 { self.page_number }
    fn block_content(&self) -> &str { &self.text }
}

/// Everything the extraction stage produced for one job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedContent {
    /// Pages in document order.
    #[serde(default)]
    pub pages: Vec<Page>,
    /// Figures.
    #[serde(default)]
    pub figures: Vec<Figure>,
    /// Tables.
    #[serde(default)]
    pub tables: Vec<Table>,
    /// Formulas.
    #[serde(default)]
    pub formulas: Vec<Formula>,
    /// Citations.
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl ExtractedContent {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page.
    pub fn with_page(mut self, page_number: u32, text: impl Into<String>) -> Self {
        self.pages.push(Page::new(page_number, text));
        self
    }

    /// Add a figure.
    pub fn with_figure(mut self, id: impl Into<String>, page_number: u32, caption: impl Into<String>) -> Self {
        self.figures.push(Figure {
            id: id.into(),
            page_number,
            caption: caption.into(),
            image_key: None,
        });
        self
    }

    /// Add a table.
    pub fn with_table(mut self, id: impl Into<String>, page_number: u32, content: impl Into<String>) -> Self {
        self.tables.push(Table {
            id: id.into(),
            page_number,
            caption: String::new(),
            content: content.into(),
        });
        self
    }

    /// Add a formula.
    pub fn with_formula(mut self, id: impl Into<String>, page_number: u32, latex: impl Into<String>) -> Self {
        self.formulas.push(Formula {
            id: id.into(),
            page_number,
            latex: latex.into(),
        });
        self
    }

    /// Add a citation.
    pub fn with_citation(mut self, id: impl Into<String>, page_number: u32, text: impl Into<String>) -> Self {
        self.citations.push(Citation {
            id: id.into(),
            page_number,
            text: text.into(),
        });
        self
    }

    /// Highest page number present, or 0 for an empty document.
    pub fn page_count(&self) -> u32 {
        self.pages.iter().map(|p| p.page_number).max().unwrap_or(0)
    }

    /// Build lookup maps for resolving proposal references.
    pub fn index(&self) -> ExtractionIndex<'_> {
        ExtractionIndex::new(self)
    }
}

/// Id-keyed view over an `ExtractedContent`.
///
/// Built once per assembly. When the upstream contract is broken and an id
/// repeats, the first occurrence wins.
#[derive(Debug)]
pub struct ExtractionIndex<'a> {
    pages: BTreeMap<u32, &'a Page>,
    figures: BTreeMap<&'a str, &'a Figure>,
    tables: BTreeMap<&'a str, &'a Table>,
    formulas: BTreeMap<&'a str, &'a Formula>,
    citations: BTreeMap<&'a str, &'a Citation>,
}

fn by_id<T: ReferencedElement>(items: &[T]) -> BTreeMap<&str, &T> {
    let mut map = BTreeMap::new();
    for item in items {
        map.entry(item.id()).or_insert(item);
    }
    map
}

impl<'a> ExtractionIndex<'a> {
    fn new(content: &'a ExtractedContent) -> Self {
        let mut pages = BTreeMap::new();
        for page in &content.pages {
            pages.entry(page.page_number).or_insert(page);
        }
        Self {
            pages,
            figures: by_id(&content.figures),
            tables: by_id(&content.tables),
            formulas: by_id(&content.formulas),
            citations: by_id(&content.citations),
        }
    }

    /// Pages with `start <= page_number <= end`, ascending.
    ///
    /// Walks existing pages only, so the cost is independent of the range width.
    /// An inverted range yields nothing.
    pub fn pages_in(&self, start: u32, end: u32) -> impl Iterator<Item = &'a Page> + '_ {
        (start <= end)
            .then(|| self.pages.range(start..=end))
            .into_iter()
            .flatten()
            .map(|(_, page)| *page)
    }

    /// Look up a figure.
    pub fn figure(&self, id: &str) -> Option<&'a Figure> {
        self.figures.get(id).copied()
    }

    /// Look up a table.
    pub fn table(&self, id: &str) -> Option<&'a Table> {
        self.tables.get(id).copied()
    }

    /// Look up a formula.
    pub fn formula(&self, id: &str) -> Option<&'a Formula> {
        self.formulas.get(id).copied()
    }

    /// Look up a citation.
    pub fn citation(&self, id: &str) -> Option<&'a Citation> {
        self.citations.get(id).copied()
    }
}

/// Compact description of a snapshot sent to the proposal generator.
///
/// Page text is truncated to a preview; elements are listed by id so the
/// generator can reference them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionSummary {
    /// Number of the last page.
    pub page_count: u32,
    /// Page previews in document order.
    pub pages: Vec<PagePreview>,
    /// Figures by id.
    pub figures: Vec<ElementPreview>,
    /// Tables by id.
    pub tables: Vec<ElementPreview>,
    /// Formulas by id.
    pub formulas: Vec<ElementPreview>,
    /// Citations by id.
    pub citations: Vec<ElementPreview>,
}

/// Truncated page text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePreview {
    /// 1-based page number.
    pub page_number: u32,
    /// Leading characters of the page text.
    pub preview: String,
}

/// Id, location and truncated text of one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPreview {
    /// Element id.
    pub id: String,
    /// Page the element appears on.
    pub page_number: u32,
    /// Leading characters of the element text.
    pub preview: String,
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((cut, _)) => trimmed[..cut].to_string(),
        None => trimmed.to_string(),
    }
}

fn preview_all<T: ReferencedElement>(items: &[T], max_chars: usize) -> Vec<ElementPreview> {
    items
        .iter()
        .map(|item| ElementPreview {
            id: item.id().to_string(),
            page_number: item.page_number(),
            preview: truncate_chars(item.block_content(), max_chars),
        })
        .collect()
}

impl ExtractionSummary {
    /// Summarize a snapshot, truncating every text to `max_chars` characters.
    ///
    /// Blank pages are omitted.
    pub fn from_content(content: &ExtractedContent, max_chars: usize) -> Self {
        Self {
            page_count: content.page_count(),
            pages: content
                .pages
                .iter()
                .filter(|p| !p.is_blank())
                .map(|p| PagePreview {
                    page_number: p.page_number,
                    preview: truncate_chars(&p.text, max_chars),
                })
                .collect(),
            figures: preview_all(&content.figures, max_chars),
            tables: preview_all(&content.tables, max_chars),
            formulas: preview_all(&content.formulas, max_chars),
            citations: preview_all(&content.citations, max_chars),
        }
    }
}
