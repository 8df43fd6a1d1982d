//! Second validation phase: loosely-typed JSON to a typed proposal.
//!
//! The generator's output is untrusted. Nothing reaches the graph builder
//! until every segment has passed the checks below, and every rejection
//! names the segment, the field path, what was expected and what was found.
//!
//! ## Checks (in order, per segment)
//!
//! | Field | Rule | Failure |
//! |-------|------|---------|
//! | `segments` | non-empty array | `EmptyProposal` |
//! | segment | object | `MalformedSegment` |
//! | `title` | non-blank string | `EmptyTitle` |
//! | `contentIndices` | object | `MissingContentIndices` |
//! | `pageRanges[k]` | `[start, end]`, `1 <= start <= end` | `BadPageRange` |
//! | `figureIds` etc. | array (missing = empty) | `BadIdListType` |
//! | `figureIds[k]` etc. | string | `BadIdElement` |
//! | `prerequisites` | array (missing = empty) | `BadPrerequisiteList` |
//! | `prerequisites[k]` | integer in `0..segmentCount` | `BadPrerequisiteIndex` |
//! | `prerequisites[k]` | not the segment's own index | `SelfReferentialPrerequisite` |

use serde_json::{Map, Value};
use std::fmt;

use crate::types::{ContentIndices, PageRange, ProposalSegment, SegmentationProposal};

/// Fieldless discriminant of a `ValidationError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// No usable `segments` array.
    EmptyProposal,
    /// A segment is not an object.
    MalformedSegment,
    /// Missing, non-string or blank title.
    EmptyTitle,
    /// Missing or non-object `contentIndices`.
    MissingContentIndices,
    /// Malformed page range.
    BadPageRange,
    /// An id list is not an array.
    BadIdListType,
    /// An id list element is not a string.
    BadIdElement,
    /// `prerequisites` is not an array.
    BadPrerequisiteList,
    /// A prerequisite is not an in-range integer.
    BadPrerequisiteIndex,
    /// A segment lists itself as prerequisite.
    SelfReferentialPrerequisite,
}

/// What is wrong with a page range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageRangeFault {
    /// `pageRanges` itself is not an array.
    NotAnArray,
    /// An entry is not a two-element array.
    NotAPair,
    /// A bound is not an integer.
    NotAnInteger,
    /// A bound does not fit a page number.
    OutOfRange,
    /// `start < 1`.
    StartBelowOne,
    /// `start > end`.
    StartAfterEnd,
}

impl fmt::Display for PageRangeFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnArray => write!(f, "must be an array of [start, end] pairs"),
            Self::NotAPair => write!(f, "must be a [start, end] pair"),
            Self::NotAnInteger => write!(f, "bounds must be integers"),
            Self::OutOfRange => write!(f, "bounds must fit a page number"),
            Self::StartBelowOne => write!(f, "start must be at least 1"),
            Self::StartAfterEnd => write!(f, "start must not exceed end"),
        }
    }
}

/// A proposal failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The proposal has no non-empty `segments` array.
    #[error("Proposal must be an object with a non-empty `segments` array, found {found}")]
    EmptyProposal {
        /// What was found instead.
        found: String,
    },
    /// A segment is not an object.
    #[error("Segment {segment}: expected an object, found {found}")]
    MalformedSegment {
        /// Offending segment index.
        segment: usize,
        /// JSON type found.
        found: &'static str,
    },
    /// Missing, non-string or blank title.
    #[error("Segment {segment}: `title` must be a non-empty string, found {found}")]
    EmptyTitle {
        /// Offending segment index.
        segment: usize,
        /// What was found instead.
        found: String,
    },
    /// Missing or non-object `contentIndices`.
    #[error("Segment {segment}: `contentIndices` must be an object, found {found}")]
    MissingContentIndices {
        /// Offending segment index.
        segment: usize,
        /// JSON type found.
        found: &'static str,
    },
    /// Malformed page range.
    #[error("Segment {segment}: `{field}` {fault}, found {found}")]
    BadPageRange {
        /// Offending segment index.
        segment: usize,
        /// Field path.
        field: String,
        /// What is wrong.
        fault: PageRangeFault,
        /// Offending value.
        found: String,
    },
    /// An id list is not an array.
    #[error("Segment {segment}: `{field}` must be an array of strings, found {found}")]
    BadIdListType {
        /// Offending segment index.
        segment: usize,
        /// Field path.
        field: String,
        /// JSON type found.
        found: &'static str,
    },
    /// An id list element is not a string.
    #[error("Segment {segment}: `{field}` must be a string, found {found}")]
    BadIdElement {
        /// Offending segment index.
        segment: usize,
        /// Field path.
        field: String,
        /// JSON type found.
        found: &'static str,
    },
    /// `prerequisites` is not an array.
    #[error("Segment {segment}: `prerequisites` must be an array of segment indices, found {found}")]
    BadPrerequisiteList {
        /// Offending segment index.
        segment: usize,
        /// JSON type found.
        found: &'static str,
    },
    /// A prerequisite is not an integer in `0..segment_count`.
    #[error("Segment {segment}: `{field}` must be an integer in 0..{segment_count}, found {found}")]
    BadPrerequisiteIndex {
        /// Offending segment index.
        segment: usize,
        /// Field path.
        field: String,
        /// Offending value.
        found: String,
        /// Number of segments in the proposal.
        segment_count: usize,
    },
    /// A segment lists itself as prerequisite.
    #[error("Segment {segment}: `{field}` refers to the segment itself")]
    SelfReferentialPrerequisite {
        /// Offending segment index.
        segment: usize,
        /// Field path.
        field: String,
    },
}

impl ValidationError {
    /// The error kind.
    pub fn kind(&self) -> ValidationErrorKind {
        match self {
            Self::EmptyProposal { .. } => ValidationErrorKind::EmptyProposal,
            Self::MalformedSegment { .. } => ValidationErrorKind::MalformedSegment,
            Self::EmptyTitle { .. } => ValidationErrorKind::EmptyTitle,
            Self::MissingContentIndices { .. } => ValidationErrorKind::MissingContentIndices,
            Self::BadPageRange { .. } => ValidationErrorKind::BadPageRange,
            Self::BadIdListType { .. } => ValidationErrorKind::BadIdListType,
            Self::BadIdElement { .. } => ValidationErrorKind::BadIdElement,
            Self::BadPrerequisiteList { .. } => ValidationErrorKind::BadPrerequisiteList,
            Self::BadPrerequisiteIndex { .. } => ValidationErrorKind::BadPrerequisiteIndex,
            Self::SelfReferentialPrerequisite { .. } => ValidationErrorKind::SelfReferentialPrerequisite,
        }
    }

    /// Index of the offending segment, if the failure is segment-level.
    pub fn segment(&self) -> Option<usize> {
        match self {
            Self::EmptyProposal { .. } => None,
            Self::MalformedSegment { segment, .. }
            | Self::EmptyTitle { segment, .. }
            | Self::MissingContentIndices { segment, .. }
            | Self::BadPageRange { segment, .. }
            | Self::BadIdListType { segment, .. }
            | Self::BadIdElement { segment, .. }
            | Self::BadPrerequisiteList { segment, .. }
            | Self::BadPrerequisiteIndex { segment, .. }
            | Self::SelfReferentialPrerequisite { segment, .. } => Some(*segment),
        }
    }

    /// Path of the offending field, relative to the segment.
    pub fn field(&self) -> &str {
        match self {
            Self::EmptyProposal { .. } => "segments",
            Self::MalformedSegment { .. } => "",
            Self::EmptyTitle { .. } => "title",
            Self::MissingContentIndices { .. } => "contentIndices",
            Self::BadPrerequisiteList { .. } => "prerequisites",
            Self::BadPageRange { field, .. }
            | Self::BadIdListType { field, .. }
            | Self::BadIdElement { field, .. }
            | Self::BadPrerequisiteIndex { field, .. }
            | Self::SelfReferentialPrerequisite { field, .. } => field,
        }
    }
}

/// Id list fields of `contentIndices`, in block emission order.
pub const ID_LIST_FIELDS: [&str; 4] = ["figureIds", "tableIds", "formulaIds", "citationIds"];

/// Validate a raw proposal, stopping at the first violation.
pub fn validate_proposal(raw: &Value) -> Result<SegmentationProposal, ValidationError> {
    let items = segments_array(raw)?;
    let segment_count = items.len();
    let segments = items
        .iter()
        .enumerate()
        .map(|(index, item)| validate_segment(index, item, segment_count))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SegmentationProposal::new(segments))
}

/// Collect the first violation of every failing segment.
///
/// Returns an empty list for a valid proposal.
pub fn diagnose_proposal(raw: &Value) -> Vec<ValidationError> {
    match segments_array(raw) {
        Err(e) => vec![e],
        Ok(items) => items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| validate_segment(index, item, items.len()).err())
            .collect(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Integer value of a JSON number. Integral floats such as `3.0` count.
fn integral(value: &Value) -> Option<i128> {
    if let Some(i) = value.as_i64() {
        return Some(i as i128);
    }
    if let Some(u) = value.as_u64() {
        return Some(u as i128);
    }
    let f = value.as_f64()?;
    (f.is_finite() && f.fract() == 0.0).then(|| f as i128)
}

fn segments_array(raw: &Value) -> Result<&Vec<Value>, ValidationError> {
    let obj = raw.as_object().ok_or_else(|| ValidationError::EmptyProposal {
        found: json_type(raw).to_string(),
    })?;
    match obj.get("segments") {
        None => Err(ValidationError::EmptyProposal {
            found: "no `segments` field".to_string(),
        }),
        Some(Value::Array(items)) if items.is_empty() => Err(ValidationError::EmptyProposal {
            found: "an empty array".to_string(),
        }),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(ValidationError::EmptyProposal {
            found: json_type(other).to_string(),
        }),
    }
}

fn validate_segment(
    index: usize,
    value: &Value,
    segment_count: usize,
) -> Result<ProposalSegment, ValidationError> {
    let obj = value.as_object().ok_or(ValidationError::MalformedSegment {
        segment: index,
        found: json_type(value),
    })?;

    let title = validate_title(index, obj.get("title"))?;
    let content_indices = validate_content_indices(index, obj.get("contentIndices"))?;
    let prerequisites = validate_prerequisites(index, obj.get("prerequisites"), segment_count)?;

    Ok(ProposalSegment::new(title, content_indices, prerequisites))
}

fn validate_title(index: usize, value: Option<&Value>) -> Result<String, ValidationError> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::String(_)) => Err(ValidationError::EmptyTitle {
            segment: index,
            found: "a blank string".to_string(),
        }),
        Some(other) => Err(ValidationError::EmptyTitle {
            segment: index,
            found: json_type(other).to_string(),
        }),
        None => Err(ValidationError::EmptyTitle {
            segment: index,
            found: "missing".to_string(),
        }),
    }
}

fn validate_content_indices(index: usize, value: Option<&Value>) -> Result<ContentIndices, ValidationError> {
    let obj = match value {
        Some(Value::Object(obj)) => obj,
        Some(other) => {
            return Err(ValidationError::MissingContentIndices {
                segment: index,
                found: json_type(other),
            })
        }
        None => {
            return Err(ValidationError::MissingContentIndices {
                segment: index,
                found: "missing",
            })
        }
    };

    let page_ranges = validate_page_ranges(index, obj.get("pageRanges"))?;
    let [figure_ids, table_ids, formula_ids, citation_ids] = [
        validate_id_list(index, obj, ID_LIST_FIELDS[0])?,
        validate_id_list(index, obj, ID_LIST_FIELDS[1])?,
        validate_id_list(index, obj, ID_LIST_FIELDS[2])?,
        validate_id_list(index, obj, ID_LIST_FIELDS[3])?,
    ];

    Ok(ContentIndices {
        page_ranges,
        figure_ids,
        table_ids,
        formula_ids,
        citation_ids,
    })
}

fn validate_page_ranges(index: usize, value: Option<&Value>) -> Result<Vec<PageRange>, ValidationError> {
    let items = match value {
        None => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(ValidationError::BadPageRange {
                segment: index,
                field: "contentIndices.pageRanges".to_string(),
                fault: PageRangeFault::NotAnArray,
                found: json_type(other).to_string(),
            })
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(k, item)| validate_page_range(index, k, item))
        .collect()
}

fn validate_page_range(index: usize, position: usize, item: &Value) -> Result<PageRange, ValidationError> {
    let fail = |fault: PageRangeFault| ValidationError::BadPageRange {
        segment: index,
        field: format!("contentIndices.pageRanges[{position}]"),
        fault,
        found: item.to_string(),
    };

    let pair = match item.as_array() {
        Some(pair) if pair.len() == 2 => pair,
        _ => return Err(fail(PageRangeFault::NotAPair)),
    };
    let start = integral(&pair[0]).ok_or_else(|| fail(PageRangeFault::NotAnInteger))?;
    let end = integral(&pair[1]).ok_or_else(|| fail(PageRangeFault::NotAnInteger))?;

    if start < 1 {
        return Err(fail(PageRangeFault::StartBelowOne));
    }
    if start > end {
        return Err(fail(PageRangeFault::StartAfterEnd));
    }
    let start = u32::try_from(start).map_err(|_| fail(PageRangeFault::OutOfRange))?;
    let end = u32::try_from(end).map_err(|_| fail(PageRangeFault::OutOfRange))?;

    Ok(PageRange::new(start, end))
}

fn validate_id_list(
    index: usize,
    obj: &Map<String, Value>,
    field: &'static str,
) -> Result<Vec<String>, ValidationError> {
    let items = match obj.get(field) {
        None => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(ValidationError::BadIdListType {
                segment: index,
                field: format!("contentIndices.{field}"),
                found: json_type(other),
            })
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(k, item)| match item {
            Value::String(id) => Ok(id.clone()),
            other => Err(ValidationError::BadIdElement {
                segment: index,
                field: format!("contentIndices.{field}[{k}]"),
                found: json_type(other),
            }),
        })
        .collect()
}

fn validate_prerequisites(
    index: usize,
    value: Option<&Value>,
    segment_count: usize,
) -> Result<Vec<usize>, ValidationError> {
    let items = match value {
        None => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(ValidationError::BadPrerequisiteList {
                segment: index,
                found: json_type(other),
            })
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(k, item)| {
            let field = format!("prerequisites[{k}]");
            let prerequisite = integral(item)
                .filter(|p| *p >= 0 && *p < segment_count as i128)
                .map(|p| p as usize)
                .ok_or_else(|| ValidationError::BadPrerequisiteIndex {
                    segment: index,
                    field: field.clone(),
                    found: item.to_string(),
                    segment_count,
                })?;
            if prerequisite == index {
                return Err(ValidationError::SelfReferentialPrerequisite { segment: index, field });
            }
            Ok(prerequisite)
        })
        .collect()
}
