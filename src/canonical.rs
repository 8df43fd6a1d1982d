//! Canonical serialization for deterministic hashing.
//!
//! ## Determinism Guarantees
//!
//! - Stable field order: Struct fields serialize in declaration order
//! - Stable Vec order: Vectors serialize in index order
//! - No HashMap allowed: Use BTreeMap for maps in hashed data
//!
//! Segment ids are freshly generated on every run, so the segmentation
//! fingerprint covers order, titles, block composition and the prerequisite
//! structure expressed as orders, never the ids themselves.

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

use crate::types::{ContentBlock, ContentSegment};

/// Serialize a value to canonical JSON bytes for hashing.
///
/// Plain data types serialize infallibly; a value that cannot be serialized
/// hashes as empty input.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_default()
}

/// Compute canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    let bytes = to_canonical_bytes(value);
    xxh64(&bytes, 0)
}

/// Compute canonical hash and return as hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}

/// Id-free projection of one segment.
#[derive(Serialize)]
struct SegmentShape<'a> {
    order: usize,
    title: &'a str,
    blocks: &'a [ContentBlock],
    prerequisite_orders: Vec<usize>,
}

/// Fingerprint of a segment sequence that ignores generated ids.
///
/// Two runs over the same proposal and snapshot produce the same value.
pub fn segmentation_fingerprint(segments: &[ContentSegment]) -> String {
    let shapes: Vec<SegmentShape<'_>> = segments
        .iter()
        .map(|segment| SegmentShape {
            order: segment.order,
            title: &segment.title,
            blocks: &segment.content_blocks,
            prerequisite_orders: segment
                .prerequisites
                .iter()
                .filter_map(|id| segments.iter().find(|s| s.id == *id).map(|s| s.order))
                .collect(),
        })
        .collect();
    canonical_hash_hex(&shapes)
}
