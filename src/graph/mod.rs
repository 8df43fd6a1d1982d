//! Prerequisite graph: construction, cycle detection and ordering.
//!
//! ```text
//! SegmentationProposal → DependencyGraph → find_cycle → order_segments → Ordering
//! ```
//!
//! All state is local to one call; nothing here is shared or cached.

pub mod builder;
pub mod cycle;
pub mod order;

pub use builder::DependencyGraph;
pub use cycle::{find_cycle, has_cycle};
pub use order::{kahn_order, order_segments, Ordering};
