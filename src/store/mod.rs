//! Job storage backends.
//!
//! The store is both the source of the extraction snapshot and the sink for
//! the finished segmentation record.

pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

use async_trait::async_trait;
use serde_json::Value;

use crate::types::{ExtractedContent, JobId};

/// Trait for job storage backends.
///
/// Writes are field-scoped: `update_field` replaces one named field of the
/// job record and leaves every other field untouched.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Error type for store operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the extraction snapshot of a job.
    ///
    /// `Ok(None)` when the job or its extracted content does not exist.
    async fn get_extracted_content(&self, job_id: &JobId) -> Result<Option<ExtractedContent>, Self::Error>;

    /// Set one field of the job record. Unknown jobs are an error.
    async fn update_field(&self, job_id: &JobId, field: &str, value: Value) -> Result<(), Self::Error>;
}

pub use memory::InMemoryJobStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresJobStore;
