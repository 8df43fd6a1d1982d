//! In-memory job store for testing.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use super::JobStore;
use crate::types::{ExtractedContent, JobId};

/// Error type for in-memory store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InMemoryError {
    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(JobId),
}

/// One stored job.
#[derive(Debug, Clone, Default)]
struct JobRecord {
    extracted_content: Option<ExtractedContent>,
    fields: BTreeMap<String, Value>,
}

/// In-memory job store for testing.
///
/// Uses BTreeMap for deterministic iteration order.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<BTreeMap<JobId, JobRecord>>,
}

impl InMemoryJobStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job with its extraction snapshot.
    pub fn insert_job(&self, job_id: JobId, content: ExtractedContent) {
        self.jobs.write().entry(job_id).or_default().extracted_content = Some(content);
    }

    /// Register a job that has no extracted content yet.
    pub fn insert_empty_job(&self, job_id: JobId) {
        self.jobs.write().entry(job_id).or_default();
    }

    /// Read back a field of a job.
    pub fn field(&self, job_id: &JobId, field: &str) -> Option<Value> {
        self.jobs.read().get(job_id).and_then(|job| job.fields.get(field).cloned())
    }

    /// Get number of jobs.
    pub fn num_jobs(&self) -> usize {
        self.jobs.read().len()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    type Error = InMemoryError;

    async fn get_extracted_content(&self, job_id: &JobId) -> Result<Option<ExtractedContent>, Self::Error> {
        Ok(self
            .jobs
            .read()
            .get(job_id)
            .and_then(|job| job.extracted_content.clone()))
    }

    async fn update_field(&self, job_id: &JobId, field: &str, value: Value) -> Result<(), Self::Error> {
        let mut jobs = self.jobs.write();
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| InMemoryError::JobNotFound(job_id.clone()))?;
        job.fields.insert(field.to_string(), value);
        Ok(())
    }
}
