//! In-memory generator that replays canned responses.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{GeneratorError, ProposalGenerator, ProposalRequest};

/// Replays responses in the order they were queued.
///
/// Every request is recorded so tests can inspect what the orchestrator
/// sent. When the script runs out, calls fail with `GeneratorError::Provider`.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, GeneratorError>>>,
    requests: Mutex<Vec<ProposalRequest>>,
}

impl ScriptedGenerator {
    /// Create an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.responses.lock().push_back(Ok(text.into()));
        self
    }

    /// Queue a failure.
    pub fn with_error(self, error: GeneratorError) -> Self {
        self.responses.lock().push_back(Err(error));
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<ProposalRequest> {
        self.requests.lock().clone()
    }

    /// Number of responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.lock().len()
    }
}

#[async_trait]
impl ProposalGenerator for ScriptedGenerator {
    async fn propose(&self, request: &ProposalRequest) -> Result<String, GeneratorError> {
        self.requests.lock().push(request.clone());
        self.responses.lock().pop_front().unwrap_or_else(|| {
            Err(GeneratorError::Provider {
                message: "script exhausted".to_string(),
            })
        })
    }
}
