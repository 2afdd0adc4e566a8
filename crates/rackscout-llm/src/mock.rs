//! Mock backend for deterministic testing

use crate::{Backend, GenerationRequest, GenerationResponse, LlmError, Usage};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Mock backend for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// Lookup order for each call:
///
/// 1. the next queued reply, if any ([`MockBackend::push_response`], [`MockBackend::push_error`])
/// 2. the first rule whose key is a substring of the prompt
/// 3. the default response
///
/// # Examples
///
/// ```
/// use rackscout_llm::{Backend, GenerationRequest, MockBackend};
/// use tokio_util::sync::CancellationToken;
///
/// # tokio_test::block_on(async {
/// let mut backend = MockBackend::default();
/// backend.add_response("DDR4", "ram");
/// backend.add_response("SFP+", "nic");
///
/// let cancel = CancellationToken::new();
/// let reply = backend.generate(&cancel, &GenerationRequest::new("32GB DDR4 RDIMM")).await.unwrap();
/// assert_eq!(reply.content, "ram");
/// assert_eq!(backend.call_count(), 1);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockBackend {
    default_response: String,
    rules: Arc<Mutex<Vec<(String, Result<String, LlmError>)>>>,
    queue: Arc<Mutex<VecDeque<Result<String, LlmError>>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockBackend {
    /// Create a mock with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            rules: Arc::new(Mutex::new(Vec::new())),
            queue: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer prompts containing `needle` with `response`
    pub fn add_response(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        self.rules
            .lock()
            .unwrap()
            .push((needle.into(), Ok(response.into())));
    }

    /// Fail prompts containing `needle` with `error`
    pub fn add_error(&mut self, needle: impl Into<String>, error: LlmError) {
        self.rules.lock().unwrap().push((needle.into(), Err(error)));
    }

    /// Queue a one-shot response for the next call
    pub fn push_response(&self, response: impl Into<String>) {
        self.queue.lock().unwrap().push_back(Ok(response.into()));
    }

    /// Queue a one-shot failure for the next call
    pub fn push_error(&self, error: LlmError) {
        self.queue.lock().unwrap().push_back(Err(error));
    }

    /// Number of times generate was called
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request seen so far, oldest first
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request
    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Forget recorded requests
    pub fn reset_call_count(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn reply_for(&self, prompt: &str) -> Result<String, LlmError> {
        if let Some(queued) = self.queue.lock().unwrap().pop_front() {
            return queued;
        }

        let rules = self.rules.lock().unwrap();
        rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| Ok(self.default_response.clone()))
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn generate(
        &self,
        cancel: &CancellationToken,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());

        if cancel.is_cancelled() {
            return Err(LlmError::Cancelled);
        }

        let content = self.reply_for(&request.prompt)?;
        Ok(GenerationResponse {
            content,
            model: "mock".to_string(),
            usage: Usage::default(),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
