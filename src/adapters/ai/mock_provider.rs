//! Mock AI Provider for testing.
//!
//! Provides a configurable mock implementation of the AIProvider port,
//! allowing audits to run without calling real AI APIs.
//!
//! # Features
//!
//! - Pre-configured responses, either queued or keyed by stage
//! - Error injection for failure-path testing
//! - Call tracking (with the issuing stage) for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_stage_response(Stage::Decompose, r#"{"objective":"..."}"#)
//!     .with_stage_error(Stage::Simulate, MockError::Unavailable { message: "down".into() });
//!
//! let response = provider.complete(request).await?;
//! assert_eq!(provider.calls_for(Stage::Decompose), 1);
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::audit::Stage;
use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    TokenUsage,
};

/// Mock AI provider for testing.
///
/// A stage-keyed response wins over the shared queue; when both are empty
/// the provider answers with a fixed non-JSON text.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Responses consumed in order by any stage.
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Responses consumed in order by one stage.
    stage_responses: Arc<Mutex<HashMap<Stage, VecDeque<MockResponse>>>>,
    /// Provider info to return.
    info: ProviderInfo,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
enum MockResponse {
    /// Return a successful completion.
    Success {
        content: String,
        usage: TokenUsage,
        finish_reason: FinishReason,
    },
    /// Return an error.
    Error(MockError),
}

impl MockResponse {
    fn success(content: impl Into<String>) -> Self {
        MockResponse::Success {
            content: content.into(),
            usage: TokenUsage::new(10, 20),
            finish_reason: FinishReason::Stop,
        }
    }
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    /// Simulate rate limiting.
    RateLimited { retry_after_secs: u32 },
    /// Simulate content filtering.
    ContentFiltered { reason: String },
    /// Simulate provider unavailable.
    Unavailable { message: String },
    /// Simulate a rejected API key.
    AuthenticationFailed,
    /// Simulate network error.
    Network { message: String },
    /// Simulate timeout.
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::ContentFiltered { reason } => AIError::content_filtered(reason),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

/// Locks a mutex, recovering the data if a panicking test poisoned it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    /// Creates a new mock provider with default settings.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            stage_responses: Arc::new(Mutex::new(HashMap::new())),
            info: ProviderInfo::new("mock", "mock-model-1"),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful response to the shared queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        lock(&self.responses).push_back(MockResponse::success(content));
        self
    }

    /// Adds an error response to the shared queue.
    pub fn with_error(self, error: MockError) -> Self {
        lock(&self.responses).push_back(MockResponse::Error(error));
        self
    }

    /// Adds a successful response served only to `stage`.
    pub fn with_stage_response(self, stage: Stage, content: impl Into<String>) -> Self {
        lock(&self.stage_responses)
            .entry(stage)
            .or_default()
            .push_back(MockResponse::success(content));
        self
    }

    /// Adds an error response served only to `stage`.
    pub fn with_stage_error(self, stage: Stage, error: MockError) -> Self {
        lock(&self.stage_responses)
            .entry(stage)
            .or_default()
            .push_back(MockResponse::Error(error));
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns the number of calls issued by `stage`.
    pub fn calls_for(&self, stage: Stage) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| call.metadata.stage == stage)
            .count()
    }

    /// Returns the issuing stage of every call, in call order.
    pub fn stages_called(&self) -> Vec<Stage> {
        lock(&self.calls).iter().map(|call| call.metadata.stage).collect()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        lock(&self.calls).clone()
    }

    /// Gets the next response for `stage` or a default.
    fn next_response(&self, stage: Stage) -> MockResponse {
        if let Some(response) = lock(&self.stage_responses)
            .get_mut(&stage)
            .and_then(VecDeque::pop_front)
        {
            return response;
        }

        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| MockResponse::success("Mock response"))
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let stage = request.metadata.stage;
        lock(&self.calls).push(request);

        match self.next_response(stage) {
            MockResponse::Success {
                content,
                usage,
                finish_reason,
            } => Ok(CompletionResponse {
                content,
                usage,
                model: self.info.model.clone(),
                finish_reason,
            }),
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
