//! AI Provider Port - the single model call an audit stage makes.
//!
//! Every stage sends the same shape of request: a stage instruction, the
//! decision context rendered for that stage, and a request for a JSON object
//! back. Adapters translate this into a vendor wire format (OpenAI, Groq) or,
//! in tests, answer from a script.
//!
//! # Example
//!
//! ```ignore
//! let request = CompletionRequest::new(
//!     RequestMetadata::new(audit_id, Stage::Decompose),
//!     Decomposer.instruction(),
//!     Decomposer.context(&input),
//! )
//! .with_temperature(0.0)
//! .with_response_format(ResponseFormat::JsonObject);
//!
//! let reply = provider.complete(request).await?;
//! ```

use async_trait::async_trait;

use crate::domain::audit::Stage;
use crate::domain::foundation::AuditId;

/// Port for the chat-completions backend.
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Sends one request and returns the model's reply.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError>;

    /// Name and model of the backend, for logs.
    fn provider_info(&self) -> ProviderInfo;
}

/// One stage's call to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Audit and stage issuing the call.
    pub metadata: RequestMetadata,
    /// Stage instruction, sent as the system message.
    pub instruction: String,
    /// Decision context, sent as the user message.
    pub context: String,
    /// Sampling temperature; the provider default when unset.
    pub temperature: Option<f32>,
    pub response_format: ResponseFormat,
}

impl CompletionRequest {
    pub fn new(
        metadata: RequestMetadata,
        instruction: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            metadata,
            instruction: instruction.into(),
            context: context.into(),
            temperature: None,
            response_format: ResponseFormat::Text,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }
}

/// Reply format requested from the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    #[default]
    Text,
    /// A single JSON object (provider-side JSON mode).
    JsonObject,
}

/// Correlates a call with its audit run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestMetadata {
    pub audit_id: AuditId,
    pub stage: Stage,
}

impl RequestMetadata {
    pub fn new(audit_id: AuditId, stage: Stage) -> Self {
        Self { audit_id, stage }
    }
}

/// The model's reply to a [`CompletionRequest`].
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Raw reply text; expected to hold JSON when JSON mode was requested.
    pub content: String,
    pub usage: TokenUsage,
    /// Model that actually answered.
    pub model: String,
    pub finish_reason: FinishReason,
}

/// Token counts reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    /// Cut off at the token limit; a JSON reply is likely incomplete.
    Length,
    ContentFilter,
}

/// Backend identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    /// Provider name ("openai", "groq", "mock").
    pub name: String,
    pub model: String,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Failures of the call itself, before any reply content is inspected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AIError {
    /// The provider rejected the API key.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The provider could not be set up (blank key, unbuildable client).
    #[error("provider configuration error: {0}")]
    Configuration(String),

    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// 5xx from the provider.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },

    /// The response envelope (not the model's content) could not be read.
    #[error("parse error: {0}")]
    Parse(String),

    /// The provider rejected the request body (HTTP 400).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("content filtered: {reason}")]
    ContentFiltered { reason: String },
}

impl AIError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn content_filtered(reason: impl Into<String>) -> Self {
        Self::ContentFiltered {
            reason: reason.into(),
        }
    }

    /// True when the credential or provider setup is at fault rather than the call.
    pub fn is_configuration(&self) -> bool {
        matches!(self, AIError::AuthenticationFailed | AIError::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> RequestMetadata {
        RequestMetadata::new(AuditId::new(), Stage::Simulate)
    }

    #[test]
    fn new_request_is_plain_text_with_provider_temperature() {
        let request = CompletionRequest::new(metadata(), "Project outcomes", "Decision Text: x");

        assert_eq!(request.instruction, "Project outcomes");
        assert_eq!(request.context, "Decision Text: x");
        assert_eq!(request.temperature, None);
        assert_eq!(request.response_format, ResponseFormat::Text);
    }

    #[test]
    fn builders_set_sampling_and_format() {
        let request = CompletionRequest::new(metadata(), "i", "c")
            .with_temperature(0.0)
            .with_response_format(ResponseFormat::JsonObject);

        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.response_format, ResponseFormat::JsonObject);
        assert_eq!(request.metadata.stage, Stage::Simulate);
    }

    #[test]
    fn configuration_errors_are_told_apart_from_call_failures() {
        assert!(AIError::AuthenticationFailed.is_configuration());
        assert!(AIError::configuration("no key").is_configuration());

        assert!(!AIError::rate_limited(30).is_configuration());
        assert!(!AIError::unavailable("down").is_configuration());
        assert!(!AIError::Timeout { timeout_secs: 30 }.is_configuration());
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            AIError::rate_limited(30).to_string(),
            "rate limited: retry after 30s"
        );
        assert_eq!(
            AIError::configuration("missing key").to_string(),
            "provider configuration error: missing key"
        );
    }
}
