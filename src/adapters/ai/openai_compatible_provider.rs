//! OpenAI-compatible Provider - Implementation of AIProvider for chat-completions APIs.
//!
//! OpenAI and Groq expose the same `/chat/completions` wire format, so one
//! adapter serves both; only the base URL, default model and provider name
//! differ.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAICompatibleConfig::groq(api_key)
//!     .with_model("llama-3.3-70b-versatile")
//!     .with_timeout(Duration::from_secs(30));
//!
//! let provider = OpenAICompatibleProvider::new(config)?;
//! ```
//!
//! Every call is attempted exactly once. Transient failures surface to the
//! caller as the matching [`AIError`] variant.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    ResponseFormat, TokenUsage,
};

/// Default OpenAI endpoint.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Default OpenAI model.
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default Groq endpoint.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
/// Default Groq model.
pub const GROQ_DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Configuration for an OpenAI-compatible provider.
#[derive(Debug, Clone)]
pub struct OpenAICompatibleConfig {
    /// Provider name reported in [`ProviderInfo`].
    pub name: String,
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use.
    pub model: String,
    /// Base URL for the API, without the trailing `/chat/completions`.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl OpenAICompatibleConfig {
    /// Creates a configuration for an arbitrary compatible endpoint.
    pub fn new(
        name: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            api_key: Secret::new(api_key.into()),
            model: model.into(),
            base_url: base_url.into(),
            timeout: Duration::from_secs(60),
        }
    }

    /// OpenAI defaults.
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", api_key, OPENAI_BASE_URL, OPENAI_DEFAULT_MODEL)
    }

    /// Groq defaults.
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self::new("groq", api_key, GROQ_BASE_URL, GROQ_DEFAULT_MODEL)
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Chat-completions provider for OpenAI and Groq.
pub struct OpenAICompatibleProvider {
    config: OpenAICompatibleConfig,
    client: Client,
}

impl OpenAICompatibleProvider {
    /// Creates a provider with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `AIError::Configuration` when the API key is blank or the
    /// HTTP client cannot be built.
    pub fn new(config: OpenAICompatibleConfig) -> Result<Self, AIError> {
        if config.api_key().trim().is_empty() {
            return Err(AIError::configuration(format!(
                "{} API key is empty",
                config.name
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::configuration(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Builds the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Converts our request to the wire format: instruction as the system
    /// message, context as the single user message.
    fn to_wire_request(&self, request: &CompletionRequest) -> ChatRequest {
        let messages = vec![
            ChatMessage::new("system", &request.instruction),
            ChatMessage::new("user", &request.context),
        ];

        let response_format = match request.response_format {
            ResponseFormat::Text => None,
            ResponseFormat::JsonObject => Some(WireResponseFormat {
                kind: "json_object",
            }),
        };

        ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: request.temperature,
            response_format,
        }
    }

    /// Sends a request.
    async fn send_request(&self, request: &CompletionRequest) -> Result<Response, AIError> {
        let wire_request = self.to_wire_request(request);

        self.client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AIError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    AIError::network(format!("Connection failed: {}", e))
                } else {
                    AIError::network(e.to_string())
                }
            })
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(&self, response: Response) -> Result<Response, AIError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        Err(map_error_status(status.as_u16(), error_body))
    }

    /// Parses a completion response.
    async fn parse_response(&self, response: Response) -> Result<CompletionResponse, AIError> {
        let response = self.handle_response_status(response).await?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        into_completion(body)
    }
}

#[async_trait]
impl AIProvider for OpenAICompatibleProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let response = self.send_request(&request).await?;
        self.parse_response(response).await
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new(&self.config.name, &self.config.model)
    }
}

/// Maps a non-success HTTP status to an [`AIError`].
fn map_error_status(status: u16, error_body: String) -> AIError {
    match status {
        401 | 403 => AIError::AuthenticationFailed,
        429 => AIError::rate_limited(parse_retry_after(&error_body)),
        400 => AIError::InvalidRequest(error_body),
        500..=599 => AIError::unavailable(format!("Server error {}: {}", status, error_body)),
        _ => AIError::network(format!("Unexpected status {}: {}", status, error_body)),
    }
}

/// Parses retry-after seconds from an error body, defaulting to 30.
fn parse_retry_after(error_body: &str) -> u32 {
    if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(error_body) {
        if let Some(s) = parsed
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            if let Some(idx) = s.find("try again in ") {
                let rest = &s[idx + 13..];
                let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
                if let Ok(secs) = digits.parse::<u32>() {
                    return secs;
                }
            }
        }
    }
    30
}

/// Extracts the first choice of a decoded response.
fn into_completion(body: ChatResponse) -> Result<CompletionResponse, AIError> {
    let choice = body
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AIError::parse("No choices in response"))?;

    let finish_reason = match choice.finish_reason.as_deref() {
        Some("length") => FinishReason::Length,
        Some("content_filter") => FinishReason::ContentFilter,
        _ => FinishReason::Stop,
    };

    if finish_reason == FinishReason::ContentFilter {
        return Err(AIError::content_filtered("reply withheld by provider filter"));
    }

    let usage = body
        .usage
        .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
        .unwrap_or_default();

    Ok(CompletionResponse {
        content: choice.message.content.unwrap_or_default(),
        usage,
        model: body.model,
        finish_reason,
    })
}

// ----- Chat Completions API Types -----

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<WireResponseFormat>,
}

#[derive(Debug, Serialize)]
struct WireResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: Option<String>,
}

impl ChatMessage {
    fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audit::Stage;
    use crate::domain::foundation::AuditId;
    use crate::ports::RequestMetadata;

    fn request() -> CompletionRequest {
        CompletionRequest::new(
            RequestMetadata::new(AuditId::new(), Stage::Simulate),
            "Reply in JSON",
            "Decision Text: move abroad",
        )
        .with_temperature(0.0)
        .with_response_format(ResponseFormat::JsonObject)
    }

    #[test]
    fn config_builder_works() {
        let config = OpenAICompatibleConfig::openai("test-key")
            .with_model("gpt-4o")
            .with_base_url("https://custom.api.com")
            .with_timeout(Duration::from_secs(30));

        assert_eq!(config.name, "openai");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.base_url, "https://custom.api.com");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.api_key(), "test-key");
    }

    #[test]
    fn provider_defaults() {
        let openai = OpenAICompatibleConfig::openai("k");
        assert_eq!(openai.base_url, OPENAI_BASE_URL);
        assert_eq!(openai.model, "gpt-4o-mini");

        let groq = OpenAICompatibleConfig::groq("k");
        assert_eq!(groq.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(groq.model, "llama-3.3-70b-versatile");
    }

    #[test]
    fn config_debug_redacts_key() {
        let config = OpenAICompatibleConfig::openai("sk-very-secret");
        assert!(!format!("{:?}", config).contains("sk-very-secret"));
    }

    #[test]
    fn new_rejects_blank_key() {
        let result = OpenAICompatibleProvider::new(OpenAICompatibleConfig::groq("  "));
        assert!(matches!(result, Err(AIError::Configuration(_))));
    }

    #[test]
    fn provider_info_reports_name_and_model() {
        let provider = OpenAICompatibleProvider::new(OpenAICompatibleConfig::groq("gsk_test")).unwrap();
        let info = provider.provider_info();
        assert_eq!(info.name, "groq");
        assert_eq!(info.model, GROQ_DEFAULT_MODEL);
    }

    #[test]
    fn completions_url_ignores_trailing_slash() {
        let provider = OpenAICompatibleProvider::new(
            OpenAICompatibleConfig::openai("k").with_base_url("http://localhost:9000/v1/"),
        )
        .unwrap();
        assert_eq!(provider.completions_url(), "http://localhost:9000/v1/chat/completions");
    }

    #[test]
    fn wire_request_asks_for_json_object() {
        let provider = OpenAICompatibleProvider::new(OpenAICompatibleConfig::openai("k")).unwrap();
        let value = serde_json::to_value(provider.to_wire_request(&request())).unwrap();

        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["temperature"], 0.0);
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][0]["content"], "Reply in JSON");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][1]["content"], "Decision Text: move abroad");
        assert_eq!(value["messages"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn wire_request_omits_format_for_text() {
        let provider = OpenAICompatibleProvider::new(OpenAICompatibleConfig::openai("k")).unwrap();
        let text_request = request().with_response_format(ResponseFormat::Text);
        let value = serde_json::to_value(provider.to_wire_request(&text_request)).unwrap();
        assert!(value.get("response_format").is_none());
    }

    #[test]
    fn status_mapping() {
        assert_eq!(map_error_status(401, String::new()), AIError::AuthenticationFailed);
        assert!(matches!(map_error_status(429, String::new()), AIError::RateLimited { retry_after_secs: 30 }));
        assert!(matches!(map_error_status(400, "bad".into()), AIError::InvalidRequest(_)));
        assert!(matches!(map_error_status(503, String::new()), AIError::Unavailable { .. }));
        assert!(matches!(map_error_status(418, String::new()), AIError::Network(_)));
    }

    #[test]
    fn parse_retry_after_from_message() {
        let error = r#"{"error":{"message":"Rate limit reached. Please try again in 12s."}}"#;
        assert_eq!(parse_retry_after(error), 12);
        assert_eq!(parse_retry_after("not json"), 30);
    }

    #[test]
    fn into_completion_takes_first_choice() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"model":"gpt-4o-mini","choices":[{"message":{"role":"assistant","content":"{\"a\":1}"},"finish_reason":"stop"}],"usage":{"prompt_tokens":10,"completion_tokens":5}}"#,
        )
        .unwrap();

        let completion = into_completion(body).unwrap();
        assert_eq!(completion.content, "{\"a\":1}");
        assert_eq!(completion.usage, TokenUsage::new(10, 5));
        assert_eq!(completion.finish_reason, FinishReason::Stop);
    }

    #[test]
    fn into_completion_treats_null_content_as_empty() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"model":"m","choices":[{"message":{"role":"assistant","content":null},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        assert_eq!(into_completion(body).unwrap().content, "");
    }

    #[test]
    fn into_completion_rejects_filtered_and_empty_choices() {
        let filtered: ChatResponse = serde_json::from_str(
            r#"{"model":"m","choices":[{"message":{"role":"assistant","content":""},"finish_reason":"content_filter"}]}"#,
        )
        .unwrap();
        assert!(matches!(into_completion(filtered), Err(AIError::ContentFiltered { .. })));

        let empty: ChatResponse = serde_json::from_str(r#"{"model":"m","choices":[]}"#).unwrap();
        assert!(matches!(into_completion(empty), Err(AIError::Parse(_))));
    }
}
