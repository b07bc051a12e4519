//! ModelGateway - one typed model call per audit stage.
//!
//! Sends a stage's instruction and context to the configured [`AIProvider`]
//! and turns the raw reply into the stage's result type. A reply passes three
//! gates in order: it must be JSON, it must decode into the result type, and
//! the decoded value must satisfy [`StageOutput::validate`].

use std::sync::Arc;

use thiserror::Error;

use crate::domain::audit::{AnalysisStage, DecisionInput, OutputViolation, StageOutput};
use crate::domain::foundation::AuditId;
use crate::ports::{
    AIError, AIProvider, CompletionRequest, FinishReason, ProviderInfo, RequestMetadata,
    ResponseFormat,
};

/// Sampling temperature for every stage call.
pub const AUDIT_TEMPERATURE: f32 = 0.0;

/// Why a stage call produced no usable result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// The provider rejected the credential or is not set up.
    #[error("model provider is misconfigured: {0}")]
    Configuration(String),

    /// The call itself failed (network, timeout, rate limit, outage).
    #[error("model call failed: {0}")]
    Transport(AIError),

    /// The reply carried no content.
    #[error("model returned an empty reply")]
    EmptyReply,

    /// The reply is not parseable JSON.
    #[error("model reply is not valid JSON: {0}")]
    MalformedJson(String),

    /// The reply is JSON but does not match the expected result shape.
    #[error("model reply does not match the expected shape: {0}")]
    SchemaInvalid(String),

    /// The reply decoded but breaks a content rule.
    #[error("model reply rejected: {0}")]
    Violation(#[from] OutputViolation),
}

impl From<AIError> for GatewayError {
    fn from(err: AIError) -> Self {
        if err.is_configuration() {
            GatewayError::Configuration(err.to_string())
        } else {
            GatewayError::Transport(err)
        }
    }
}

impl GatewayError {
    /// True when the call succeeded but the reply itself was unusable.
    pub fn is_reply_error(&self) -> bool {
        matches!(
            self,
            GatewayError::EmptyReply
                | GatewayError::MalformedJson(_)
                | GatewayError::SchemaInvalid(_)
                | GatewayError::Violation(_)
        )
    }
}

/// Typed access to the model for the audit pipeline.
#[derive(Clone)]
pub struct ModelGateway {
    provider: Arc<dyn AIProvider>,
}

impl ModelGateway {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_info(&self) -> ProviderInfo {
        self.provider.provider_info()
    }

    /// Runs an analysis stage against `input`.
    pub async fn run<S: AnalysisStage>(
        &self,
        stage: &S,
        audit_id: AuditId,
        input: &DecisionInput,
    ) -> Result<S::Output, GatewayError> {
        self.invoke::<S::Output>(audit_id, &stage.instruction(), &stage.context(input), input)
            .await
    }

    /// Sends one instruction/context pair and decodes the reply as `T`.
    ///
    /// `input` is the decision under audit; the content rules use it to tell
    /// quotes of the user's text apart from the model's own wording.
    ///
    /// # Errors
    ///
    /// - `Configuration` / `Transport` when the provider call fails
    /// - `EmptyReply`, `MalformedJson`, `SchemaInvalid` when the reply cannot be decoded
    /// - `Violation` when the decoded reply breaks a content rule
    pub async fn invoke<T: StageOutput>(
        &self,
        audit_id: AuditId,
        instruction: &str,
        context: &str,
        input: &DecisionInput,
    ) -> Result<T, GatewayError> {
        let stage = T::STAGE;
        let request = CompletionRequest::new(
            RequestMetadata::new(audit_id, stage),
            instruction,
            context,
        )
        .with_temperature(AUDIT_TEMPERATURE)
        .with_response_format(ResponseFormat::JsonObject);

        let response = self.provider.complete(request).await?;

        tracing::debug!(
            %stage,
            model = %response.model,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "model reply received"
        );
        if response.finish_reason == FinishReason::Length {
            tracing::warn!(%stage, "model reply cut off at the token limit");
        }

        decode_reply::<T>(&response.content, input)
    }
}

/// Applies the JSON, shape and content gates to a raw reply.
pub fn decode_reply<T: StageOutput>(
    content: &str,
    input: &DecisionInput,
) -> Result<T, GatewayError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(GatewayError::EmptyReply);
    }

    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| GatewayError::MalformedJson(e.to_string()))?;

    let output: T =
        serde_json::from_value(value).map_err(|e| GatewayError::SchemaInvalid(e.to_string()))?;

    output.validate(input)?;
    Ok(output)
}
