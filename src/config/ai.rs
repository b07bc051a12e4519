//! AI provider configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use crate::adapters::ai::OpenAICompatibleConfig;

use super::error::ValidationError;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Provider to call
    #[serde(default)]
    pub provider: AiProvider,

    /// API key for the selected provider
    pub api_key: Option<SecretString>,

    /// Model override (provider default when unset)
    pub model: Option<String>,

    /// Base URL override (provider default when unset)
    pub base_url: Option<String>,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// AI provider type
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    OpenAI,
    Groq,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_api_key() {
            return Err(ValidationError::MissingRequired("AI__API_KEY"));
        }

        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }

        if let Some(ref url) = self.base_url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ValidationError::InvalidBaseUrl(url.clone()));
            }
        }

        Ok(())
    }

    /// Builds the adapter configuration for the selected provider
    pub fn provider_config(&self) -> Result<OpenAICompatibleConfig, ValidationError> {
        self.validate()?;

        let key = self
            .api_key
            .as_ref()
            .map(|k| k.expose_secret().clone())
            .ok_or(ValidationError::MissingRequired("AI__API_KEY"))?;

        let mut config = match self.provider {
            AiProvider::OpenAI => OpenAICompatibleConfig::openai(key),
            AiProvider::Groq => OpenAICompatibleConfig::groq(key),
        };
        if let Some(ref model) = self.model {
            config = config.with_model(model);
        }
        if let Some(ref url) = self.base_url {
            config = config.with_base_url(url);
        }

        Ok(config.with_timeout(self.timeout()))
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::default(),
            api_key: None,
            model: None,
            base_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    60
}
