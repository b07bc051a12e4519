//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! ## Available Adapters
//!
//! - `OpenAICompatibleProvider` - OpenAI and Groq chat-completions APIs
//! - `MockAIProvider` - Configurable mock for testing

mod mock_provider;
mod openai_compatible_provider;

pub use mock_provider::{MockAIProvider, MockError};
pub use openai_compatible_provider::{
    OpenAICompatibleConfig, OpenAICompatibleProvider, GROQ_BASE_URL, GROQ_DEFAULT_MODEL,
    OPENAI_BASE_URL, OPENAI_DEFAULT_MODEL,
};
