//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Model providers (OpenAI-compatible, mock)
//! - `http` - Axum endpoints

pub mod ai;
pub mod http;

pub use ai::{MockAIProvider, OpenAICompatibleConfig, OpenAICompatibleProvider};
pub use self::http::{audit_router, build_router, AuditAppState};
