//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types
//! that form the vocabulary of the audit domain.

mod errors;
mod ids;
mod score;

pub use errors::ValidationError;
pub use ids::AuditId;
pub use score::Score;
