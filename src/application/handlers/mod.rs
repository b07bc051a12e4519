//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod audit;

pub use audit::{RunAuditCommand, RunAuditError, RunAuditHandler};
