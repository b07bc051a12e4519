//! HTTP adapters for decision audits
//!
//! Exposes the audit endpoint and a liveness check.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::AuditAppState;
pub use routes::routes;
