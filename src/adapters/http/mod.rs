//! HTTP adapters - REST API implementations.
//!
//! Each domain module has its own HTTP adapter for endpoint exposure;
//! `server` assembles them with the shared middleware stack.

pub mod audit;
pub mod server;

// Re-export key types for convenience
pub use audit::routes as audit_router;
pub use audit::AuditAppState;
pub use server::build_router;
