//! Decision Audit Command Handlers
//!
//! ## Commands
//! - `RunAudit` - Validate a decision and run it through every audit stage

mod run_audit;

pub use run_audit::{RunAuditCommand, RunAuditError, RunAuditHandler};
