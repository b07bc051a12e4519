//! Domain layer containing audit logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, scores, errors)
//! - `audit` - Decision input, stage definitions, content policy and the audit report

pub mod audit;
pub mod foundation;
