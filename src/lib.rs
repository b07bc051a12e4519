//! SecondBrain - Decision Integrity Audit Service
//!
//! This crate audits a single decision through five sequential LLM stages
//! (decompose, detect biases, simulate, check integrity, synthesize) and
//! returns a composite report of scores, assumptions and reflection questions.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod logging;
pub mod ports;
