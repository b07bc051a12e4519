//! DecisionInput - the immutable request every stage reads.

use serde::Serialize;

use crate::domain::foundation::ValidationError;

/// Domain used when the caller leaves it blank.
pub const DEFAULT_DOMAIN: &str = "general";

/// Time horizon used when the caller leaves it blank.
pub const DEFAULT_TIME_HORIZON: &str = "medium";

/// A decision submitted for audit.
///
/// Built once per request through [`DecisionInput::new`] and only read
/// afterwards. `domain` is conventionally one of finance, career, health or
/// general and `time_horizon` one of short, medium or long; neither is
/// restricted to that vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionInput {
    decision_text: String,
    domain: String,
    time_horizon: String,
    values: Vec<String>,
}

impl DecisionInput {
    /// Validates and normalizes raw request fields.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyField` when `decision_text` is empty
    /// after trimming.
    pub fn new(
        decision_text: impl Into<String>,
        domain: impl Into<String>,
        time_horizon: impl Into<String>,
        values: impl IntoIterator<Item = String>,
    ) -> Result<Self, ValidationError> {
        let decision_text = decision_text.into().trim().to_string();
        if decision_text.is_empty() {
            return Err(ValidationError::empty_field("decision_text"));
        }

        Ok(Self {
            decision_text,
            domain: or_default(domain.into(), DEFAULT_DOMAIN),
            time_horizon: or_default(time_horizon.into(), DEFAULT_TIME_HORIZON),
            values: dedup_values(values),
        })
    }

    pub fn decision_text(&self) -> &str {
        &self.decision_text
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn time_horizon(&self) -> &str {
        &self.time_horizon
    }

    /// Stated values, in caller order, without duplicates.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn has_values(&self) -> bool {
        !self.values.is_empty()
    }
}

fn or_default(value: String, default: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Trims entries, drops blanks and keeps the first of any case-insensitive duplicates.
fn dedup_values(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        let key = trimmed.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(trimmed.to_string());
    }
    out
}
