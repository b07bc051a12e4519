//! Typed stage results and the composite audit report.
//!
//! Field names are the wire contract: model replies are decoded straight into
//! these structs and the HTTP response serializes them unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Score, ValidationError};

/// Maximum number of key assumptions carried into a report.
pub const MAX_KEY_ASSUMPTIONS: usize = 3;

/// Allowed number of reflection questions in a report.
pub const REFLECTION_QUESTIONS_RANGE: std::ops::RangeInclusive<usize> = 3..=5;

// ════════════════════════════════════════════════════════════════════════════════
// Levels
// ════════════════════════════════════════════════════════════════════════════════

macro_rules! level_enum {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", rename_all = "lowercase")]
        pub enum $name {
            Low,
            Medium,
            High,
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $name::Low => "low",
                    $name::Medium => "medium",
                    $name::High => "high",
                }
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    "low" => Ok($name::Low),
                    "medium" => Ok($name::Medium),
                    "high" => Ok($name::High),
                    other => Err(ValidationError::invalid_format(
                        $field,
                        format!("expected low, medium or high, got '{}'", other),
                    )),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

level_enum!(
    /// Risk appetite inferred from the decision text.
    RiskLevel,
    "risk_tolerance"
);

level_enum!(
    /// Strength of a detected bias.
    Severity,
    "severity"
);

// ════════════════════════════════════════════════════════════════════════════════
// Stage results
// ════════════════════════════════════════════════════════════════════════════════

/// Structured breakdown of the decision text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionResult {
    pub objective: String,
    pub constraints: Vec<String>,
    pub assumptions: Vec<String>,
    pub emotional_signals: Vec<String>,
    pub risk_tolerance: RiskLevel,
    pub irreversible_factors: Vec<String>,
}

/// One detected cognitive bias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasFinding {
    pub bias_type: String,
    /// Quote or signal from the decision text supporting the finding.
    pub evidence: String,
    pub severity: Severity,
}

/// All biases found in a decision. Empty when none are strongly present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BiasResult {
    pub biases: Vec<BiasFinding>,
}

impl BiasResult {
    /// Most severe finding, if any.
    pub fn highest_severity(&self) -> Option<Severity> {
        self.biases.iter().map(|b| b.severity).max()
    }
}

/// Four probabilistic projections of the decision's outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub best_case: String,
    pub worst_case: String,
    pub most_likely: String,
    pub long_term: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub scenarios: ScenarioSet,
    pub uncertainties: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityConflict {
    pub value: String,
    pub conflict_reason: String,
}

/// How well the decision matches the caller's stated values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityResult {
    pub alignment_score: Score,
    pub conflicts: Vec<IntegrityConflict>,
}

impl IntegrityResult {
    /// Result for a decision checked against no values at all.
    pub fn neutral() -> Self {
        Self {
            alignment_score: Score::NEUTRAL,
            conflicts: Vec::new(),
        }
    }
}

/// The synthesizer's own reply, before the intermediate results are attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub risk_score: Score,
    /// 100 means no detected distortion.
    pub bias_score: Score,
    pub alignment_score: Score,
    pub key_assumptions: Vec<String>,
    pub missing_information: Vec<String>,
    pub reflection_questions: Vec<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Composite report
// ════════════════════════════════════════════════════════════════════════════════

/// Final response of an audit: synthesized scores plus every intermediate result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub risk_score: Score,
    pub bias_score: Score,
    pub alignment_score: Score,
    pub key_assumptions: Vec<String>,
    pub missing_information: Vec<String>,
    pub reflection_questions: Vec<String>,
    pub decomposition: DecompositionResult,
    pub bias_analysis: BiasResult,
    pub simulation: SimulationResult,
    pub integrity_analysis: IntegrityResult,
}

impl AuditReport {
    /// Merges the synthesizer reply with the four analysis results.
    ///
    /// The alignment score is taken from the integrity result rather than the
    /// synthesizer, and key assumptions are capped at [`MAX_KEY_ASSUMPTIONS`].
    pub fn assemble(
        synthesis: SynthesisResult,
        decomposition: DecompositionResult,
        bias_analysis: BiasResult,
        simulation: SimulationResult,
        integrity_analysis: IntegrityResult,
    ) -> Self {
        let mut key_assumptions = synthesis.key_assumptions;
        key_assumptions.truncate(MAX_KEY_ASSUMPTIONS);

        Self {
            risk_score: synthesis.risk_score,
            bias_score: synthesis.bias_score,
            alignment_score: integrity_analysis.alignment_score,
            key_assumptions,
            missing_information: synthesis.missing_information,
            reflection_questions: synthesis.reflection_questions,
            decomposition,
            bias_analysis,
            simulation,
            integrity_analysis,
        }
    }
}
