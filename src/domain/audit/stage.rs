//! Pipeline stages and the post-decode contract each stage result obeys.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::input::DecisionInput;
use super::policy::{is_interrogative, require_text, scan_for_directives, OutputViolation};
use super::results::{
    BiasResult, DecompositionResult, IntegrityResult, SimulationResult, SynthesisResult,
    REFLECTION_QUESTIONS_RANGE,
};

/// One step of the audit pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Decompose,
    DetectBiases,
    Simulate,
    CheckIntegrity,
    Synthesize,
}

impl Stage {
    /// Fixed evaluation order. Synthesize is always last.
    pub const ORDER: [Stage; 5] = [
        Stage::Decompose,
        Stage::DetectBiases,
        Stage::Simulate,
        Stage::CheckIntegrity,
        Stage::Synthesize,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Decompose => "decompose",
            Stage::DetectBiases => "detect_biases",
            Stage::Simulate => "simulate",
            Stage::CheckIntegrity => "check_integrity",
            Stage::Synthesize => "synthesize",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A result type a stage decodes its model reply into.
///
/// Decoding (`DeserializeOwned`) enforces field names, types and ranges;
/// [`StageOutput::validate`] then enforces the content rules that a schema
/// cannot express.
pub trait StageOutput: DeserializeOwned + Serialize + Send + Sized {
    /// Stage producing this output.
    const STAGE: Stage;

    /// Type-specific checks. Defaults to none.
    fn check(&self) -> Result<(), OutputViolation> {
        Ok(())
    }

    /// Type-specific checks followed by the directive-language scan.
    ///
    /// Phrases the user wrote in `input` may be quoted back without tripping
    /// the scan.
    fn validate(&self, input: &DecisionInput) -> Result<(), OutputViolation> {
        self.check()?;
        scan_for_directives(self, input.decision_text())
    }
}

impl StageOutput for DecompositionResult {
    const STAGE: Stage = Stage::Decompose;

    fn check(&self) -> Result<(), OutputViolation> {
        require_text("objective", &self.objective)
    }
}

impl StageOutput for BiasResult {
    const STAGE: Stage = Stage::DetectBiases;

    fn check(&self) -> Result<(), OutputViolation> {
        for finding in &self.biases {
            require_text("bias_type", &finding.bias_type)?;
            require_text("evidence", &finding.evidence)?;
        }
        Ok(())
    }
}

impl StageOutput for SimulationResult {
    const STAGE: Stage = Stage::Simulate;

    fn check(&self) -> Result<(), OutputViolation> {
        let s = &self.scenarios;
        require_text("best_case", &s.best_case)?;
        require_text("worst_case", &s.worst_case)?;
        require_text("most_likely", &s.most_likely)?;
        require_text("long_term", &s.long_term)
    }
}

impl StageOutput for IntegrityResult {
    const STAGE: Stage = Stage::CheckIntegrity;
}

impl StageOutput for SynthesisResult {
    const STAGE: Stage = Stage::Synthesize;

    fn check(&self) -> Result<(), OutputViolation> {
        let count = self.reflection_questions.len();
        if !REFLECTION_QUESTIONS_RANGE.contains(&count) {
            return Err(OutputViolation::QuestionCount {
                min: *REFLECTION_QUESTIONS_RANGE.start(),
                max: *REFLECTION_QUESTIONS_RANGE.end(),
                actual: count,
            });
        }
        if let Some(text) = self
            .reflection_questions
            .iter()
            .find(|q| !is_interrogative(q))
        {
            return Err(OutputViolation::NotAQuestion { text: text.clone() });
        }
        Ok(())
    }
}
