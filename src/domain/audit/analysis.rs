//! Stage definitions: the instruction each stage sends and the context it renders.
//!
//! Every analysis stage has the same shape (fixed instruction, context built
//! from the [`DecisionInput`], one typed reply). The synthesizer differs only
//! in that its context also carries the four earlier results.

use serde::Serialize;

use super::input::DecisionInput;
use super::results::{
    BiasResult, DecompositionResult, IntegrityResult, SimulationResult, SynthesisResult,
};
use super::stage::{Stage, StageOutput};

/// Rules appended to every instruction.
const SHARED_RULES: &str = "\
Rules:
- Keep a neutral, analytical tone. Do not give advice or recommendations.
- Never tell the user what they \"should\" do and never write \"I recommend\" or \"the best option is\".
- Reply with a single JSON object and nothing else.
- All JSON keys must be snake_case exactly as shown in the reply shape.";

/// An analysis stage that reads only the decision input.
pub trait AnalysisStage {
    type Output: StageOutput;

    /// Task description plus the required reply shape.
    fn instruction(&self) -> String;

    /// Rendering of the input fields this stage needs.
    fn context(&self, input: &DecisionInput) -> String;

    fn stage(&self) -> Stage {
        Self::Output::STAGE
    }
}

fn with_rules(task: &str) -> String {
    format!("{}\n\n{}", task.trim(), SHARED_RULES)
}

fn values_line(input: &DecisionInput) -> String {
    if input.has_values() {
        input.values().join(", ")
    } else {
        "Not provided".to_string()
    }
}

fn render_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

// ════════════════════════════════════════════════════════════════════════════════
// Decomposer
// ════════════════════════════════════════════════════════════════════════════════

/// Turns the free-text decision into structured fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decomposer;

const DECOMPOSER_TASK: &str = r#"
You are a cognitive decision decomposer. Break the decision text into its parts:
- objective: the core goal in one sentence
- constraints: external or internal limitations
- assumptions: beliefs the text takes for granted
- emotional_signals: feelings implied by the wording (for example anxiety, excitement)
- risk_tolerance: "low", "medium" or "high", inferred from the text
- irreversible_factors: elements that cannot be undone once acted on

Reply shape:
{
  "objective": "...",
  "constraints": ["..."],
  "assumptions": ["..."],
  "emotional_signals": ["..."],
  "risk_tolerance": "low|medium|high",
  "irreversible_factors": ["..."]
}
"#;

impl AnalysisStage for Decomposer {
    type Output = DecompositionResult;

    fn instruction(&self) -> String {
        with_rules(DECOMPOSER_TASK)
    }

    fn context(&self, input: &DecisionInput) -> String {
        format!(
            "Domain: {}\nTime Horizon: {}\nValues: {}\n\nDecision Text:\n\"{}\"",
            input.domain(),
            input.time_horizon(),
            values_line(input),
            input.decision_text()
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// BiasDetector
// ════════════════════════════════════════════════════════════════════════════════

/// Bias catalog the detector looks for, with a one-line description each.
pub const BIAS_CATALOG: [(&str, &str); 6] = [
    ("Confirmation Bias", "favoring information that confirms an existing belief"),
    ("Loss Aversion", "weighing possible losses more heavily than equal gains"),
    ("Overconfidence", "overestimating one's knowledge, ability or control"),
    ("Herd Mentality", "following what others do without independent reasoning"),
    ("Present Bias", "preferring immediate rewards over long-term goals"),
    ("Fear-Based Reasoning", "letting anxiety rather than evidence drive the choice"),
];

/// Scans the decision text for the fixed bias catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct BiasDetector;

impl AnalysisStage for BiasDetector {
    type Output = BiasResult;

    fn instruction(&self) -> String {
        let catalog = BIAS_CATALOG
            .iter()
            .map(|(name, description)| format!("- {}: {}", name, description))
            .collect::<Vec<_>>()
            .join("\n");

        with_rules(&format!(
            r#"
You are a cognitive bias detection engine. Label the cognitive biases present in the decision text.

Biases to look for:
{catalog}

For every bias you detect give its "bias_type", the "evidence" (an exact quote or a specific signal from the text)
and a "severity" of "low", "medium" or "high". Only report biases that are clearly present; if none are, return an
empty list.

Reply shape:
{{
  "biases": [
    {{ "bias_type": "...", "evidence": "...", "severity": "low|medium|high" }}
  ]
}}
"#
        ))
    }

    fn context(&self, input: &DecisionInput) -> String {
        format!(
            "Domain: {}\n\nDecision Text:\n\"{}\"",
            input.domain(),
            input.decision_text()
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// ScenarioSimulator
// ════════════════════════════════════════════════════════════════════════════════

/// Projects four possible futures and the factors that could swing them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioSimulator;

const SIMULATOR_TASK: &str = r#"
You are a counterfactual simulation engine. Project possible futures of the decision:
- best_case: an optimistic outcome
- worst_case: a pessimistic outcome
- most_likely: a realistic outcome
- long_term: effects beyond the stated time horizon
Also list "uncertainties": the key factors that could swing the outcome.

Use probabilistic language ("could lead to", "might result in") and avoid numerical guarantees.

Reply shape:
{
  "scenarios": {
    "best_case": "...",
    "worst_case": "...",
    "most_likely": "...",
    "long_term": "..."
  },
  "uncertainties": ["..."]
}
"#;

impl AnalysisStage for ScenarioSimulator {
    type Output = SimulationResult;

    fn instruction(&self) -> String {
        with_rules(SIMULATOR_TASK)
    }

    fn context(&self, input: &DecisionInput) -> String {
        format!(
            "Domain: {}\nTime Horizon: {}\n\nDecision Text:\n\"{}\"",
            input.domain(),
            input.time_horizon(),
            input.decision_text()
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// IntegrityChecker
// ════════════════════════════════════════════════════════════════════════════════

/// Scores the decision against the caller's stated values.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegrityChecker;

const INTEGRITY_TASK: &str = r#"
You are a value alignment engine. Compare the decision against the user's stated values.
- alignment_score: a number from 0 to 100 where 100 means full alignment
- conflicts: each stated value the decision may work against, with the reason

Flag direct contradictions objectively. Do not judge the user's morality. If no values are
provided, treat the check as neutral and return an alignment_score of 100 with no conflicts.

Reply shape:
{
  "alignment_score": 85.0,
  "conflicts": [
    { "value": "...", "conflict_reason": "..." }
  ]
}
"#;

impl AnalysisStage for IntegrityChecker {
    type Output = IntegrityResult;

    fn instruction(&self) -> String {
        with_rules(INTEGRITY_TASK)
    }

    fn context(&self, input: &DecisionInput) -> String {
        format!(
            "Domain: {}\n\nDecision Text:\n\"{}\"\n\nUser Values:\n\"{}\"",
            input.domain(),
            input.decision_text(),
            values_line(input)
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// ReportSynthesizer
// ════════════════════════════════════════════════════════════════════════════════

/// The four analysis results the synthesizer fans in.
#[derive(Debug, Clone, Copy)]
pub struct PriorResults<'a> {
    pub decomposition: &'a DecompositionResult,
    pub bias: &'a BiasResult,
    pub simulation: &'a SimulationResult,
    pub integrity: &'a IntegrityResult,
}

/// Condenses the earlier results into scores and reflection questions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportSynthesizer;

const SYNTHESIZER_TASK: &str = r#"
You are a decision integrity report generator. Synthesize the analyses below into a final audit.
Do not repeat the raw analysis; condense it.
- risk_score (0-100): composite risk from the irreversible factors, the worst-case scenario and the detected biases
- bias_score (0-100): inverse of the overall bias severity, 100 means no cognitive distortion
- alignment_score (0-100): taken from the integrity check
- key_assumptions: at most 3 of the most critical assumptions from the decomposition
- missing_information: important information the decision does not account for
- reflection_questions: 3 to 5 questions that prompt self-reflection

Every reflection question must end with a question mark. Ask ("Have you considered ...?"),
never instruct.

Reply shape:
{
  "risk_score": 0.0,
  "bias_score": 0.0,
  "alignment_score": 0.0,
  "key_assumptions": ["..."],
  "missing_information": ["..."],
  "reflection_questions": ["...?"]
}
"#;

impl ReportSynthesizer {
    pub fn stage(&self) -> Stage {
        SynthesisResult::STAGE
    }

    pub fn instruction(&self) -> String {
        with_rules(SYNTHESIZER_TASK)
    }

    pub fn context(&self, input: &DecisionInput, prior: PriorResults<'_>) -> String {
        format!(
            "Decision: \"{}\"\nDomain: {}\nTime Horizon: {}\n\n\
             Decomposition: {}\nBiases Detected: {}\nSimulation: {}\nIntegrity: {}",
            input.decision_text(),
            input.domain(),
            input.time_horizon(),
            render_json(prior.decomposition),
            render_json(prior.bias),
            render_json(prior.simulation),
            render_json(prior.integrity)
        )
    }
}
