//! RunAuditHandler - Run the five-stage audit for one decision

use thiserror::Error;
use tracing::Instrument;

use crate::application::model_gateway::{GatewayError, ModelGateway};
use crate::domain::audit::{
    AnalysisStage, AuditReport, BiasDetector, DecisionInput, Decomposer, IntegrityChecker,
    IntegrityResult, PriorResults, ReportSynthesizer, ScenarioSimulator, Stage, SynthesisResult,
    MAX_KEY_ASSUMPTIONS,
};
use crate::domain::foundation::{AuditId, ValidationError};

/// Command to audit a decision
#[derive(Debug, Clone)]
pub struct RunAuditCommand {
    pub decision_text: String,
    pub domain: String,
    pub time_horizon: String,
    pub values: Vec<String>,
}

/// Error type for running an audit
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunAuditError {
    /// Request rejected before any model call
    #[error("{0}")]
    InvalidInput(#[from] ValidationError),

    /// A stage failed; later stages were not run
    #[error("audit failed at {stage} stage: {source}")]
    StageFailed {
        stage: Stage,
        #[source]
        source: GatewayError,
    },
}

impl RunAuditError {
    /// Stage that failed, if the audit got past input validation.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            RunAuditError::InvalidInput(_) => None,
            RunAuditError::StageFailed { stage, .. } => Some(*stage),
        }
    }
}

/// Handler for auditing decisions
pub struct RunAuditHandler {
    gateway: ModelGateway,
}

impl RunAuditHandler {
    pub fn new(gateway: ModelGateway) -> Self {
        Self { gateway }
    }

    pub async fn handle(&self, cmd: RunAuditCommand) -> Result<AuditReport, RunAuditError> {
        let input = DecisionInput::new(cmd.decision_text, cmd.domain, cmd.time_horizon, cmd.values)?;

        let audit_id = AuditId::new();
        let span = tracing::info_span!(
            "audit",
            %audit_id,
            domain = input.domain(),
            time_horizon = input.time_horizon(),
        );

        self.run(audit_id, &input).instrument(span).await
    }

    async fn run(&self, audit_id: AuditId, input: &DecisionInput) -> Result<AuditReport, RunAuditError> {
        let decomposition = self.analyze(&Decomposer, audit_id, input).await?;
        let bias = self.analyze(&BiasDetector, audit_id, input).await?;
        tracing::debug!(
            findings = bias.biases.len(),
            highest_severity = ?bias.highest_severity(),
            "biases detected"
        );
        let simulation = self.analyze(&ScenarioSimulator, audit_id, input).await?;
        let integrity = self.check_integrity(audit_id, input).await?;

        let synthesizer = ReportSynthesizer;
        let stage = synthesizer.stage();
        tracing::debug!(%stage, "stage started");
        let context = synthesizer.context(
            input,
            PriorResults {
                decomposition: &decomposition,
                bias: &bias,
                simulation: &simulation,
                integrity: &integrity,
            },
        );
        let synthesis: SynthesisResult = self
            .gateway
            .invoke(audit_id, &synthesizer.instruction(), &context, input)
            .await
            .map_err(|source| {
                tracing::warn!(%stage, error = %source, "stage failed");
                RunAuditError::StageFailed { stage, source }
            })?;
        tracing::debug!(%stage, "stage finished");

        if synthesis.key_assumptions.len() > MAX_KEY_ASSUMPTIONS {
            tracing::warn!(
                count = synthesis.key_assumptions.len(),
                kept = MAX_KEY_ASSUMPTIONS,
                "synthesis returned too many key assumptions, truncating"
            );
        }

        let report = AuditReport::assemble(synthesis, decomposition, bias, simulation, integrity);

        tracing::info!(
            risk_score = %report.risk_score,
            bias_score = %report.bias_score,
            alignment_score = %report.alignment_score,
            "audit completed"
        );

        Ok(report)
    }

    /// Runs one analysis stage with start/finish/failure logging.
    async fn analyze<S: AnalysisStage>(
        &self,
        stage: &S,
        audit_id: AuditId,
        input: &DecisionInput,
    ) -> Result<S::Output, RunAuditError> {
        let name = stage.stage();
        tracing::debug!(stage = %name, "stage started");

        match self.gateway.run(stage, audit_id, input).await {
            Ok(output) => {
                tracing::debug!(stage = %name, "stage finished");
                Ok(output)
            }
            Err(source) => {
                tracing::warn!(stage = %name, error = %source, "stage failed");
                Err(RunAuditError::StageFailed { stage: name, source })
            }
        }
    }

    /// Runs the integrity stage.
    ///
    /// With no stated values the result is always neutral, so only a failed
    /// call aborts the audit; an unusable reply is replaced like any other.
    async fn check_integrity(
        &self,
        audit_id: AuditId,
        input: &DecisionInput,
    ) -> Result<IntegrityResult, RunAuditError> {
        if input.has_values() {
            return self.analyze(&IntegrityChecker, audit_id, input).await;
        }

        let stage = IntegrityChecker.stage();
        tracing::debug!(%stage, "stage started");

        match self.gateway.run(&IntegrityChecker, audit_id, input).await {
            Ok(reported) if reported != IntegrityResult::neutral() => {
                tracing::debug!(
                    reported = %reported.alignment_score,
                    "no values stated, integrity reset to neutral"
                );
            }
            Ok(_) => {}
            Err(source) if source.is_reply_error() => {
                tracing::debug!(error = %source, "no values stated, unusable integrity reply ignored");
            }
            Err(source) => {
                tracing::warn!(%stage, error = %source, "stage failed");
                return Err(RunAuditError::StageFailed { stage, source });
            }
        }

        tracing::debug!(%stage, "stage finished");
        Ok(IntegrityResult::neutral())
    }
}
