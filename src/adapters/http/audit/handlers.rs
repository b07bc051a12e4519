//! HTTP handlers for audit endpoints
//!
//! These handlers connect Axum routes to the audit command handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::application::handlers::audit::{RunAuditCommand, RunAuditError, RunAuditHandler};
use crate::application::model_gateway::ModelGateway;

use super::dto::{AuditRequest, ErrorResponse, HealthResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AuditAppState {
    pub gateway: ModelGateway,
}

impl AuditAppState {
    pub fn new(gateway: ModelGateway) -> Self {
        Self { gateway }
    }

    pub fn run_audit_handler(&self) -> RunAuditHandler {
        RunAuditHandler::new(self.gateway.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// Audit a decision
///
/// POST /audit
pub async fn run_audit(
    State(app_state): State<AuditAppState>,
    payload: Result<Json<AuditRequest>, JsonRejection>,
) -> Result<impl IntoResponse, impl IntoResponse> {
    let Json(req) = payload.map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(rejection.body_text())),
        )
    })?;

    let cmd = RunAuditCommand {
        decision_text: req.decision_text,
        domain: req.domain,
        time_horizon: req.time_horizon,
        values: req.values.unwrap_or_default(),
    };

    let handler = app_state.run_audit_handler();
    let report = handler.handle(cmd).await.map_err(|e| match e {
        RunAuditError::InvalidInput(_) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(e.to_string())),
        ),
        RunAuditError::StageFailed { stage, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal(e.to_string()).with_details(json!({ "stage": stage }))),
        ),
    })?;

    Ok::<_, (StatusCode, Json<ErrorResponse>)>((StatusCode::OK, Json(report)))
}

/// Liveness check
///
/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::audit::Stage;

    fn test_app_state(provider: &MockAIProvider) -> AuditAppState {
        AuditAppState::new(ModelGateway::new(Arc::new(provider.clone())))
    }

    fn request(text: &str) -> AuditRequest {
        AuditRequest {
            decision_text: text.to_string(),
            domain: "health".to_string(),
            time_horizon: "medium".to_string(),
            values: None,
        }
    }

    #[tokio::test]
    async fn test_run_audit_rejects_blank_text() {
        let provider = MockAIProvider::new();

        let result = run_audit(State(test_app_state(&provider)), Ok(Json(request("  ")))).await;

        let response = result.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_run_audit_maps_stage_failure_to_500() {
        let provider = MockAIProvider::new().with_stage_error(
            Stage::Decompose,
            MockError::Network {
                message: "connection reset".to_string(),
            },
        );

        let result = run_audit(
            State(test_app_state(&provider)),
            Ok(Json(request("Start running marathons"))),
        )
        .await;

        let response = result.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_health() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
