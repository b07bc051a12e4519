//! Route definitions for audit endpoints

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{health, run_audit, AuditAppState};

/// Create audit router with all endpoints
///
/// # Endpoints
///
/// - `POST /audit` - Audit a decision
/// - `GET /health` - Liveness check
pub fn routes() -> Router<AuditAppState> {
    Router::new()
        .route("/audit", post(run_audit))
        .route("/health", get(health))
}
