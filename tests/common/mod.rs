//! Shared fixtures for audit integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use secondbrain::adapters::ai::MockAIProvider;
use secondbrain::adapters::http::{build_router, AuditAppState};
use secondbrain::application::{ModelGateway, RunAuditHandler};
use secondbrain::config::ServerConfig;
use secondbrain::domain::audit::Stage;

pub const CRYPTO_DECISION: &str = "I want to invest my entire savings into a new crypto coin \
     because my friend said it will go up 100x next week.";

pub const CRYPTO_VALUES: [&str; 2] = ["security", "long-term growth"];

pub const DECOMPOSITION: &str = r#"{
    "objective": "Grow personal savings quickly through a new cryptocurrency",
    "constraints": ["only one pool of savings", "short time horizon"],
    "assumptions": ["the coin will gain value", "the friend has reliable information"],
    "emotional_signals": ["excitement", "fear of missing out"],
    "risk_tolerance": "high",
    "irreversible_factors": ["the entire savings would be exposed"]
}"#;

pub const BIASES: &str = r#"{
    "biases": [
        {"bias_type": "Herd Mentality", "evidence": "my friend said it will go up 100x", "severity": "high"},
        {"bias_type": "Overconfidence", "evidence": "it will go up 100x next week", "severity": "high"},
        {"bias_type": "Present Bias", "evidence": "next week", "severity": "medium"}
    ]
}"#;

pub const SIMULATION: &str = r#"{
    "scenarios": {
        "best_case": "The coin could appreciate and multiply the savings.",
        "worst_case": "The coin might collapse and the savings could be lost.",
        "most_likely": "The value could swing widely over the coming months.",
        "long_term": "A loss may delay other financial goals for years."
    },
    "uncertainties": ["market volatility", "project credibility", "regulation"]
}"#;

pub const INTEGRITY: &str = r#"{
    "alignment_score": 25,
    "conflicts": [
        {"value": "security", "conflict_reason": "Concentrating savings in one volatile asset works against stability."}
    ]
}"#;

pub const SYNTHESIS: &str = r#"{
    "risk_score": 88,
    "bias_score": 30,
    "alignment_score": 60,
    "key_assumptions": [
        "the coin will gain value",
        "the friend has reliable information",
        "the savings are not needed soon",
        "liquidity will remain available"
    ],
    "missing_information": ["size of emergency fund", "background of the coin's team"],
    "reflection_questions": [
        "How would losing all of these savings change your plans?",
        "What do you know about this coin beyond your friend's view?",
        "What would you need to see before committing a smaller amount?",
        "How does this fit with your wish for security?"
    ]
}"#;

/// Canned reply for each stage, in pipeline order.
pub fn canned_replies() -> [(Stage, &'static str); 5] {
    [
        (Stage::Decompose, DECOMPOSITION),
        (Stage::DetectBiases, BIASES),
        (Stage::Simulate, SIMULATION),
        (Stage::CheckIntegrity, INTEGRITY),
        (Stage::Synthesize, SYNTHESIS),
    ]
}

/// Provider answering every stage with its canned reply.
pub fn scripted_provider() -> MockAIProvider {
    scripted_provider_with(None)
}

/// Provider answering with canned replies except `(stage, reply)` when given.
pub fn scripted_provider_with(replace: Option<(Stage, &str)>) -> MockAIProvider {
    canned_replies()
        .into_iter()
        .fold(MockAIProvider::new(), |provider, (stage, reply)| {
            match replace {
                Some((target, replacement)) if target == stage => {
                    provider.with_stage_response(stage, replacement)
                }
                _ => provider.with_stage_response(stage, reply),
            }
        })
}

pub fn gateway(provider: &MockAIProvider) -> ModelGateway {
    ModelGateway::new(Arc::new(provider.clone()))
}

pub fn audit_handler(provider: &MockAIProvider) -> RunAuditHandler {
    RunAuditHandler::new(gateway(provider))
}

pub fn app(provider: &MockAIProvider) -> Router {
    build_router(AuditAppState::new(gateway(provider)), &ServerConfig::default())
}

pub fn crypto_request(values: Option<&[&str]>) -> Value {
    let mut body = json!({
        "decision_text": CRYPTO_DECISION,
        "domain": "finance",
        "time_horizon": "short"
    });
    if let Some(values) = values {
        body["values"] = json!(values);
    }
    body
}

/// Sends `POST /audit` with a raw body and returns the status and JSON body.
pub async fn post_audit_raw(app: Router, body: String) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::post("/audit")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

pub async fn post_audit(app: Router, body: Value) -> (StatusCode, Value) {
    post_audit_raw(app, body.to_string()).await
}

/// Replaces every leaf with its JSON type name, keeping keys and nesting.
pub fn shape(value: &Value) -> Value {
    match value {
        Value::Null => json!("null"),
        Value::Bool(_) => json!("bool"),
        Value::Number(_) => json!("number"),
        Value::String(_) => json!("string"),
        Value::Array(items) => Value::Array(items.iter().map(shape).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, inner)| (key.clone(), shape(inner)))
                .collect(),
        ),
    }
}
