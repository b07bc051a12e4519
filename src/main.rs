use std::sync::Arc;

use secondbrain::adapters::ai::OpenAICompatibleProvider;
use secondbrain::adapters::http::{build_router, AuditAppState};
use secondbrain::application::ModelGateway;
use secondbrain::config::AppConfig;
use secondbrain::logging::init_tracing;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server)?;

    // A missing credential stops startup here, before any request is served.
    config.validate()?;

    let provider = OpenAICompatibleProvider::new(config.ai.provider_config()?)?;
    let gateway = ModelGateway::new(Arc::new(provider));
    let info = gateway.provider_info();

    let app = build_router(AuditAppState::new(gateway), &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        provider = %info.name,
        model = %info.model,
        timeout_secs = config.server.request_timeout_secs,
        "secondbrain listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
