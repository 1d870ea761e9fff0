//! Invoice agent API: answers questions about nota fiscal datasets over HTTP.

use std::sync::Arc;

use nf_agent_api::agent::AgentContext;
use nf_agent_api::config::ApiConfig;
use nf_agent_api::inference::{DisabledGenerator, GeminiGenerator, TextGenerator};
use nf_agent_api::router::QueryRouter;
use nf_agent_api::routes;
use nf_agent_api::state::AppState;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "nf-agent-api starting");

    let config = ApiConfig::load()?;

    let fallback: Arc<dyn TextGenerator> = match GeminiGenerator::new(config.gemini.clone()) {
        Ok(generator) => {
            tracing::info!(model = %config.gemini.model, "gemini fallback enabled");
            Arc::new(generator)
        }
        Err(e) => {
            tracing::warn!(error = %e, "gemini fallback disabled, only rule-matched questions will be answered");
            Arc::new(DisabledGenerator)
        }
    };

    let source = config.dataset_source();
    let agent = AgentContext::new(Arc::new(source), QueryRouter::new(fallback));

    // Serve immediately; the first load runs in the background.
    if let Some(handle) = agent.reload() {
        tokio::spawn(async move {
            if let Err(e) = handle.wait().await {
                tracing::error!(error = %e, "initial dataset load failed, POST /api/reload to retry");
            }
        });
    }

    let state = AppState::new(agent).with_cors_origins(config.cors_origins.clone());
    let app = routes::build_router(state);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
