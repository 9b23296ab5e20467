mod actions;
mod config;
mod dashboard;
mod errors;
mod flows;
mod llm_client;
mod roles;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::flows::LlmCareerFlows;
use crate::llm_client::{LlmClient, LlmSettings};
use crate::roles::RoleProvider;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Careerpath API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        LlmSettings {
            api_url: config.anthropic_api_url.clone(),
            max_attempts: config.llm_max_attempts,
            timeout: config.llm_timeout_secs.map(Duration::from_secs),
        },
    )?;
    info!(
        "LLM client initialized (model: {}, attempts: {}, timeout: {:?})",
        llm_client::MODEL,
        config.llm_max_attempts,
        config.llm_timeout_secs
    );

    // Build app state
    let state = AppState {
        flows: Arc::new(LlmCareerFlows::new(llm)),
        roles: RoleProvider::with_limits(
            Duration::from_secs(config.session_idle_secs),
            config.max_sessions,
        ),
    };
    info!(
        "Session limits: idle {}s, max {}",
        config.session_idle_secs, config.max_sessions
    );

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client's domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
