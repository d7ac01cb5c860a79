//! Main Entrypoint for the Celine API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing the session archive, prompt set, and generation gateway.
//! 3. Constructing the Axum router and applying middleware.
//! 4. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use celine_api::{
    archive::SessionArchive, config::Config, router::create_router, speech::SpeechProxy,
    state::AppState,
};
use celine_core::{
    gateway::OllamaGateway, orchestrator::SessionOrchestrator, prompts::PromptSet,
    questions::QuestionCursor,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize Shared Services ---
    let prompts = match &config.prompts_path {
        Some(path) => PromptSet::from_dir(path)
            .with_context(|| format!("Failed to load prompts from {}", path.display()))?,
        None => PromptSet::default(),
    };

    let gateway = Arc::new(OllamaGateway::new(
        config.ollama_url.clone(),
        config.generation_model.clone(),
        config.gateway_timeout,
    ));
    info!(
        model = %config.generation_model,
        url = %config.ollama_url,
        "Generation gateway ready."
    );

    let archive = Arc::new(SessionArchive::new(config.sessions_dir.clone()));
    let orchestrator = Arc::new(SessionOrchestrator::new(
        QuestionCursor::ciwa(),
        gateway,
        archive,
        prompts,
    ));
    let speech = Arc::new(SpeechProxy::new(
        config.tts_url.clone(),
        config.stt_url.clone(),
    ));

    let bind_address = config.bind_address;
    let app_state = Arc::new(AppState {
        orchestrator,
        speech,
        config: Arc::new(config),
    });

    // --- 4. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 5. Start Server ---
    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind to {bind_address}"))?;
    info!("Server listening on {bind_address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
