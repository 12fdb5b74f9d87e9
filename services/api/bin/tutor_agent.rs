//! Main Entrypoint for the Tutor Agent
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Deriving the agent identity and loading prompt templates.
//! 3. Initializing the Gemini client and the tutor service.
//! 4. Constructing the Axum router and applying middleware.
//! 5. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tutor_api::{build_state, config::Config, identity::AgentIdentity, router::create_router};
use tutor_core::{TutorService, llm_client::OpenAICompatibleGenerator, prompts::PromptLibrary};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
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
    info!("Configuration loaded. Initializing agent...");

    // --- 3. Identity and Prompts ---
    let identity = AgentIdentity::from_seed(config.agent_name.clone(), &config.agent_seed);

    let prompts = match &config.prompts_path {
        Some(path) => PromptLibrary::builtin().with_overrides_from(path)?,
        None => PromptLibrary::builtin(),
    };

    // --- 4. Initialize Shared Services ---
    let generator = Arc::new(OpenAICompatibleGenerator::gemini(
        &config.google_api_key,
        &config.gemini_api_base,
        config.gemini_model.clone(),
        config.generation_timeout,
    ));
    let tutor = TutorService::new(generator, prompts);
    let app_state = build_state(identity.clone(), tutor, config.state_limits());

    // --- 5. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // --- 6. Start Server ---
    info!(
        name = %identity.name,
        address = %identity.address,
        model = %config.gemini_model,
        bind_address = %config.bind_address,
        "🎓 Tutor agent configured. Mailbox available for chat interactions. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
