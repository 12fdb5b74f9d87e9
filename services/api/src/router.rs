//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the agent, including
//! the transport endpoints, the direct tutoring endpoints and the OpenAPI
//! documentation.

use crate::{
    handlers,
    identity::AgentIdentity,
    models::{AgentManifest, Envelope, ErrorResponse, SubmitAccepted},
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tutor_core::{AIResponse, CurriculumRequest, ProjectRequest, QuizRequest, SocraticRequest};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::agent_manifest,
        handlers::submit,
        handlers::drain_mailbox,
        handlers::curriculum,
        handlers::socratic,
        handlers::quiz,
        handlers::project,
    ),
    components(
        schemas(
            AgentManifest, AgentIdentity, Envelope, SubmitAccepted, ErrorResponse,
            CurriculumRequest, SocraticRequest, QuizRequest, ProjectRequest, AIResponse
        )
    ),
    tags(
        (name = "Tutor Agent", description = "Curriculum, Socratic questions, quizzes and projects from a language model")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/agent", get(handlers::agent_manifest))
        .route("/submit", post(handlers::submit))
        .route("/mailbox/{address}", get(handlers::drain_mailbox))
        .route("/curriculum", post(handlers::curriculum))
        .route("/socratic", post(handlers::socratic))
        .route("/quiz", post(handlers::quiz))
        .route("/project", post(handlers::project))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
        .fallback(handlers::not_found)
}
