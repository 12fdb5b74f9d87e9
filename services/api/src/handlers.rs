//! Axum Handlers for the REST API
//!
//! This module contains the logic for handling HTTP requests: the envelope
//! submission and mailbox endpoints used by other agents, and synchronous
//! shortcuts for each tutoring request. It uses `utoipa` doc comments to
//! generate OpenAPI documentation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tutor_core::{
    AIResponse, CurriculumRequest, ProjectRequest, QuizRequest, SocraticRequest, TutorError,
    TutorRequest, chat::CHAT_PROTOCOL,
};

use crate::{
    dispatch::{ACCEPTED_SCHEMAS, DispatchError},
    identity::AgentIdentity,
    models::{AgentManifest, Envelope, ErrorResponse, SubmitAccepted},
    state::AppState,
};

/// Name of the protocol covering the four direct request models.
pub const TUTOR_PROTOCOL: &str = "TutorProtocol";

pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    BadGateway(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse { message })).into_response()
            }
            ApiError::BadGateway(message) => {
                (StatusCode::BAD_GATEWAY, Json(ErrorResponse { message })).into_response()
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let message = "An internal server error occurred.".to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

impl From<TutorError> for ApiError {
    fn from(err: TutorError) -> Self {
        match err {
            TutorError::MissingPrompt(_) => Self::InternalServerError(err.into()),
            _ if err.is_client_error() => Self::BadRequest(err.to_string()),
            _ => {
                warn!(error = %err, "Generation failed");
                Self::BadGateway(err.to_string())
            }
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Encode(_) => Self::InternalServerError(err.into()),
            _ => Self::BadRequest(err.to_string()),
        }
    }
}

async fn answer(state: &AppState, request: TutorRequest) -> Result<Json<AIResponse>, ApiError> {
    let response = state.tutor().answer(&request).await?;
    Ok(Json(response))
}

/// Describe this agent: its address and the message schemas it accepts.
#[utoipa::path(
    get,
    path = "/agent",
    responses(
        (status = 200, description = "Agent manifest", body = AgentManifest)
    )
)]
pub async fn agent_manifest(State(state): State<Arc<AppState>>) -> Json<AgentManifest> {
    Json(AgentManifest {
        identity: state.dispatcher.identity().clone(),
        protocols: vec![TUTOR_PROTOCOL.to_string(), CHAT_PROTOCOL.to_string()],
        schemas: ACCEPTED_SCHEMAS.iter().map(|s| s.to_string()).collect(),
    })
}

/// Submit an envelope addressed to this agent. Replies are delivered to the sender's mailbox.
#[utoipa::path(
    post,
    path = "/submit",
    request_body = Envelope,
    responses(
        (status = 202, description = "Envelope handled, replies queued", body = SubmitAccepted),
        (status = 400, description = "Envelope rejected", body = ErrorResponse)
    )
)]
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(envelope): Json<Envelope>,
) -> Result<impl IntoResponse, ApiError> {
    let session = envelope.session;
    let replies = state.dispatcher.dispatch(envelope).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitAccepted { session, replies }),
    ))
}

/// Drain every envelope waiting for an address.
///
/// There is no authentication: any caller that knows an address can drain
/// its queue, and the drained envelopes are gone for the real recipient.
/// The mailbox is an open, in-process queue and belongs behind a trusted
/// network boundary.
#[utoipa::path(
    get,
    path = "/mailbox/{address}",
    responses(
        (status = 200, description = "Pending envelopes, oldest first", body = [Envelope]),
        (status = 400, description = "Malformed address", body = ErrorResponse)
    ),
    params(
        ("address" = String, Path, description = "Recipient agent address")
    )
)]
pub async fn drain_mailbox(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<Vec<Envelope>>, ApiError> {
    if !AgentIdentity::is_address(&address) {
        return Err(ApiError::BadRequest(format!(
            "'{}' is not an agent address",
            address
        )));
    }
    let envelopes = state.mailbox.drain(&address).await;
    if !envelopes.is_empty() {
        info!(address = %address, count = envelopes.len(), "Mailbox drained");
    }
    Ok(Json(envelopes))
}

/// Generate a four-week HTML curriculum for a topic.
#[utoipa::path(
    post,
    path = "/curriculum",
    request_body = CurriculumRequest,
    responses(
        (status = 200, description = "HTML curriculum", body = AIResponse),
        (status = 400, description = "Empty topic", body = ErrorResponse),
        (status = 502, description = "Model call failed", body = ErrorResponse)
    )
)]
pub async fn curriculum(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CurriculumRequest>,
) -> Result<Json<AIResponse>, ApiError> {
    answer(&state, TutorRequest::Curriculum(payload)).await
}

/// Generate Socratic guiding questions (JSON array) for a concept.
#[utoipa::path(
    post,
    path = "/socratic",
    request_body = SocraticRequest,
    responses(
        (status = 200, description = "JSON array of questions", body = AIResponse),
        (status = 400, description = "Empty concept", body = ErrorResponse),
        (status = 502, description = "Model call failed", body = ErrorResponse)
    )
)]
pub async fn socratic(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SocraticRequest>,
) -> Result<Json<AIResponse>, ApiError> {
    answer(&state, TutorRequest::Socratic(payload)).await
}

/// Generate a multiple-choice quiz (JSON array) for a topic.
#[utoipa::path(
    post,
    path = "/quiz",
    request_body = QuizRequest,
    responses(
        (status = 200, description = "JSON array of quiz items", body = AIResponse),
        (status = 400, description = "Empty topic", body = ErrorResponse),
        (status = 502, description = "Model call failed", body = ErrorResponse)
    )
)]
pub async fn quiz(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QuizRequest>,
) -> Result<Json<AIResponse>, ApiError> {
    answer(&state, TutorRequest::Quiz(payload)).await
}

/// Suggest a beginner project (HTML) for a topic.
#[utoipa::path(
    post,
    path = "/project",
    request_body = ProjectRequest,
    responses(
        (status = 200, description = "HTML project outline", body = AIResponse),
        (status = 400, description = "Empty topic", body = ErrorResponse),
        (status = 502, description = "Model call failed", body = ErrorResponse)
    )
)]
pub async fn project(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ProjectRequest>,
) -> Result<Json<AIResponse>, ApiError> {
    answer(&state, TutorRequest::Project(payload)).await
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("route not found".to_string())
}
