//! Typed messages accepted and produced by the tutor.
//!
//! Each request carries exactly one string subject and every reply travels
//! back as an [`AIResponse`]. The [`Model`] trait ties a message type to the
//! schema name used when it is wrapped in an envelope.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt;
use utoipa::ToSchema;

/// A message type that can be carried inside an envelope.
pub trait Model: Serialize + DeserializeOwned {
    /// Name written to the envelope `schema` field.
    const SCHEMA: &'static str;
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct CurriculumRequest {
    #[schema(example = "machine learning")]
    pub topic: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct SocraticRequest {
    #[schema(example = "recursion")]
    pub concept: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct QuizRequest {
    #[schema(example = "python basics")]
    pub topic: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct ProjectRequest {
    #[schema(example = "web scraping")]
    pub topic: String,
}

/// Uniform reply for every direct request.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct AIResponse {
    pub response: String,
}

impl Model for CurriculumRequest {
    const SCHEMA: &'static str = "CurriculumRequest";
}

impl Model for SocraticRequest {
    const SCHEMA: &'static str = "SocraticRequest";
}

impl Model for QuizRequest {
    const SCHEMA: &'static str = "QuizRequest";
}

impl Model for ProjectRequest {
    const SCHEMA: &'static str = "ProjectRequest";
}

impl Model for AIResponse {
    const SCHEMA: &'static str = "AIResponse";
}

/// The four kinds of tutoring work the agent performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Curriculum,
    Socratic,
    Quiz,
    Project,
}

impl RequestKind {
    /// Whether the generated output is expected to be a JSON document.
    pub fn expects_json(self) -> bool {
        matches!(self, RequestKind::Socratic | RequestKind::Quiz)
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Curriculum => write!(f, "curriculum"),
            RequestKind::Socratic => write!(f, "Socratic questions"),
            RequestKind::Quiz => write!(f, "quiz"),
            RequestKind::Project => write!(f, "project"),
        }
    }
}

/// Any one of the direct requests, decoded and ready to be answered.
#[derive(Debug, Clone, PartialEq)]
pub enum TutorRequest {
    Curriculum(CurriculumRequest),
    Socratic(SocraticRequest),
    Quiz(QuizRequest),
    Project(ProjectRequest),
}

impl TutorRequest {
    pub fn new(kind: RequestKind, subject: impl Into<String>) -> Self {
        let subject = subject.into();
        match kind {
            RequestKind::Curriculum => Self::Curriculum(CurriculumRequest { topic: subject }),
            RequestKind::Socratic => Self::Socratic(SocraticRequest { concept: subject }),
            RequestKind::Quiz => Self::Quiz(QuizRequest { topic: subject }),
            RequestKind::Project => Self::Project(ProjectRequest { topic: subject }),
        }
    }

    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Curriculum(_) => RequestKind::Curriculum,
            Self::Socratic(_) => RequestKind::Socratic,
            Self::Quiz(_) => RequestKind::Quiz,
            Self::Project(_) => RequestKind::Project,
        }
    }

    /// The topic or concept the request is about.
    pub fn subject(&self) -> &str {
        match self {
            Self::Curriculum(req) => &req.topic,
            Self::Socratic(req) => &req.concept,
            Self::Quiz(req) => &req.topic,
            Self::Project(req) => &req.topic,
        }
    }

    /// Name of the field holding the subject, used in validation messages.
    pub fn subject_field(&self) -> &'static str {
        match self {
            Self::Socratic(_) => "concept",
            _ => "topic",
        }
    }

    /// Decodes a request from an envelope payload.
    ///
    /// Returns `Ok(None)` when `schema` is not one of the direct request schemas.
    pub fn from_schema(
        schema: &str,
        payload: serde_json::Value,
    ) -> Result<Option<Self>, serde_json::Error> {
        let request = match schema {
            CurriculumRequest::SCHEMA => Self::Curriculum(serde_json::from_value(payload)?),
            SocraticRequest::SCHEMA => Self::Socratic(serde_json::from_value(payload)?),
            QuizRequest::SCHEMA => Self::Quiz(serde_json::from_value(payload)?),
            ProjectRequest::SCHEMA => Self::Project(serde_json::from_value(payload)?),
            _ => return Ok(None),
        };
        Ok(Some(request))
    }
}
