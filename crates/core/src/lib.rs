//! Core logic of the tutor agent: message models, prompt templates, the
//! language model seam and the service that answers tutoring requests.

pub mod chat;
pub mod error;
pub mod llm_client;
pub mod messages;
pub mod prompts;
pub mod tutor;

pub use error::TutorError;
pub use messages::{
    AIResponse, CurriculumRequest, Model, ProjectRequest, QuizRequest, RequestKind,
    SocraticRequest, TutorRequest,
};
pub use tutor::TutorService;
