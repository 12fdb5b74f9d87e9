//! Tutor Service
//!
//! Turns a typed request into a prompt, runs it through the configured
//! [`TextGenerator`] and hands back a cleaned [`AIResponse`].

use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::{
    error::TutorError,
    llm_client::TextGenerator,
    messages::{AIResponse, RequestKind, TutorRequest},
    prompts::{PromptLibrary, PromptTask},
};

/// Answers tutoring requests using a language model.
#[derive(Clone)]
pub struct TutorService {
    generator: Arc<dyn TextGenerator>,
    prompts: Arc<PromptLibrary>,
}

impl TutorService {
    pub fn new(generator: Arc<dyn TextGenerator>, prompts: PromptLibrary) -> Self {
        Self {
            generator,
            prompts: Arc::new(prompts),
        }
    }

    /// Answers a direct request.
    ///
    /// The subject is trimmed and must be non-empty; the model is called once
    /// and its output must be non-empty after cleanup.
    #[instrument(skip_all, fields(kind = %request.kind()))]
    pub async fn answer(&self, request: &TutorRequest) -> Result<AIResponse, TutorError> {
        let kind = request.kind();
        let subject = request.subject().trim();
        if subject.is_empty() {
            return Err(TutorError::EmptySubject {
                field: request.subject_field(),
            });
        }

        info!(subject = %subject, "Generating tutoring content");
        let prompt = self.prompts.render(PromptTask::from(kind), subject)?;
        let raw = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|source| TutorError::Generation { kind, source })?;

        let response = strip_code_fence(&raw).to_string();
        if response.is_empty() {
            return Err(TutorError::EmptyResponse { kind });
        }

        if kind.expects_json() {
            if let Err(e) = serde_json::from_str::<serde_json::Value>(&response) {
                warn!(error = %e, "Model output for a JSON request is not valid JSON");
            }
        }

        Ok(AIResponse { response })
    }

    pub async fn curriculum(&self, topic: &str) -> Result<AIResponse, TutorError> {
        self.answer(&TutorRequest::new(RequestKind::Curriculum, topic)).await
    }

    pub async fn socratic(&self, concept: &str) -> Result<AIResponse, TutorError> {
        self.answer(&TutorRequest::new(RequestKind::Socratic, concept)).await
    }

    pub async fn quiz(&self, topic: &str) -> Result<AIResponse, TutorError> {
        self.answer(&TutorRequest::new(RequestKind::Quiz, topic)).await
    }

    pub async fn project(&self, topic: &str) -> Result<AIResponse, TutorError> {
        self.answer(&TutorRequest::new(RequestKind::Project, topic)).await
    }

    /// Free-form tutoring for chat text that is not a command.
    pub async fn general(&self, message: &str) -> anyhow::Result<String> {
        let prompt = self.prompts.render(PromptTask::General, message)?;
        let raw = self.generator.generate(&prompt).await?;
        let text = raw.trim();
        anyhow::ensure!(!text.is_empty(), "the model returned an empty response");
        Ok(text.to_string())
    }
}

/// Removes one surrounding Markdown code fence (```` ```lang ... ``` ````), if present.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // The opening fence line may carry a language tag.
    if let Some(idx) = body.find('\n') {
        return body[idx + 1..].trim();
    }
    let body = body.trim();
    match body.split_once(char::is_whitespace) {
        Some((tag, rest)) if is_language_tag(tag) => rest.trim(),
        _ => body,
    }
}

fn is_language_tag(word: &str) -> bool {
    !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '#' | '.'))
        && word.starts_with(|c: char| c.is_ascii_alphabetic())
}
