use thiserror::Error;

use crate::messages::RequestKind;

/// Failures surfaced by the tutor when answering a request.
#[derive(Debug, Error)]
pub enum TutorError {
    #[error("{field} must be a non-empty string")]
    EmptySubject { field: &'static str },

    #[error("Error generating {kind}: {source}")]
    Generation {
        kind: RequestKind,
        #[source]
        source: anyhow::Error,
    },

    #[error("Error generating {kind}: the model returned an empty response")]
    EmptyResponse { kind: RequestKind },

    #[error("Missing prompt template: '{0}'")]
    MissingPrompt(String),
}

impl TutorError {
    /// True when the caller sent something unusable, as opposed to an upstream failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, TutorError::EmptySubject { .. })
    }
}
