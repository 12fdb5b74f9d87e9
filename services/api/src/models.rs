//! API Models
//!
//! Wire types of the agent runtime: the addressed `Envelope` every message
//! travels in, plus the small JSON bodies returned by the HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tutor_core::Model;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::identity::AgentIdentity;

pub const ENVELOPE_VERSION: u32 = 1;

/// One typed message addressed from one agent to another.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct Envelope {
    #[schema(example = 1)]
    pub version: u32,
    #[schema(example = "agent1qclient")]
    pub sender: String,
    pub target: String,
    #[schema(value_type = String, format = Uuid)]
    pub session: Uuid,
    /// Name of the payload model, e.g. `QuizRequest` or `ChatMessage`.
    #[schema(example = "QuizRequest")]
    pub schema: String,
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl Envelope {
    pub fn new<M: Model>(
        sender: &str,
        target: &str,
        session: Uuid,
        message: &M,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            version: ENVELOPE_VERSION,
            sender: sender.to_string(),
            target: target.to_string(),
            session,
            schema: M::SCHEMA.to_string(),
            payload: serde_json::to_value(message)?,
            timestamp: Utc::now(),
        })
    }

    /// Builds the reply to this envelope: same session, addresses swapped.
    pub fn reply<M: Model>(&self, message: &M) -> Result<Self, serde_json::Error> {
        Self::new(&self.target, &self.sender, self.session, message)
    }

    /// Decodes the payload as `M`, checking that the schema matches.
    pub fn decode<M: Model>(&self) -> Option<Result<M, serde_json::Error>> {
        (self.schema == M::SCHEMA).then(|| serde_json::from_value(self.payload.clone()))
    }
}

/// Returned by `POST /submit` once the envelope has been handled.
#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct SubmitAccepted {
    #[schema(value_type = String, format = Uuid)]
    pub session: Uuid,
    /// Number of envelopes delivered to the sender's mailbox.
    pub replies: usize,
}

/// Published description of the agent.
#[derive(Serialize, ToSchema, Debug)]
pub struct AgentManifest {
    #[serde(flatten)]
    pub identity: AgentIdentity,
    pub protocols: Vec<String>,
    pub schemas: Vec<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_core::{AIResponse, QuizRequest};

    #[test]
    fn test_reply_swaps_addresses_and_keeps_session() {
        let session = Uuid::new_v4();
        let request = Envelope::new(
            "agent1qclient",
            "agent1qtutor",
            session,
            &QuizRequest {
                topic: "rust".to_string(),
            },
        )
        .unwrap();

        let reply = request
            .reply(&AIResponse {
                response: "[]".to_string(),
            })
            .unwrap();

        assert_eq!(reply.sender, "agent1qtutor");
        assert_eq!(reply.target, "agent1qclient");
        assert_eq!(reply.session, session);
        assert_eq!(reply.schema, "AIResponse");
        assert_eq!(reply.version, ENVELOPE_VERSION);
    }

    #[test]
    fn test_decode_checks_schema() {
        let envelope = Envelope::new(
            "agent1qclient",
            "agent1qtutor",
            Uuid::new_v4(),
            &AIResponse {
                response: "ok".to_string(),
            },
        )
        .unwrap();

        assert!(envelope.decode::<QuizRequest>().is_none());
        let decoded = envelope.decode::<AIResponse>().unwrap().unwrap();
        assert_eq!(decoded.response, "ok");
    }

    #[test]
    fn test_envelope_deserialization() {
        let json = r#"{
            "version": 1,
            "sender": "agent1qclient",
            "target": "agent1qtutor",
            "session": "550e8400-e29b-41d4-a716-446655440000",
            "schema": "CurriculumRequest",
            "payload": {"topic": "chemistry"},
            "timestamp": "2024-01-15T10:30:00Z"
        }"#;
        let envelope: Envelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.schema, "CurriculumRequest");
        assert_eq!(envelope.payload["topic"], "chemistry");
    }

    #[test]
    fn test_manifest_flattens_identity() {
        let manifest = AgentManifest {
            identity: AgentIdentity {
                name: "Tutor Agent".to_string(),
                address: "agent1qabc".to_string(),
            },
            protocols: vec!["tutor".to_string()],
            schemas: vec![],
        };
        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["name"], "Tutor Agent");
        assert_eq!(json["address"], "agent1qabc");
    }

    #[test]
    fn test_error_response_serialization() {
        let json = serde_json::to_string(&ErrorResponse {
            message: "route not found".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"message":"route not found"}"#);
    }
}
