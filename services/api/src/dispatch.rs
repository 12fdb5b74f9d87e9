//! Request Dispatcher
//!
//! Routes an inbound envelope to the handler for its schema and delivers
//! every reply to the sender's mailbox. Direct requests get exactly one
//! `AIResponse`; chat messages get an acknowledgement followed by one reply
//! per actionable content item.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use tutor_core::{
    AIResponse, Model, RequestKind, TutorError, TutorRequest, TutorService,
    chat::{
        ChatAcknowledgement, ChatCommand, ChatContent, ChatMessage, FALLBACK_TEXT, FAREWELL_TEXT,
        HELP_TEXT, WELCOME_TEXT,
    },
};
use uuid::Uuid;

use crate::{
    identity::AgentIdentity,
    mailbox::Mailbox,
    models::{ENVELOPE_VERSION, Envelope},
};

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Unsupported envelope version {0}")]
    UnsupportedVersion(u32),
    #[error("Envelope target '{0}' does not match this agent")]
    WrongTarget(String),
    #[error("Invalid sender address '{0}'")]
    InvalidSender(String),
    #[error("Unsupported message schema '{0}'")]
    UnsupportedSchema(String),
    #[error("Malformed {schema} payload: {source}")]
    MalformedPayload {
        schema: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to encode reply: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Schemas this agent accepts in inbound envelopes.
pub const ACCEPTED_SCHEMAS: [&str; 6] = [
    tutor_core::CurriculumRequest::SCHEMA,
    tutor_core::SocraticRequest::SCHEMA,
    tutor_core::QuizRequest::SCHEMA,
    tutor_core::ProjectRequest::SCHEMA,
    ChatMessage::SCHEMA,
    ChatAcknowledgement::SCHEMA,
];

/// Chat sessions that sent a start-session and have not ended yet.
///
/// Holds at most `limit` sessions; opening one more forgets the session that
/// was opened first.
struct OpenSessions {
    limit: usize,
    open: HashSet<Uuid>,
    order: VecDeque<Uuid>,
}

impl OpenSessions {
    fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            open: HashSet::new(),
            order: VecDeque::new(),
        }
    }

    fn open(&mut self, session: Uuid) {
        if !self.open.insert(session) {
            return;
        }
        self.order.push_back(session);
        while self.order.len() > self.limit {
            if let Some(oldest) = self.order.pop_front() {
                self.open.remove(&oldest);
                debug!(session = %oldest, "Open session limit reached, forgetting oldest session");
            }
        }
    }

    fn close(&mut self, session: Uuid) {
        if self.open.remove(&session) {
            self.order.retain(|s| *s != session);
        }
    }

    fn contains(&self, session: Uuid) -> bool {
        self.open.contains(&session)
    }

    fn len(&self) -> usize {
        self.open.len()
    }
}

pub struct Dispatcher {
    identity: AgentIdentity,
    tutor: TutorService,
    mailbox: Arc<Mailbox>,
    open_sessions: Mutex<OpenSessions>,
}

impl Dispatcher {
    pub fn new(
        identity: AgentIdentity,
        tutor: TutorService,
        mailbox: Arc<Mailbox>,
        max_open_sessions: usize,
    ) -> Self {
        Self {
            identity,
            tutor,
            mailbox,
            open_sessions: Mutex::new(OpenSessions::new(max_open_sessions)),
        }
    }

    pub fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    pub fn tutor(&self) -> &TutorService {
        &self.tutor
    }

    pub async fn is_session_open(&self, session: Uuid) -> bool {
        self.open_sessions.lock().await.contains(session)
    }

    pub async fn open_session_count(&self) -> usize {
        self.open_sessions.lock().await.len()
    }

    /// Handles one inbound envelope and returns how many replies were delivered.
    #[instrument(skip_all, fields(sender = %envelope.sender, schema = %envelope.schema, session = %envelope.session))]
    pub async fn dispatch(&self, envelope: Envelope) -> Result<usize, DispatchError> {
        if envelope.version != ENVELOPE_VERSION {
            return Err(DispatchError::UnsupportedVersion(envelope.version));
        }
        if envelope.target != self.identity.address {
            return Err(DispatchError::WrongTarget(envelope.target));
        }
        if !AgentIdentity::is_address(&envelope.sender) {
            return Err(DispatchError::InvalidSender(envelope.sender));
        }

        let malformed = |source| DispatchError::MalformedPayload {
            schema: envelope.schema.clone(),
            source,
        };

        let direct = TutorRequest::from_schema(&envelope.schema, envelope.payload.clone())
            .map_err(malformed)?;
        if let Some(request) = direct {
            let reply = self.answer_direct(&request).await;
            self.mailbox.deliver(envelope.reply(&reply)?).await;
            return Ok(1);
        }

        if let Some(decoded) = envelope.decode::<ChatMessage>() {
            let msg = decoded.map_err(malformed)?;
            return self.handle_chat(&envelope, msg).await;
        }

        if let Some(decoded) = envelope.decode::<ChatAcknowledgement>() {
            let ack = decoded.map_err(malformed)?;
            info!(acknowledged = %ack.acknowledged_msg_id, "✅ Received acknowledgement");
            return Ok(0);
        }

        Err(DispatchError::UnsupportedSchema(envelope.schema))
    }

    /// Answers a direct request; failures become the reply text.
    async fn answer_direct(&self, request: &TutorRequest) -> AIResponse {
        match self.tutor.answer(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Direct request failed");
                AIResponse {
                    response: failure_text(request.kind(), &e),
                }
            }
        }
    }

    async fn handle_chat(
        &self,
        envelope: &Envelope,
        msg: ChatMessage,
    ) -> Result<usize, DispatchError> {
        info!("📨 Received chat message");
        let mut delivered = 0;

        self.mailbox
            .deliver(envelope.reply(&ChatAcknowledgement::for_message(&msg))?)
            .await;
        delivered += 1;

        for item in msg.content {
            let reply = match item {
                ChatContent::StartSession => {
                    info!("🟢 Session started");
                    self.open_sessions.lock().await.open(envelope.session);
                    ChatMessage::text(WELCOME_TEXT, false)
                }
                ChatContent::Text { text } => {
                    info!(text = %text, "💬 Text message");
                    ChatMessage::text(self.respond_to_text(&text).await, false)
                }
                ChatContent::EndSession => {
                    info!("🔴 Session ended");
                    self.open_sessions.lock().await.close(envelope.session);
                    ChatMessage::text(FAREWELL_TEXT, true)
                }
                ChatContent::Unknown => {
                    info!("❓ Received unexpected content type");
                    continue;
                }
            };

            self.mailbox.deliver(envelope.reply(&reply)?).await;
            delivered += 1;
        }

        Ok(delivered)
    }

    async fn respond_to_text(&self, text: &str) -> String {
        match ChatCommand::parse(text) {
            ChatCommand::Generate { kind, subject } => {
                let request = TutorRequest::new(kind, subject);
                self.answer_direct(&request).await.response
            }
            ChatCommand::Help => HELP_TEXT.to_string(),
            ChatCommand::General(message) => match self.tutor.general(&message).await {
                Ok(answer) => answer,
                Err(e) => {
                    warn!(error = %e, "General tutoring request failed");
                    FALLBACK_TEXT.to_string()
                }
            },
        }
    }
}

/// Reply text for a request that could not be answered.
fn failure_text(kind: RequestKind, error: &TutorError) -> String {
    match error {
        TutorError::Generation { .. } | TutorError::EmptyResponse { .. } => error.to_string(),
        other => format!("Error generating {kind}: {other}"),
    }
}
