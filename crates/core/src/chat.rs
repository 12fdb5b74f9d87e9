//! Chat Protocol
//!
//! Session-oriented text chat on top of the direct requests. A chat message
//! carries a list of content items; text items may hold slash commands that
//! map onto the tutoring generators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::messages::{Model, RequestKind};

/// Name of the chat protocol advertised in the agent manifest.
pub const CHAT_PROTOCOL: &str = "AgentChatProtocol";

pub const WELCOME_TEXT: &str = "🎓 Welcome to your AI Tutor! Type /help to see available commands or just start asking questions!";

pub const FAREWELL_TEXT: &str = "👋 Thanks for learning with me today! Feel free to start a new session anytime you need help.";

pub const FALLBACK_TEXT: &str = "I'm having trouble processing that right now. Try using one of the specific commands like /help to see what I can do!";

pub const HELP_TEXT: &str = "\
🎓 Welcome to your AI Tutor! Here are the available commands:

📚 /curriculum [topic] - Get a 4-week learning curriculum
❓ /socratic [concept] - Get Socratic questioning for deeper understanding
📝 /quiz [topic] - Generate practice quiz questions
🛠️ /project [topic] - Get project suggestions and guidance
❓ /help - Show this help message

You can also just chat naturally and I'll do my best to help with your learning!

Example: \"/curriculum machine learning\" or \"/quiz python basics\"";

/// One item of chat content.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "start-session")]
    StartSession,
    #[serde(rename = "end-session")]
    EndSession,
    /// Any content type this agent does not understand.
    #[serde(other)]
    Unknown,
}

impl ChatContent {
    pub fn text(text: impl Into<String>) -> Self {
        ChatContent::Text { text: text.into() }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub timestamp: DateTime<Utc>,
    pub msg_id: Uuid,
    pub content: Vec<ChatContent>,
}

impl ChatMessage {
    /// Builds a fresh text message, optionally closing the session.
    pub fn text(text: impl Into<String>, end_session: bool) -> Self {
        let mut content = vec![ChatContent::text(text)];
        if end_session {
            content.push(ChatContent::EndSession);
        }
        Self {
            timestamp: Utc::now(),
            msg_id: Uuid::new_v4(),
            content,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatAcknowledgement {
    pub timestamp: DateTime<Utc>,
    pub acknowledged_msg_id: Uuid,
}

impl ChatAcknowledgement {
    pub fn for_message(msg: &ChatMessage) -> Self {
        Self {
            timestamp: Utc::now(),
            acknowledged_msg_id: msg.msg_id,
        }
    }
}

impl Model for ChatMessage {
    const SCHEMA: &'static str = "ChatMessage";
}

impl Model for ChatAcknowledgement {
    const SCHEMA: &'static str = "ChatAcknowledgement";
}

/// What a chat text asks the tutor to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// A slash command for one of the generators, with its non-empty subject.
    Generate { kind: RequestKind, subject: String },
    Help,
    /// Anything else; holds the text as the student typed it.
    General(String),
}

impl ChatCommand {
    /// Parses a chat text.
    ///
    /// Commands are matched on the trimmed, lower-cased text and their subject
    /// is taken from that lower-cased form. A command with nothing after it
    /// falls through to a general request.
    pub fn parse(text: &str) -> Self {
        let normalized = text.trim().to_lowercase();
        let (command, rest) = normalized
            .split_once(char::is_whitespace)
            .unwrap_or((normalized.as_str(), ""));
        let subject = rest.trim();

        let kind = match command {
            "/curriculum" => Some(RequestKind::Curriculum),
            "/socratic" => Some(RequestKind::Socratic),
            "/quiz" => Some(RequestKind::Quiz),
            "/project" => Some(RequestKind::Project),
            _ => None,
        };

        match kind {
            Some(kind) if !subject.is_empty() => ChatCommand::Generate {
                kind,
                subject: subject.to_string(),
            },
            _ if normalized.starts_with("/help") => ChatCommand::Help,
            _ => ChatCommand::General(text.to_string()),
        }
    }
}
