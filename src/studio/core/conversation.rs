//! Conversation and message records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::studio::core::ids::{ConversationId, MessageId};
use crate::studio::core::template::Template;
use crate::studio::core::timestamp;

/// Title given to a conversation before its first message.
pub const NEW_CONVERSATION_TITLE: &str = "새 대화";

/// Maximum number of characters kept in a title.
pub const TITLE_MAX_CHARS: usize = 30;

/// Marker appended to a title that was cut.
pub const TITLE_ELLIPSIS: &str = "...";

/// Cut `raw` to [`TITLE_MAX_CHARS`] characters, appending [`TITLE_ELLIPSIS`] if anything was dropped.
///
/// Counts Unicode scalar values, so Hangul titles are cut on character boundaries.
#[must_use]
pub fn truncate_title(raw: &str) -> String {
    let mut chars = raw.chars();
    let head: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}{TITLE_ELLIPSIS}")
    } else {
        head
    }
}

/// Author of a chat message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// Typed by the user.
    User,
    /// Produced by the studio in reply.
    Assistant,
}

/// A single chat message. Never edited after creation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier.
    pub id: MessageId,
    /// Author.
    #[serde(rename = "type")]
    pub role: MessageRole,
    /// Text content.
    pub content: String,
    /// Creation time.
    #[serde(
        default = "timestamp::now",
        serialize_with = "timestamp::serialize",
        deserialize_with = "timestamp::deserialize_lenient"
    )]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Build a user message stamped now.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::User, content)
    }

    /// Build an assistant message stamped now.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::Assistant, content)
    }

    fn with_role(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
            timestamp: timestamp::now(),
        }
    }
}

/// A chat thread plus at most one generated template.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Conversation identifier.
    pub id: ConversationId,
    /// Display title, at most [`TITLE_MAX_CHARS`] characters plus the ellipsis.
    #[serde(default = "default_title")]
    pub title: String,
    /// Messages in the order they were appended.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Template attached by the last successful generation.
    #[serde(default)]
    pub template: Option<Template>,
    /// Creation time.
    #[serde(
        default = "timestamp::now",
        serialize_with = "timestamp::serialize",
        deserialize_with = "timestamp::deserialize_lenient"
    )]
    pub created_at: DateTime<Utc>,
}

fn default_title() -> String {
    NEW_CONVERSATION_TITLE.to_string()
}

impl Conversation {
    /// Create an empty conversation with the placeholder title.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: ConversationId::new(),
            title: default_title(),
            messages: Vec::new(),
            template: None,
            created_at: timestamp::now(),
        }
    }

    /// Newline-joined content of every message so far, or `sentinel` when there are none.
    #[must_use]
    pub fn context(&self, sentinel: &str) -> String {
        if self.messages.is_empty() {
            return sentinel.to_string();
        }
        self.messages
            .iter()
            .map(|message| message.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Sidebar view of this conversation.
    #[must_use]
    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            id: self.id,
            title: self.title.clone(),
            message_count: self.messages.len(),
            has_template: self.template.is_some(),
            created_at: self.created_at,
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Lightweight conversation metadata for list views.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    /// Conversation identifier.
    pub id: ConversationId,
    /// Display title.
    pub title: String,
    /// Number of messages.
    pub message_count: usize,
    /// Whether a template is attached.
    pub has_template: bool,
    /// Creation time.
    #[serde(serialize_with = "timestamp::serialize")]
    pub created_at: DateTime<Utc>,
}
