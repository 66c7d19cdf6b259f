//! Core studio types and identifiers.

pub mod config;
pub mod conversation;
pub mod errors;
pub mod ids;
pub mod template;
pub mod theme;
pub mod timestamp;

pub use config::{FailurePolicy, ServerConfig, ServiceConfig, StorageConfig, StudioConfig};
pub use conversation::{
    Conversation, ConversationSummary, Message, MessageRole, NEW_CONVERSATION_TITLE,
    TITLE_ELLIPSIS, TITLE_MAX_CHARS, truncate_title,
};
pub use errors::{StudioError, StudioResult};
pub use ids::{ConversationId, IdClock, MessageId, TemplateId};
pub use template::{Classification, Template, TemplateButton, TemplateVariable};
pub use theme::Theme;
