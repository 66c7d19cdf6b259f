//! Alimtalk template studio.
//!
//! Organized into:
//! - `core`: Configuration, errors, IDs, conversations, templates, and themes
//! - `storage`: Key-value persistence for conversations and the theme
//! - `conversations`: The in-memory conversation store
//! - `generation`: Template service client, fallback template, and failure policy
//! - `preview`: Placeholder rendering and variable values
//! - `engine`: Orchestration of a whole studio session

pub mod conversations;
pub mod core;
pub mod engine;
pub mod generation;
pub mod preview;
pub mod storage;

pub use conversations::{ConversationStore, PendingSend};
pub use self::core::{
    Conversation, ConversationId, ConversationSummary, FailurePolicy, Message, MessageId,
    MessageRole, ServerConfig, ServiceConfig, StorageConfig, StudioConfig, StudioError,
    StudioResult, Template, TemplateButton, TemplateId, TemplateVariable, Theme,
};
pub use engine::{
    ConversationList, GENERATION_FAILED_MESSAGE, SendOutcome, Studio, TEMPLATE_READY_MESSAGE,
};
pub use generation::{
    GenerationOutcome, GenerationRequest, HttpTemplateClient, TemplateGenerator,
    TemplateService, TemplateServiceError, fallback_template,
};
pub use preview::{PlaceholderRenderer, Preview, VariableEntry, VariableValues};
pub use storage::{
    ConversationRepository, KeyValueStore, MemoryKvStore, SqliteKvStore, StoreFuture, ThemeStore,
};
