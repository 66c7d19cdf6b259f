//! Conversation management.

pub mod store;

pub use store::{ConversationStore, PendingSend};
