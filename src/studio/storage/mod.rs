//! Persistent storage for conversations and UI preferences.

pub mod conversation_repository;
pub mod kv_store;
pub mod theme_store;

pub use conversation_repository::ConversationRepository;
pub use kv_store::{KeyValueStore, MemoryKvStore, SqliteKvStore, StoreFuture};
pub use theme_store::ThemeStore;
