//! Conversation persistence on top of the key-value store.
//!
//! The whole collection lives under one key as a JSON array, most recent
//! first. Neither `load` nor `save` ever returns an error: failures are
//! logged and degrade to "empty" or "write skipped".

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::studio::core::config::StorageConfig;
use crate::studio::core::conversation::Conversation;
use crate::studio::storage::kv_store::KeyValueStore;

/// Reads and writes the persisted conversation list.
#[derive(Clone)]
pub struct ConversationRepository {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    max_conversations: usize,
}

impl ConversationRepository {
    /// Create a repository over `kv` using the keys and limits in `config`.
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>, config: &StorageConfig) -> Self {
        Self {
            kv,
            key: config.conversations_key.clone(),
            max_conversations: config.max_conversations,
        }
    }

    /// Load the persisted conversations.
    ///
    /// Returns an empty list if nothing is stored or the stored value is not a
    /// JSON array. Individual entries that cannot be decoded are skipped.
    /// Missing or malformed timestamps are revived as "now".
    pub async fn load(&self) -> Vec<Conversation> {
        let raw = match self.kv.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                error!("Failed to read conversation history: {err}");
                return Vec::new();
            }
        };

        let entries: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                error!("Failed to parse conversation history: {err}");
                return Vec::new();
            }
        };

        let total = entries.len();
        let conversations: Vec<Conversation> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(conversation) => Some(conversation),
                Err(err) => {
                    warn!("Skipping unreadable conversation at index {index}: {err}");
                    None
                }
            })
            .collect();

        debug!(
            "Loaded {} of {} stored conversations",
            conversations.len(),
            total
        );
        conversations
    }

    /// Persist the first `max_conversations` entries of `conversations`.
    ///
    /// Write failures (serialization, storage full, I/O) are logged and swallowed.
    pub async fn save(&self, conversations: &[Conversation]) {
        let limited = &conversations[..conversations.len().min(self.max_conversations)];

        let payload = match serde_json::to_string(limited) {
            Ok(payload) => payload,
            Err(err) => {
                error!("Failed to serialize conversation history: {err}");
                return;
            }
        };

        if let Err(err) = self.kv.set(&self.key, payload).await {
            error!("Failed to save conversation history: {err}");
            return;
        }

        debug!("Saved {} conversations", limited.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::studio::core::conversation::{Message, NEW_CONVERSATION_TITLE};
    use crate::studio::core::errors::{StudioError, StudioResult};
    use crate::studio::core::timestamp;
    use crate::studio::storage::kv_store::{MemoryKvStore, StoreFuture};
    use serde_json::json;

    struct FailingKvStore;

    impl KeyValueStore for FailingKvStore {
        fn get<'a>(&'a self, _key: &'a str) -> StoreFuture<'a, StudioResult<Option<String>>> {
            Box::pin(async { Err(StudioError::Io(std::io::Error::other("disk unavailable"))) })
        }

        fn set<'a>(&'a self, _key: &'a str, _value: String) -> StoreFuture<'a, StudioResult<()>> {
            Box::pin(async { Err(StudioError::Io(std::io::Error::other("quota exceeded"))) })
        }
    }

    fn repository() -> (Arc<MemoryKvStore>, ConversationRepository) {
        let kv = Arc::new(MemoryKvStore::new());
        let repo = ConversationRepository::new(kv.clone(), &StorageConfig::default());
        (kv, repo)
    }

    #[tokio::test]
    async fn test_load_empty_store() {
        let (_, repo) = repository();
        assert!(repo.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_round_trip_keeps_timestamps() {
        let (_, repo) = repository();
        let mut conversation = Conversation::new();
        conversation.messages.push(Message::user("카페 주문 완료 알림 만들어줘"));
        conversation.messages.push(Message::assistant("done"));

        repo.save(std::slice::from_ref(&conversation)).await;
        let loaded = repo.load().await;

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0], conversation);
        assert_eq!(loaded[0].created_at, conversation.created_at);
        assert_eq!(
            loaded[0].messages[1].timestamp,
            conversation.messages[1].timestamp
        );
    }

    #[tokio::test]
    async fn test_save_truncates_to_limit() {
        let (_, repo) = repository();
        let conversations: Vec<Conversation> = (0..15).map(|_| Conversation::new()).collect();

        repo.save(&conversations).await;
        let loaded = repo.load().await;

        assert_eq!(loaded.len(), 10);
        assert_eq!(loaded[0].id, conversations[0].id);
        assert_eq!(loaded[9].id, conversations[9].id);
    }

    #[tokio::test]
    async fn test_load_garbage_returns_empty() {
        let (kv, repo) = repository();
        kv.set("alimtalk_conversations", "{not json".to_string())
            .await
            .unwrap();
        assert!(repo.load().await.is_empty());

        kv.set("alimtalk_conversations", "{\"id\": 1}".to_string())
            .await
            .unwrap();
        assert!(repo.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_revives_missing_and_bad_timestamps() {
        let (kv, repo) = repository();
        let before = timestamp::now();
        let stored = json!([
            {
                "id": 1,
                "title": "old",
                "messages": [
                    { "id": 2, "type": "user", "content": "hello" },
                    { "id": 3, "type": "assistant", "content": "hi", "timestamp": "garbage" }
                ],
                "template": null
            },
            {
                "id": 4,
                "createdAt": "2024-05-01T09:30:00.123Z"
            }
        ]);
        kv.set("alimtalk_conversations", stored.to_string())
            .await
            .unwrap();

        let loaded = repo.load().await;
        assert_eq!(loaded.len(), 2);
        assert!(loaded[0].created_at >= before);
        assert!(loaded[0].messages[0].timestamp >= before);
        assert!(loaded[0].messages[1].timestamp >= before);
        assert_eq!(loaded[1].title, NEW_CONVERSATION_TITLE);
        assert_eq!(
            timestamp::format(&loaded[1].created_at),
            "2024-05-01T09:30:00.123Z"
        );
    }

    #[tokio::test]
    async fn test_load_skips_unreadable_entries() {
        let (kv, repo) = repository();
        let stored = json!([{ "title": "no id" }, { "id": 9, "title": "ok" }]);
        kv.set("alimtalk_conversations", stored.to_string())
            .await
            .unwrap();

        let loaded = repo.load().await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "ok");
    }

    #[tokio::test]
    async fn test_storage_failures_are_swallowed() {
        let repo = ConversationRepository::new(Arc::new(FailingKvStore), &StorageConfig::default());
        repo.save(&[Conversation::new()]).await;
        assert!(repo.load().await.is_empty());
    }
}
