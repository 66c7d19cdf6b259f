//! In-memory conversation store.
//!
//! Conversations live in an arena keyed by id; the active conversation is an
//! id into that arena, never a copy, so the selected and stored state cannot
//! drift apart. The displayed template is derived from the active
//! conversation for the same reason. Every mutator leaves the store in a
//! state whose [`ConversationStore::snapshot`] is what gets persisted.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::studio::core::conversation::{
    Conversation, ConversationSummary, Message, truncate_title,
};
use crate::studio::core::errors::{StudioError, StudioResult};
use crate::studio::core::ids::ConversationId;
use crate::studio::core::template::Template;

/// A user message accepted by [`ConversationStore::append_user_message`] and
/// now waiting on the template service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingSend {
    /// Conversation the message was appended to.
    pub conversation_id: ConversationId,
    /// The text the user sent.
    pub request_content: String,
    /// Earlier messages joined by newlines, or the empty-context sentinel.
    pub conversation_context: String,
}

/// Owns every conversation plus the active selection.
pub struct ConversationStore {
    conversations: HashMap<ConversationId, Conversation>,
    /// Most recent first.
    order: Vec<ConversationId>,
    active: Option<ConversationId>,
    sending: HashSet<ConversationId>,
    max_conversations: usize,
}

impl ConversationStore {
    /// Create an empty store keeping at most `max_conversations` entries.
    #[must_use]
    pub fn new(max_conversations: usize) -> Self {
        Self {
            conversations: HashMap::new(),
            order: Vec::new(),
            active: None,
            sending: HashSet::new(),
            max_conversations,
        }
    }

    /// Rebuild the store from previously persisted conversations, most recent first.
    ///
    /// Duplicates and entries beyond the limit are dropped, and restored ids
    /// advance the id clock. The most recent conversation becomes active.
    #[must_use]
    pub fn restore(loaded: Vec<Conversation>, max_conversations: usize) -> Self {
        let mut store = Self::new(max_conversations);

        for conversation in loaded {
            if store.order.len() >= store.max_conversations {
                break;
            }
            if store.conversations.contains_key(&conversation.id) {
                warn!("Dropping duplicate stored conversation {}", conversation.id);
                continue;
            }
            conversation.id.observe();
            for message in &conversation.messages {
                message.id.observe();
            }
            store.order.push(conversation.id);
            store.conversations.insert(conversation.id, conversation);
        }

        store.active = store.order.first().copied();
        info!("Restored {} conversations", store.order.len());
        store
    }

    /// Create an empty conversation, put it first and make it active.
    ///
    /// Conversations beyond the retention limit are dropped, oldest first.
    pub fn create(&mut self) -> ConversationId {
        let conversation = Conversation::new();
        let id = conversation.id;

        self.order.insert(0, id);
        self.conversations.insert(id, conversation);

        while self.order.len() > self.max_conversations {
            if let Some(evicted) = self.order.pop() {
                self.conversations.remove(&evicted);
                self.sending.remove(&evicted);
                debug!("Evicted conversation {evicted} beyond retention limit");
            }
        }

        self.active = Some(id);
        info!("Created conversation {id}");
        id
    }

    /// Make `id` the active conversation. Returns `false` (and changes nothing) if unknown.
    pub fn select(&mut self, id: ConversationId) -> bool {
        if !self.conversations.contains_key(&id) {
            debug!("Ignoring selection of unknown conversation {id}");
            return false;
        }
        self.active = Some(id);
        debug!("Selected conversation {id}");
        true
    }

    /// Remove a conversation. Clears the selection if it was active.
    ///
    /// Returns `false` if `id` was unknown.
    pub fn delete(&mut self, id: ConversationId) -> bool {
        if self.conversations.remove(&id).is_none() {
            return false;
        }
        self.order.retain(|existing| *existing != id);
        self.sending.remove(&id);
        if self.active == Some(id) {
            self.active = None;
        }
        info!("Deleted conversation {id}");
        true
    }

    /// Rename a conversation, truncating the title.
    ///
    /// Returns `false` if `id` was unknown.
    pub fn rename(&mut self, id: ConversationId, title: &str) -> bool {
        let Some(conversation) = self.conversations.get_mut(&id) else {
            return false;
        };
        conversation.title = truncate_title(title);
        debug!("Renamed conversation {id} to {:?}", conversation.title);
        true
    }

    /// Append a user message and mark the conversation as sending.
    ///
    /// Returns `Ok(None)` without touching anything if `text` is blank or no
    /// conversation is active. The first user message of a conversation also
    /// becomes its (truncated) title.
    ///
    /// # Errors
    /// Returns [`StudioError::ConversationNotFound`] for an unknown id and
    /// [`StudioError::SendInProgress`] while an earlier send is unfinished.
    pub fn append_user_message(
        &mut self,
        id: ConversationId,
        text: &str,
        empty_context_sentinel: &str,
    ) -> StudioResult<Option<PendingSend>> {
        if text.trim().is_empty() || self.active.is_none() {
            return Ok(None);
        }
        if self.sending.contains(&id) {
            return Err(StudioError::SendInProgress(id));
        }
        let conversation = self
            .conversations
            .get_mut(&id)
            .ok_or(StudioError::ConversationNotFound(id))?;

        let conversation_context = conversation.context(empty_context_sentinel);
        if conversation.messages.is_empty() {
            conversation.title = truncate_title(text);
            debug!("Titled conversation {id} from first message");
        }
        conversation.messages.push(Message::user(text));

        self.sending.insert(id);

        Ok(Some(PendingSend {
            conversation_id: id,
            request_content: text.to_string(),
            conversation_context,
        }))
    }

    /// Append an assistant message, attaching `template` if given.
    ///
    /// Returns `false` if `id` was unknown.
    pub fn append_assistant_message(
        &mut self,
        id: ConversationId,
        text: &str,
        template: Option<Template>,
    ) -> bool {
        let Some(conversation) = self.conversations.get_mut(&id) else {
            return false;
        };
        conversation.messages.push(Message::assistant(text));
        if let Some(template) = template {
            debug!("Attached template to {id}: {}", template.log_summary());
            conversation.template = Some(template);
        }
        true
    }

    /// Finish a send started by [`Self::append_user_message`].
    ///
    /// Clears the sending mark and appends the reply. If the conversation was
    /// deleted in the meantime the reply is dropped and `false` is returned.
    pub fn complete_send(
        &mut self,
        id: ConversationId,
        text: &str,
        template: Option<Template>,
    ) -> bool {
        self.sending.remove(&id);
        let appended = self.append_assistant_message(id, text, template);
        if !appended {
            warn!("Conversation {id} disappeared before generation finished; dropping reply");
        }
        appended
    }

    /// Id of the active conversation.
    #[must_use]
    pub const fn active_id(&self) -> Option<ConversationId> {
        self.active
    }

    /// The active conversation.
    #[must_use]
    pub fn active(&self) -> Option<&Conversation> {
        self.active.and_then(|id| self.conversations.get(&id))
    }

    /// Template shown in the preview pane: the one attached to the active conversation.
    ///
    /// A reply that lands in a conversation the user has already left does
    /// not take over the preview. The preview always follows the selection,
    /// so the shown template and the highlighted conversation never disagree.
    #[must_use]
    pub fn displayed_template(&self) -> Option<&Template> {
        self.active().and_then(|conversation| conversation.template.as_ref())
    }

    /// Look up a conversation.
    #[must_use]
    pub fn get(&self, id: ConversationId) -> Option<&Conversation> {
        self.conversations.get(&id)
    }

    /// Conversations, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &Conversation> {
        self.order
            .iter()
            .filter_map(|id| self.conversations.get(id))
    }

    /// Sidebar summaries, most recent first.
    #[must_use]
    pub fn summaries(&self) -> Vec<ConversationSummary> {
        self.iter().map(Conversation::summary).collect()
    }

    /// Whether a send for `id` is waiting on the template service.
    #[must_use]
    pub fn is_sending(&self, id: ConversationId) -> bool {
        self.sending.contains(&id)
    }

    /// Number of conversations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Owned copy of every conversation, most recent first, ready to be persisted.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Conversation> {
        self.iter().cloned().collect()
    }
}
