//! Studio orchestration.
//!
//! Wires the conversation store, persistence, template generation and the
//! preview together. A send is split around the template service call: the
//! store lock is released while the service is awaited, so other
//! conversations stay usable and only the sending one is blocked.
//!
//! Lock order is always store, then variable values.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::studio::conversations::store::ConversationStore;
use crate::studio::core::config::StudioConfig;
use crate::studio::core::conversation::{Conversation, ConversationSummary};
use crate::studio::core::errors::StudioResult;
use crate::studio::core::ids::ConversationId;
use crate::studio::core::theme::Theme;
use crate::studio::generation::client::GenerationRequest;
use crate::studio::generation::service::{GenerationOutcome, TemplateService};
use crate::studio::preview::placeholder::PlaceholderRenderer;
use crate::studio::preview::variables::{Preview, VariableValues};
use crate::studio::storage::conversation_repository::ConversationRepository;
use crate::studio::storage::kv_store::{KeyValueStore, SqliteKvStore};
use crate::studio::storage::theme_store::ThemeStore;

/// Assistant reply when a template was attached.
pub const TEMPLATE_READY_MESSAGE: &str = "템플릿을 생성했습니다. 오른쪽 패널에서 확인하세요.";

/// Assistant reply when generation failed and nothing was attached.
pub const GENERATION_FAILED_MESSAGE: &str =
    "죄송합니다. 템플릿 생성 중 오류가 발생했습니다. 다시 시도해주세요.";

/// What happened to a message passed to [`Studio::send_message`].
#[derive(Clone, Debug)]
pub enum SendOutcome {
    /// Blank text or no active conversation; nothing changed.
    Ignored,
    /// The assistant replied.
    Replied {
        /// The conversation after the reply.
        conversation: Conversation,
        /// Whether a template is now attached from this send.
        template_attached: bool,
        /// Whether the attached template was built locally.
        used_fallback: bool,
    },
    /// The conversation was deleted before generation finished.
    Dropped,
}

/// Sidebar listing.
#[derive(Clone, Debug)]
pub struct ConversationList {
    /// Summaries, most recent first.
    pub conversations: Vec<ConversationSummary>,
    /// Active conversation.
    pub active_id: Option<ConversationId>,
}

/// The template studio.
pub struct Studio {
    config: StudioConfig,
    store: Mutex<ConversationStore>,
    values: Mutex<VariableValues>,
    renderer: PlaceholderRenderer,
    service: TemplateService,
    repository: ConversationRepository,
    themes: ThemeStore,
}

impl Studio {
    /// Create a studio over an explicit key-value store and template service.
    ///
    /// Persisted conversations are restored; an empty store gets one fresh conversation.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub async fn new(
        config: StudioConfig,
        kv: Arc<dyn KeyValueStore>,
        service: TemplateService,
    ) -> StudioResult<Self> {
        config.validate()?;
        let repository = ConversationRepository::new(kv.clone(), &config.storage);
        let mut store =
            ConversationStore::restore(repository.load().await, config.storage.max_conversations);
        if store.is_empty() {
            store.create();
            repository.save(&store.snapshot()).await;
        }
        let themes = ThemeStore::new(kv, &config.storage);

        Ok(Self {
            config,
            store: Mutex::new(store),
            values: Mutex::new(VariableValues::new()),
            renderer: PlaceholderRenderer::new()?,
            service,
            repository,
            themes,
        })
    }

    /// Create a studio backed by `SQLite` and the HTTP template service.
    ///
    /// # Errors
    /// Returns an error if storage or the HTTP client cannot be initialized.
    pub async fn from_config(config: StudioConfig) -> StudioResult<Self> {
        let kv = Arc::new(SqliteKvStore::open(&config.storage).await?);
        let service = TemplateService::http(&config.service)?;
        info!(
            "Studio storage at {:?}, template service at {}",
            config.storage.sqlite_path, config.service.base_url
        );
        Self::new(config, kv, service).await
    }

    /// Persist the store and bring the preview in line with the displayed template.
    ///
    /// Called with the store lock held so writes land in mutation order.
    async fn commit(&self, store: &ConversationStore) {
        self.repository.save(&store.snapshot()).await;
        self.values.lock().await.sync(store.displayed_template());
    }

    /// Create a conversation and make it active.
    pub async fn create_conversation(&self) -> ConversationId {
        let mut store = self.store.lock().await;
        let id = store.create();
        self.commit(&store).await;
        id
    }

    /// Select a conversation. Unknown ids are ignored and return `false`.
    pub async fn select_conversation(&self, id: ConversationId) -> bool {
        let mut store = self.store.lock().await;
        let selected = store.select(id);
        if selected {
            self.values.lock().await.sync(store.displayed_template());
        }
        selected
    }

    /// Delete a conversation. Callers confirm with the user first.
    pub async fn delete_conversation(&self, id: ConversationId) -> bool {
        let mut store = self.store.lock().await;
        let deleted = store.delete(id);
        if deleted {
            self.commit(&store).await;
        }
        deleted
    }

    /// Rename a conversation.
    pub async fn rename_conversation(&self, id: ConversationId, title: &str) -> bool {
        let mut store = self.store.lock().await;
        let renamed = store.rename(id, title);
        if renamed {
            self.commit(&store).await;
        }
        renamed
    }

    /// Copy of one conversation.
    pub async fn conversation(&self, id: ConversationId) -> Option<Conversation> {
        self.store.lock().await.get(id).cloned()
    }

    /// Sidebar listing.
    pub async fn list(&self) -> ConversationList {
        let store = self.store.lock().await;
        ConversationList {
            conversations: store.summaries(),
            active_id: store.active_id(),
        }
    }

    /// Whether a send for `id` is in flight.
    pub async fn is_sending(&self, id: ConversationId) -> bool {
        self.store.lock().await.is_sending(id)
    }

    /// Send a user message and wait for the generated template.
    ///
    /// # Errors
    /// Returns an error if the conversation is unknown or already sending.
    pub async fn send_message(&self, id: ConversationId, text: &str) -> StudioResult<SendOutcome> {
        let pending = {
            let mut store = self.store.lock().await;
            let pending = store.append_user_message(
                id,
                text,
                &self.config.service.empty_context_sentinel,
            )?;
            if pending.is_some() {
                self.commit(&store).await;
            }
            pending
        };
        let Some(pending) = pending else {
            debug!("Ignoring empty message or send without active conversation");
            return Ok(SendOutcome::Ignored);
        };

        let request = GenerationRequest {
            user_id: self.service.user_id(),
            request_content: pending.request_content,
            conversation_context: pending.conversation_context,
        };
        let outcome = self.service.generate(&request).await;

        let used_fallback = matches!(outcome, GenerationOutcome::Fallback { .. });
        let template = outcome.into_template();
        let template_attached = template.is_some();
        let reply = if template_attached {
            TEMPLATE_READY_MESSAGE
        } else {
            GENERATION_FAILED_MESSAGE
        };

        let mut store = self.store.lock().await;
        if !store.complete_send(id, reply, template) {
            return Ok(SendOutcome::Dropped);
        }
        self.commit(&store).await;
        let Some(conversation) = store.get(id).cloned() else {
            warn!("Conversation {id} missing right after reply");
            return Ok(SendOutcome::Dropped);
        };

        info!(
            "Send for {id} finished (template_attached={template_attached}, fallback={used_fallback})"
        );
        Ok(SendOutcome::Replied {
            conversation,
            template_attached,
            used_fallback,
        })
    }

    /// Preview pane for the displayed template.
    pub async fn preview(&self) -> Preview {
        let store = self.store.lock().await;
        let mut values = self.values.lock().await;
        values.sync(store.displayed_template());
        values.preview(&self.renderer)
    }

    /// Edit one variable value of the displayed template.
    ///
    /// Returns `false` if the displayed template has no such variable.
    pub async fn set_variable(&self, key: &str, value: &str) -> bool {
        let store = self.store.lock().await;
        let mut values = self.values.lock().await;
        values.sync(store.displayed_template());
        values.set(key, value)
    }

    /// Saved theme.
    pub async fn theme(&self) -> Theme {
        self.themes.load().await
    }

    /// Save a theme.
    pub async fn set_theme(&self, theme: Theme) {
        self.themes.save(theme).await;
    }
}
