//! Persisted theme selection.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::studio::core::config::StorageConfig;
use crate::studio::core::theme::Theme;
use crate::studio::storage::kv_store::KeyValueStore;

/// Stores the selected [`Theme`] under its own key.
#[derive(Clone)]
pub struct ThemeStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl ThemeStore {
    /// Create a theme store over `kv`.
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>, config: &StorageConfig) -> Self {
        Self {
            kv,
            key: config.theme_key.clone(),
        }
    }

    /// Saved theme, or [`Theme::Default`] if none or unrecognised.
    pub async fn load(&self) -> Theme {
        match self.kv.get(&self.key).await {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|unknown| {
                warn!("Ignoring unknown theme id {unknown:?}");
                Theme::Default
            }),
            Ok(None) => Theme::Default,
            Err(err) => {
                warn!("Failed to read theme: {err}");
                Theme::Default
            }
        }
    }

    /// Persist `theme`. Failures are logged and ignored.
    pub async fn save(&self, theme: Theme) {
        match self.kv.set(&self.key, theme.as_str().to_string()).await {
            Ok(()) => debug!("Theme set to {theme}"),
            Err(err) => warn!("Failed to save theme: {err}"),
        }
    }
}
