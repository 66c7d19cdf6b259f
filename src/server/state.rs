//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::studio::core::config::StudioConfig;
use crate::studio::core::errors::StudioResult;
use crate::studio::engine::Studio;

/// Shared application state.
pub struct AppState {
    /// The studio session served over HTTP.
    pub studio: Studio,
}

impl AppState {
    /// Wrap an already constructed studio.
    #[must_use]
    pub fn new(studio: Studio) -> Arc<Self> {
        Arc::new(Self { studio })
    }

    /// Build the studio from configuration and wrap it.
    ///
    /// # Errors
    /// Returns an error if storage or the template client cannot be initialized.
    pub async fn from_config(config: StudioConfig) -> StudioResult<Arc<Self>> {
        Ok(Self::new(Studio::from_config(config).await?))
    }
}
