//! Configuration for the template studio.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::studio::core::errors::{StudioError, StudioResult};

/// Environment variable overriding the template service base URL.
pub const API_URL_ENV: &str = "ALIMTALK_API_URL";
/// Environment variable overriding the `SQLite` path.
pub const DB_PATH_ENV: &str = "ALIMTALK_DB_PATH";
/// Environment variable overriding the HTTP port.
pub const PORT_ENV: &str = "ALIMTALK_PORT";
/// Environment variable overriding the failure policy (`fallback` or `surface`).
pub const FAILURE_POLICY_ENV: &str = "ALIMTALK_FAILURE_POLICY";
/// Environment variable overriding the requesting user id.
pub const USER_ID_ENV: &str = "ALIMTALK_USER_ID";

/// Top-level configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StudioConfig {
    /// Template service settings.
    pub service: ServiceConfig,
    /// Durable storage settings.
    pub storage: StorageConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
}

impl StudioConfig {
    /// Defaults overlaid with `ALIMTALK_*` environment variables.
    ///
    /// # Errors
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_env() -> StudioResult<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.service.base_url = url;
        }
        if let Ok(path) = std::env::var(DB_PATH_ENV) {
            config.storage.sqlite_path = PathBuf::from(path);
        }
        if let Ok(port) = std::env::var(PORT_ENV) {
            config.server.port = port
                .parse()
                .map_err(|_| StudioError::InvalidConfig(format!("{PORT_ENV}={port}")))?;
        }
        if let Ok(policy) = std::env::var(FAILURE_POLICY_ENV) {
            config.service.failure_policy = policy.parse()?;
        }
        if let Ok(user_id) = std::env::var(USER_ID_ENV) {
            config.service.user_id = user_id
                .parse()
                .map_err(|_| StudioError::InvalidConfig(format!("{USER_ID_ENV}={user_id}")))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> StudioResult<()> {
        if self.storage.max_conversations == 0 {
            return Err(StudioError::InvalidConfig(
                "storage.max_conversations must be > 0".to_string(),
            ));
        }

        if self.storage.conversations_key.is_empty() || self.storage.theme_key.is_empty() {
            return Err(StudioError::InvalidConfig(
                "storage keys must not be empty".to_string(),
            ));
        }

        if self.storage.conversations_key == self.storage.theme_key {
            return Err(StudioError::InvalidConfig(
                "storage.conversations_key and storage.theme_key must differ".to_string(),
            ));
        }

        if self.service.timeout.is_zero() {
            return Err(StudioError::InvalidConfig(
                "service.timeout must be > 0".to_string(),
            ));
        }

        if !self.service.templates_path.starts_with('/') {
            return Err(StudioError::InvalidConfig(
                "service.templates_path must start with '/'".to_string(),
            ));
        }

        self.service.endpoint()?;
        Ok(())
    }
}

/// What to do when the template service cannot be reached.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Substitute a locally built template after a short delay.
    #[default]
    Fallback,
    /// Report the failure in the chat and attach nothing.
    Surface,
}

impl FromStr for FailurePolicy {
    type Err = StudioError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fallback" | "mock" => Ok(Self::Fallback),
            "surface" | "error" => Ok(Self::Surface),
            other => Err(StudioError::InvalidConfig(format!(
                "unknown failure policy: {other}"
            ))),
        }
    }
}

/// Template service settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the template service.
    pub base_url: String,
    /// Path of the generation endpoint.
    pub templates_path: String,
    /// Whole-request timeout.
    #[serde(with = "duration_serde")]
    pub timeout: Duration,
    /// Account id sent with every request.
    pub user_id: i64,
    /// Behaviour on transport or status failures.
    pub failure_policy: FailurePolicy,
    /// Delay before a fallback template is returned, in milliseconds.
    pub fallback_delay_ms: u64,
    /// Context sent when the conversation has no earlier messages.
    pub empty_context_sentinel: String,
}

impl ServiceConfig {
    /// Full URL of the generation endpoint.
    ///
    /// # Errors
    /// Returns an error if the base URL or path cannot be parsed.
    pub fn endpoint(&self) -> StudioResult<Url> {
        let base = Url::parse(&self.base_url)?;
        Ok(base.join(&self.templates_path)?)
    }

    /// Fallback delay as a [`Duration`].
    #[must_use]
    pub const fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            templates_path: "/ai/templates".to_string(),
            timeout: Duration::from_secs(30),
            user_id: 123,
            failure_policy: FailurePolicy::Fallback,
            fallback_delay_ms: 1000,
            empty_context_sentinel: "hi".to_string(),
        }
    }
}

/// Durable storage settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `SQLite` database path.
    pub sqlite_path: PathBuf,
    /// Key-value table name.
    pub table: String,
    /// Key holding the serialized conversation list.
    pub conversations_key: String,
    /// Key holding the selected theme id.
    pub theme_key: String,
    /// Maximum number of conversations kept.
    pub max_conversations: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("alimtalk_studio.sqlite"),
            table: "kv_store".to_string(),
            conversations_key: "alimtalk_conversations".to_string(),
            theme_key: "app-theme".to_string(),
            max_conversations: 10,
        }
    }
}

/// HTTP server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listening port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

/// Serde module for Duration serialization.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
