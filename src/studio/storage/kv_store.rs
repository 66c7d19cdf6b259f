//! Durable string key-value store.
//!
//! Plays the role of browser local storage: whole values are read and
//! replaced by key, with no partial updates and no schema versioning.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use chrono::Utc;
use dashmap::DashMap;
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use crate::studio::core::config::StorageConfig;
use crate::studio::core::errors::{StudioError, StudioResult};

/// Boxed future type for key-value store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Key-value store trait.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, StudioResult<Option<String>>>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn set<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, StudioResult<()>>;
}

/// `SQLite` implementation of the key-value store.
pub struct SqliteKvStore {
    conn: Connection,
    table: String,
}

impl SqliteKvStore {
    /// Open (or create) the store described by `config`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub async fn open(config: &StorageConfig) -> StudioResult<Self> {
        Self::open_path(&config.sqlite_path, &config.table).await
    }

    /// Open a store at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub async fn open_path(path: &Path, table: &str) -> StudioResult<Self> {
        validate_table_name(table)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let conn = Connection::open(path).await?;
        Self::with_connection(conn, table).await
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns an error if `SQLite` cannot allocate the database.
    pub async fn open_in_memory(table: &str) -> StudioResult<Self> {
        validate_table_name(table)?;
        let conn = Connection::open_in_memory().await?;
        Self::with_connection(conn, table).await
    }

    async fn with_connection(conn: Connection, table: &str) -> StudioResult<Self> {
        let table_name = table.to_string();
        conn.call(move |conn| {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {table_name} (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at INTEGER NOT NULL
                )"
            ))?;
            Ok(())
        })
        .await?;

        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }
}

/// Table names are interpolated into SQL, so only identifiers are accepted.
fn validate_table_name(table: &str) -> StudioResult<()> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !table.starts_with(|c: char| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(StudioError::InvalidConfig(format!(
            "invalid table name: {table:?}"
        )))
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, StudioResult<Option<String>>> {
        Box::pin(async move {
            let table = self.table.clone();
            let key = key.to_string();
            let value = self
                .conn
                .call(move |conn| {
                    let value = conn
                        .query_row(
                            &format!("SELECT value FROM {table} WHERE key = ?1"),
                            rusqlite::params![key],
                            |row| row.get::<_, String>(0),
                        )
                        .optional()?;
                    Ok(value)
                })
                .await?;
            Ok(value)
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, StudioResult<()>> {
        Box::pin(async move {
            let table = self.table.clone();
            let key = key.to_string();
            let updated_at = Utc::now().timestamp_millis();
            self.conn
                .call(move |conn| {
                    conn.execute(
                        &format!(
                            "INSERT OR REPLACE INTO {table} (key, value, updated_at)
                             VALUES (?1, ?2, ?3)"
                        ),
                        rusqlite::params![key, value, updated_at],
                    )?;
                    Ok(())
                })
                .await?;
            Ok(())
        })
    }
}

/// In-memory implementation, used in tests and for ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: DashMap<String, String>,
}

impl MemoryKvStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, StudioResult<Option<String>>> {
        let value = self.entries.get(key).map(|entry| entry.value().clone());
        Box::pin(async move { Ok(value) })
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, StudioResult<()>> {
        self.entries.insert(key.to_string(), value);
        Box::pin(async move { Ok(()) })
    }
}
