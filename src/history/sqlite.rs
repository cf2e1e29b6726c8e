use async_trait::async_trait;
use chrono::Utc;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use super::{HistoryState, HistoryStore};
use crate::error::{StorageError, StorageResult};

/// Static migrator that embeds migrations at compile time
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Profile key used until multi-profile support exists.
const DEFAULT_PROFILE: &str = "default";

/// SQLite-backed history store.
///
/// One row per profile holding the serialized [`HistoryState`] as JSON; the
/// value is replaced wholesale on every save.
#[derive(Clone)]
pub struct SqliteHistoryStore {
    pool: SqlitePool,
    profile: String,
}

impl SqliteHistoryStore {
    /// Open (or create) the history database at the given path.
    pub async fn new(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Connection {
                message: format!("Failed to create database directory: {}", e),
            })?;
        }

        let database_url = format!("sqlite://{}?mode=rwc", path.display());

        let options = SqliteConnectOptions::from_str(&database_url)
            .map_err(|e| StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            })?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to connect to database: {}", e),
            })?;

        let store = Self {
            pool,
            profile: DEFAULT_PROFILE.to_string(),
        };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Use a different profile key, keeping the same database.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    async fn run_migrations(&self) -> StorageResult<()> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Migration {
                message: format!("Failed to run migrations: {}", e),
            })?;

        info!("History database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn load(&self) -> StorageResult<HistoryState> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT state FROM history WHERE profile = ?")
                .bind(&self.profile)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((raw,)) => {
                serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
                    message: format!("Failed to decode history state: {}", e),
                })
            }
            // Created lazily on first use.
            None => Ok(HistoryState::new()),
        }
    }

    async fn save(&self, state: &HistoryState) -> StorageResult<()> {
        let raw = serde_json::to_string(state).map_err(|e| StorageError::Corrupt {
            message: format!("Failed to encode history state: {}", e),
        })?;

        sqlx::query(
            r#"
            INSERT INTO history (profile, state, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(profile) DO UPDATE SET state = excluded.state, updated_at = excluded.updated_at
            "#,
        )
        .bind(&self.profile)
        .bind(&raw)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
