//! Store traits the importer and usage guard are written against, and the
//! SQLite adapter.
//!
//! Every method is a single atomic step against the backing store. Callers
//! hold stores as `Arc<dyn CatalogStore>` / `Arc<dyn ApiKeyStore>`.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use gameboxd_catalog::types::{ApiKey, GameRecord, ImportLog};
use rusqlite::Connection;
use thiserror::Error;

use crate::operations::{self, OperationError};
use crate::queries::{self, CatalogStats, GamePage, GameQuery};
use crate::schema::{self, SchemaError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Operation(#[from] OperationError),
    #[error("Failed to open store: {0}")]
    Schema(#[from] SchemaError),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// A uniqueness constraint rejected the write.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Operation(OperationError::Conflict { .. }))
    }

    /// The target row did not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Operation(OperationError::NotFound { .. }))
    }

    pub(crate) fn conflict(entity_type: &str, id: &str) -> Self {
        Self::Operation(OperationError::Conflict {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        })
    }

    pub(crate) fn not_found(entity_type: &str, id: &str) -> Self {
        Self::Operation(OperationError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        })
    }
}

/// Persistence of catalog records.
pub trait CatalogStore: Send + Sync {
    fn find_by_slug(&self, slug: &str) -> Result<Option<GameRecord>, StoreError>;

    fn find_by_external_id(&self, external_id: i64) -> Result<Option<GameRecord>, StoreError>;

    /// Create a record. A taken slug or external id is a conflict.
    fn insert(&self, game: &GameRecord) -> Result<GameRecord, StoreError>;

    /// Replace the record stored under `slug`, which may be renamed to `game.slug`.
    fn update(&self, slug: &str, game: &GameRecord) -> Result<GameRecord, StoreError>;

    fn delete(&self, slug: &str) -> Result<(), StoreError>;

    fn list(&self, query: &GameQuery) -> Result<GamePage, StoreError>;

    fn count(&self) -> Result<u64, StoreError>;

    fn stats(&self) -> Result<CatalogStats, StoreError>;

    fn record_import(&self, log: &ImportLog) -> Result<i64, StoreError>;

    /// Most recent import runs, newest first.
    fn import_logs(&self, limit: u32) -> Result<Vec<ImportLog>, StoreError>;
}

/// Persistence of API keys and their usage counters.
pub trait ApiKeyStore: Send + Sync {
    fn find_by_key(&self, key: &str) -> Result<Option<ApiKey>, StoreError>;

    /// Add one to the usage counter regardless of the limit.
    fn increment_usage(&self, key: &str) -> Result<(), StoreError>;

    /// Atomically charge one request if the key is limited and below its limit.
    /// Returns `false` when nothing was charged.
    fn consume_quota(&self, key: &str) -> Result<bool, StoreError>;

    fn insert_key(&self, key: &ApiKey) -> Result<ApiKey, StoreError>;

    fn list_keys(&self) -> Result<Vec<ApiKey>, StoreError>;

    /// Zero every usage counter. Returns how many keys changed.
    fn reset_usage(&self) -> Result<usize, StoreError>;
}

// ── SQLite Adapter ──────────────────────────────────────────────────────────

/// Relational store over a single SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a database file.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self::from_connection(schema::open_database(path)?))
    }

    /// A fresh in-memory database.
    pub fn memory() -> Result<Self, StoreError> {
        Ok(Self::from_connection(schema::open_memory()?))
    }

    /// Wrap a connection that already carries the schema.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, OperationError>,
    ) -> Result<T, StoreError> {
        let conn = self.lock()?;
        Ok(f(&conn)?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".into()))
    }
}

impl CatalogStore for SqliteStore {
    fn find_by_slug(&self, slug: &str) -> Result<Option<GameRecord>, StoreError> {
        self.with_conn(|c| operations::find_game_by_slug(c, slug))
    }

    fn find_by_external_id(&self, external_id: i64) -> Result<Option<GameRecord>, StoreError> {
        self.with_conn(|c| operations::find_game_by_external_id(c, external_id))
    }

    fn insert(&self, game: &GameRecord) -> Result<GameRecord, StoreError> {
        self.with_conn(|c| operations::insert_game(c, game))
    }

    fn update(&self, slug: &str, game: &GameRecord) -> Result<GameRecord, StoreError> {
        self.with_conn(|c| operations::update_game(c, slug, game))
    }

    fn delete(&self, slug: &str) -> Result<(), StoreError> {
        self.with_conn(|c| operations::delete_game(c, slug))
    }

    fn list(&self, query: &GameQuery) -> Result<GamePage, StoreError> {
        self.with_conn(|c| queries::list_games(c, query))
    }

    fn count(&self) -> Result<u64, StoreError> {
        self.with_conn(queries::count_games)
    }

    fn stats(&self) -> Result<CatalogStats, StoreError> {
        self.with_conn(queries::catalog_stats)
    }

    fn record_import(&self, log: &ImportLog) -> Result<i64, StoreError> {
        self.with_conn(|c| operations::insert_import_log(c, log))
    }

    fn import_logs(&self, limit: u32) -> Result<Vec<ImportLog>, StoreError> {
        self.with_conn(|c| queries::list_import_logs(c, limit))
    }
}

impl ApiKeyStore for SqliteStore {
    fn find_by_key(&self, key: &str) -> Result<Option<ApiKey>, StoreError> {
        self.with_conn(|c| operations::find_api_key(c, key))
    }

    fn increment_usage(&self, key: &str) -> Result<(), StoreError> {
        self.with_conn(|c| operations::increment_api_key_usage(c, key))
    }

    fn consume_quota(&self, key: &str) -> Result<bool, StoreError> {
        self.with_conn(|c| operations::consume_api_key_quota(c, key))
    }

    fn insert_key(&self, key: &ApiKey) -> Result<ApiKey, StoreError> {
        self.with_conn(|c| operations::insert_api_key(c, key))
    }

    fn list_keys(&self) -> Result<Vec<ApiKey>, StoreError> {
        self.with_conn(queries::list_api_keys)
    }

    fn reset_usage(&self) -> Result<usize, StoreError> {
        self.with_conn(operations::reset_api_key_usage)
    }
}
