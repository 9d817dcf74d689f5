//! Persistence layer for the game catalog and API keys.
//!
//! Provides schema creation, CRUD operations, and query APIs backed by
//! SQLite (via rusqlite with the bundled feature), plus the store traits
//! the importer and usage guard are written against. Two interchangeable
//! adapters implement them: [`SqliteStore`] and the document-style
//! [`MemoryStore`].

pub mod memory;
pub mod operations;
pub mod queries;
pub mod schema;
pub mod store;

pub use memory::MemoryStore;
pub use operations::{
    consume_api_key_quota, delete_game, find_api_key, find_game_by_external_id,
    find_game_by_slug, increment_api_key_usage, insert_api_key, insert_game, insert_import_log,
    reset_api_key_usage, update_game, OperationError,
};
pub use queries::{
    catalog_stats, count_games, list_api_keys, list_games, list_import_logs, CatalogStats,
    GamePage, GameQuery, MAX_PAGE_SIZE,
};
pub use schema::{open_database, open_memory, SchemaError};
pub use store::{ApiKeyStore, CatalogStore, SqliteStore, StoreError};
