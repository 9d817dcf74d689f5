//! Wiring configured store adapters into shared trait objects.

use std::sync::Arc;

use gameboxd_db::{ApiKeyStore, CatalogStore, MemoryStore, SqliteStore, StoreError};

use crate::settings::{Backend, DatabaseSettings};

/// The stores a running service shares across handlers.
#[derive(Clone)]
pub struct Stores {
    pub catalog: Arc<dyn CatalogStore>,
    pub keys: Arc<dyn ApiKeyStore>,
}

impl Stores {
    /// Both traits served by one adapter instance.
    pub fn from_adapter<S: CatalogStore + ApiKeyStore + 'static>(store: S) -> Self {
        let store = Arc::new(store);
        Self {
            catalog: store.clone(),
            keys: store,
        }
    }
}

/// Open the adapter selected by `settings`, creating the database file and
/// its parent directory when needed.
pub fn open_stores(settings: &DatabaseSettings) -> Result<Stores, StoreError> {
    match settings.backend {
        Backend::Sqlite => {
            let path = settings.resolved_path();
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Unavailable(format!("cannot create {}: {e}", parent.display()))
                })?;
            }
            log::info!("Opening SQLite store at {}", path.display());
            Ok(Stores::from_adapter(SqliteStore::open(&path)?))
        }
        Backend::Memory => {
            log::info!("Using in-memory document store (nothing is persisted)");
            Ok(Stores::from_adapter(MemoryStore::new()))
        }
    }
}
