//! Document-style store holding catalog records and API keys as JSON
//! documents in process memory.
//!
//! Behaves like [`SqliteStore`](crate::SqliteStore) for every trait method,
//! including uniqueness of slugs and external ids. Nothing is persisted.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use gameboxd_catalog::types::{ApiKey, GameRecord, ImportLog, Provenance};
use serde_json::Value;

use crate::queries::{CatalogStats, GamePage, GameQuery};
use crate::store::{ApiKeyStore, CatalogStore, StoreError};

/// Document key holding the provenance kind next to the `addedBy` label.
const ADDED_BY_KIND: &str = "addedByKind";

fn game_doc(game: &GameRecord) -> Result<Value, StoreError> {
    let mut doc = serde_json::to_value(game)?;
    if let Value::Object(map) = &mut doc {
        map.insert(ADDED_BY_KIND.to_string(), Value::from(game.added_by.kind()));
    }
    Ok(doc)
}

fn game_from_doc(doc: &Value) -> Result<GameRecord, StoreError> {
    let mut doc = doc.clone();
    let kind = doc.as_object_mut().and_then(|map| map.remove(ADDED_BY_KIND));
    let mut game: GameRecord = serde_json::from_value(doc)?;
    if let Some(kind) = kind.as_ref().and_then(Value::as_str) {
        game.added_by = Provenance::from_parts(kind, game.added_by.label());
    }
    Ok(game)
}

#[derive(Default)]
struct Documents {
    games: BTreeMap<String, Value>,
    api_keys: BTreeMap<String, Value>,
    import_log: Vec<ImportLog>,
}

impl Documents {
    fn game(&self, slug: &str) -> Result<Option<GameRecord>, StoreError> {
        self.games.get(slug).map(game_from_doc).transpose()
    }

    fn all_games(&self) -> Result<Vec<GameRecord>, StoreError> {
        self.games.values().map(game_from_doc).collect()
    }

    fn api_key(&self, key: &str) -> Result<Option<ApiKey>, StoreError> {
        self.api_keys
            .get(key)
            .map(|doc| serde_json::from_value(doc.clone()))
            .transpose()
            .map_err(Into::into)
    }

    /// Slug of the game holding `external_id`, if any.
    fn slug_for_external_id(&self, external_id: i64) -> Option<&str> {
        self.games.iter().find_map(|(slug, doc)| {
            (doc.get("externalId").and_then(Value::as_i64) == Some(external_id))
                .then_some(slug.as_str())
        })
    }

    fn put_key(&mut self, key: &ApiKey) -> Result<(), StoreError> {
        self.api_keys
            .insert(key.key.clone(), serde_json::to_value(key)?);
        Ok(())
    }
}

/// In-memory document store.
#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<Documents>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Documents>, StoreError> {
        self.docs
            .lock()
            .map_err(|_| StoreError::Unavailable("document lock poisoned".into()))
    }
}

fn now() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

impl CatalogStore for MemoryStore {
    fn find_by_slug(&self, slug: &str) -> Result<Option<GameRecord>, StoreError> {
        self.lock()?.game(slug)
    }

    fn find_by_external_id(&self, external_id: i64) -> Result<Option<GameRecord>, StoreError> {
        let docs = self.lock()?;
        match docs.slug_for_external_id(external_id) {
            Some(slug) => docs.game(slug),
            None => Ok(None),
        }
    }

    fn insert(&self, game: &GameRecord) -> Result<GameRecord, StoreError> {
        let mut docs = self.lock()?;
        if docs.games.contains_key(&game.slug) {
            return Err(StoreError::conflict("game", &game.slug));
        }
        if let Some(id) = game.external_id {
            if docs.slug_for_external_id(id).is_some() {
                return Err(StoreError::conflict("game", &game.slug));
            }
        }

        let mut stored = game.clone();
        let ts = now();
        stored.created_at = Some(ts.clone());
        stored.updated_at = Some(ts);
        docs.games
            .insert(stored.slug.clone(), game_doc(&stored)?);
        Ok(stored)
    }

    fn update(&self, slug: &str, game: &GameRecord) -> Result<GameRecord, StoreError> {
        let mut docs = self.lock()?;
        let existing = docs
            .game(slug)?
            .ok_or_else(|| StoreError::not_found("game", slug))?;
        if game.slug != slug && docs.games.contains_key(&game.slug) {
            return Err(StoreError::conflict("game", &game.slug));
        }
        if let Some(id) = game.external_id {
            if docs.slug_for_external_id(id).is_some_and(|owner| owner != slug) {
                return Err(StoreError::conflict("game", &game.slug));
            }
        }

        let mut stored = game.clone();
        stored.added_by = existing.added_by;
        stored.created_at = existing.created_at;
        stored.updated_at = Some(now());
        docs.games.remove(slug);
        docs.games
            .insert(stored.slug.clone(), game_doc(&stored)?);
        Ok(stored)
    }

    fn delete(&self, slug: &str) -> Result<(), StoreError> {
        match self.lock()?.games.remove(slug) {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found("game", slug)),
        }
    }

    fn list(&self, query: &GameQuery) -> Result<GamePage, StoreError> {
        let mut games: Vec<GameRecord> = self
            .lock()?
            .all_games()?
            .into_iter()
            .filter(|g| query.matches(g))
            .collect();
        games.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.slug.cmp(&b.slug))
        });

        let total = games.len() as u64;
        let games = games
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.page_size() as usize)
            .collect();
        Ok(GamePage {
            games,
            total,
            page: query.page(),
            page_size: query.page_size(),
        })
    }

    fn count(&self) -> Result<u64, StoreError> {
        Ok(self.lock()?.games.len() as u64)
    }

    fn stats(&self) -> Result<CatalogStats, StoreError> {
        let docs = self.lock()?;
        let games = docs.all_games()?;
        Ok(CatalogStats {
            games: games.len() as i64,
            complete_games: games.iter().filter(|g| g.is_complete()).count() as i64,
            imported_games: games
                .iter()
                .filter(|g| g.added_by.kind() == "external_import")
                .count() as i64,
            api_keys: docs.api_keys.len() as i64,
            last_import: docs.import_log.iter().map(|l| l.imported_at.clone()).max(),
        })
    }

    fn record_import(&self, log: &ImportLog) -> Result<i64, StoreError> {
        let mut docs = self.lock()?;
        let id = docs.import_log.len() as i64 + 1;
        docs.import_log.push(ImportLog { id, ..log.clone() });
        Ok(id)
    }

    fn import_logs(&self, limit: u32) -> Result<Vec<ImportLog>, StoreError> {
        let mut logs = self.lock()?.import_log.clone();
        logs.sort_by(|a, b| b.imported_at.cmp(&a.imported_at).then(b.id.cmp(&a.id)));
        logs.truncate(limit as usize);
        Ok(logs)
    }
}

impl ApiKeyStore for MemoryStore {
    fn find_by_key(&self, key: &str) -> Result<Option<ApiKey>, StoreError> {
        self.lock()?.api_key(key)
    }

    fn increment_usage(&self, key: &str) -> Result<(), StoreError> {
        let mut docs = self.lock()?;
        let mut record = docs
            .api_key(key)?
            .ok_or_else(|| StoreError::not_found("api key", key))?;
        record.current_month_usage += 1;
        record.last_used_at = Some(now());
        docs.put_key(&record)
    }

    fn consume_quota(&self, key: &str) -> Result<bool, StoreError> {
        let mut docs = self.lock()?;
        let Some(mut record) = docs.api_key(key)? else {
            return Ok(false);
        };
        if record.is_unlimited || record.quota_exhausted() {
            return Ok(false);
        }
        record.current_month_usage += 1;
        record.last_used_at = Some(now());
        docs.put_key(&record)?;
        Ok(true)
    }

    fn insert_key(&self, key: &ApiKey) -> Result<ApiKey, StoreError> {
        let mut docs = self.lock()?;
        if docs.api_keys.contains_key(&key.key) {
            return Err(StoreError::conflict("api key", &key.key));
        }
        let mut stored = key.clone();
        stored.created_at = Some(now());
        docs.put_key(&stored)?;
        Ok(stored)
    }

    fn list_keys(&self) -> Result<Vec<ApiKey>, StoreError> {
        let docs = self.lock()?;
        let mut keys = docs
            .api_keys
            .values()
            .map(|doc| serde_json::from_value::<ApiKey>(doc.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        keys.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.key.cmp(&b.key)));
        Ok(keys)
    }

    fn reset_usage(&self) -> Result<usize, StoreError> {
        let mut docs = self.lock()?;
        let mut changed = 0;
        for doc in docs.api_keys.values_mut() {
            if let Some(usage) = doc.get_mut("current_month_usage") {
                if usage.as_i64() != Some(0) {
                    *usage = Value::from(0);
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }
}
