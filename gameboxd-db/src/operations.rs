//! CRUD operations for games, API keys, and the import log.

use gameboxd_catalog::types::*;
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, Row};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON column error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Entity not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: String, id: String },
    #[error("Entity already exists: {entity_type} with id '{id}'")]
    Conflict { entity_type: String, id: String },
}

impl OperationError {
    fn not_found(entity_type: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    fn conflict(entity_type: &str, id: impl ToString) -> Self {
        Self::Conflict {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }
}

pub(crate) const GAME_COLUMNS: &str = "slug, name, release_date, description, publisher, developer,
     platforms, genres, cover_image_url, aliases, franchises, hashtags, images, videos,
     store_links, is_nsfw, added_by, provenance_kind, external_id, extra, created_at, updated_at";

pub(crate) const API_KEY_COLUMNS: &str =
    "key, description, is_unlimited, monthly_limit, current_month_usage, last_used_at, created_at";

// ── Game Operations ─────────────────────────────────────────────────────────

/// Insert a new game. Fails with [`OperationError::Conflict`] when the slug
/// (or the external id) is already taken.
pub fn insert_game(conn: &Connection, game: &GameRecord) -> Result<GameRecord, OperationError> {
    let cols = GameColumns::encode(game)?;
    let result = conn.execute(
        "INSERT INTO games (slug, name, release_date, description, publisher, developer,
             platforms, genres, cover_image_url, aliases, franchises, hashtags, images, videos,
             store_links, is_nsfw, added_by, provenance_kind, external_id, extra)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
        params![
            game.slug,
            game.name,
            game.release_date.to_string(),
            game.description,
            game.publisher,
            game.developer,
            cols.platforms,
            cols.genres,
            game.cover_image_url,
            cols.aliases,
            cols.franchises,
            cols.hashtags,
            cols.images,
            cols.videos,
            cols.store_links,
            game.is_nsfw,
            game.added_by.label(),
            game.added_by.kind(),
            game.external_id,
            cols.extra,
        ],
    );
    map_constraint(result, "game", &game.slug)?;

    find_game_by_slug(conn, &game.slug)?.ok_or_else(|| OperationError::not_found("game", &game.slug))
}

/// Replace the row currently stored under `slug` with `game`.
///
/// `game.slug` may differ from `slug` (a rename); the creation timestamp and
/// provenance columns of the existing row are kept.
pub fn update_game(
    conn: &Connection,
    slug: &str,
    game: &GameRecord,
) -> Result<GameRecord, OperationError> {
    let cols = GameColumns::encode(game)?;
    let result = conn.execute(
        "UPDATE games SET
             slug = ?2, name = ?3, release_date = ?4, description = ?5, publisher = ?6,
             developer = ?7, platforms = ?8, genres = ?9, cover_image_url = ?10, aliases = ?11,
             franchises = ?12, hashtags = ?13, images = ?14, videos = ?15, store_links = ?16,
             is_nsfw = ?17, external_id = ?18, extra = ?19, updated_at = datetime('now')
         WHERE slug = ?1",
        params![
            slug,
            game.slug,
            game.name,
            game.release_date.to_string(),
            game.description,
            game.publisher,
            game.developer,
            cols.platforms,
            cols.genres,
            game.cover_image_url,
            cols.aliases,
            cols.franchises,
            cols.hashtags,
            cols.images,
            cols.videos,
            cols.store_links,
            game.is_nsfw,
            game.external_id,
            cols.extra,
        ],
    );
    let changed = map_constraint(result, "game", &game.slug)?;
    if changed == 0 {
        return Err(OperationError::not_found("game", slug));
    }

    find_game_by_slug(conn, &game.slug)?.ok_or_else(|| OperationError::not_found("game", &game.slug))
}

/// Delete a game by slug.
pub fn delete_game(conn: &Connection, slug: &str) -> Result<(), OperationError> {
    let changed = conn.execute("DELETE FROM games WHERE slug = ?1", params![slug])?;
    if changed == 0 {
        return Err(OperationError::not_found("game", slug));
    }
    Ok(())
}

/// Find a game by slug (exact match).
pub fn find_game_by_slug(
    conn: &Connection,
    slug: &str,
) -> Result<Option<GameRecord>, OperationError> {
    let sql = format!("SELECT {GAME_COLUMNS} FROM games WHERE slug = ?1");
    let mut stmt = conn.prepare(&sql)?;
    optional(stmt.query_row(params![slug], row_to_game))
}

/// Find a game by the metadata provider's id.
pub fn find_game_by_external_id(
    conn: &Connection,
    external_id: i64,
) -> Result<Option<GameRecord>, OperationError> {
    let sql = format!("SELECT {GAME_COLUMNS} FROM games WHERE external_id = ?1 LIMIT 1");
    let mut stmt = conn.prepare(&sql)?;
    optional(stmt.query_row(params![external_id], row_to_game))
}

// ── API Key Operations ──────────────────────────────────────────────────────

/// Insert a new API key. A duplicate key is a [`OperationError::Conflict`].
pub fn insert_api_key(conn: &Connection, key: &ApiKey) -> Result<ApiKey, OperationError> {
    let result = conn.execute(
        "INSERT INTO api_keys (key, description, is_unlimited, monthly_limit, current_month_usage)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            key.key,
            key.description,
            key.is_unlimited,
            key.monthly_limit,
            key.current_month_usage,
        ],
    );
    map_constraint(result, "api key", &key.key)?;

    find_api_key(conn, &key.key)?.ok_or_else(|| OperationError::not_found("api key", &key.key))
}

/// Find an API key record.
pub fn find_api_key(conn: &Connection, key: &str) -> Result<Option<ApiKey>, OperationError> {
    let sql = format!("SELECT {API_KEY_COLUMNS} FROM api_keys WHERE key = ?1");
    let mut stmt = conn.prepare(&sql)?;
    optional(stmt.query_row(params![key], row_to_api_key))
}

/// Unconditionally add one to a key's monthly usage.
pub fn increment_api_key_usage(conn: &Connection, key: &str) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE api_keys
         SET current_month_usage = current_month_usage + 1, last_used_at = datetime('now')
         WHERE key = ?1",
        params![key],
    )?;
    if changed == 0 {
        return Err(OperationError::not_found("api key", key));
    }
    Ok(())
}

/// Charge one request against a limited key's quota in a single statement.
///
/// Returns `false` when the key is unknown, unlimited, or already at its
/// limit; the counter never passes `monthly_limit`.
pub fn consume_api_key_quota(conn: &Connection, key: &str) -> Result<bool, OperationError> {
    let changed = conn.execute(
        "UPDATE api_keys
         SET current_month_usage = current_month_usage + 1, last_used_at = datetime('now')
         WHERE key = ?1 AND is_unlimited = 0 AND current_month_usage < monthly_limit",
        params![key],
    )?;
    Ok(changed == 1)
}

/// Zero every key's monthly usage. Returns the number of keys reset.
pub fn reset_api_key_usage(conn: &Connection) -> Result<usize, OperationError> {
    let changed = conn.execute(
        "UPDATE api_keys SET current_month_usage = 0 WHERE current_month_usage != 0",
        [],
    )?;
    Ok(changed)
}

// ── Import Log Operations ───────────────────────────────────────────────────

/// Insert an import log entry. Returns the generated ID.
pub fn insert_import_log(conn: &Connection, log: &ImportLog) -> Result<i64, OperationError> {
    conn.execute(
        "INSERT INTO import_log (source, imported_at, records_added, records_updated, records_failed)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            log.source,
            log.imported_at,
            log.records_added,
            log.records_updated,
            log.records_failed,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

// ── Row Mapping ─────────────────────────────────────────────────────────────

/// JSON-encoded collection columns of a game row.
struct GameColumns {
    platforms: String,
    genres: String,
    aliases: String,
    franchises: String,
    hashtags: String,
    images: String,
    videos: String,
    store_links: String,
    extra: String,
}

impl GameColumns {
    fn encode(game: &GameRecord) -> Result<Self, serde_json::Error> {
        Ok(Self {
            platforms: serde_json::to_string(&game.platforms)?,
            genres: serde_json::to_string(&game.genres)?,
            aliases: serde_json::to_string(&game.aliases)?,
            franchises: serde_json::to_string(&game.franchises)?,
            hashtags: serde_json::to_string(&game.hashtags)?,
            images: serde_json::to_string(&game.images)?,
            videos: serde_json::to_string(&game.videos)?,
            store_links: serde_json::to_string(&game.store_links)?,
            extra: serde_json::to_string(&game.extra)?,
        })
    }
}

/// Map a row selected with [`GAME_COLUMNS`].
pub(crate) fn row_to_game(row: &Row<'_>) -> rusqlite::Result<GameRecord> {
    let release_date: String = row.get(2)?;
    let added_by: String = row.get(16)?;
    let provenance_kind: String = row.get(17)?;
    Ok(GameRecord {
        slug: row.get(0)?,
        name: row.get(1)?,
        release_date: ReleaseDate::parse(&release_date)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?,
        description: row.get(3)?,
        publisher: row.get(4)?,
        developer: row.get(5)?,
        platforms: json_column(row, 6)?,
        genres: json_column(row, 7)?,
        cover_image_url: row.get(8)?,
        aliases: json_column(row, 9)?,
        franchises: json_column(row, 10)?,
        hashtags: json_column(row, 11)?,
        images: json_column(row, 12)?,
        videos: json_column(row, 13)?,
        store_links: json_column(row, 14)?,
        is_nsfw: row.get(15)?,
        added_by: Provenance::from_parts(&provenance_kind, &added_by),
        external_id: row.get(18)?,
        extra: json_column(row, 19)?,
        created_at: row.get(20)?,
        updated_at: row.get(21)?,
    })
}

/// Map a row selected with [`API_KEY_COLUMNS`].
pub(crate) fn row_to_api_key(row: &Row<'_>) -> rusqlite::Result<ApiKey> {
    Ok(ApiKey {
        key: row.get(0)?,
        description: row.get(1)?,
        is_unlimited: row.get(2)?,
        monthly_limit: row.get(3)?,
        current_month_usage: row.get(4)?,
        last_used_at: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn optional<T>(result: rusqlite::Result<T>) -> Result<Option<T>, OperationError> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn map_constraint(
    result: rusqlite::Result<usize>,
    entity_type: &str,
    id: &str,
) -> Result<usize, OperationError> {
    match result {
        Ok(changed) => Ok(changed),
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
            Err(OperationError::conflict(entity_type, id))
        }
        Err(e) => Err(e.into()),
    }
}
