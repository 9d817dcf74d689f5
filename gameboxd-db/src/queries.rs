//! Read queries for the catalog database.
//!
//! Provides filtered, paginated game listing, statistics, and listings of
//! API keys and import runs.

use gameboxd_catalog::types::*;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection};

use crate::operations::{row_to_api_key, row_to_game, OperationError, API_KEY_COLUMNS, GAME_COLUMNS};

/// Largest page a single listing call returns.
pub const MAX_PAGE_SIZE: u32 = 100;

const DEFAULT_PAGE_SIZE: u32 = 20;

// ── Game Listing ────────────────────────────────────────────────────────────

/// Filter and pagination for [`list_games`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameQuery {
    /// Case-insensitive substring of the name.
    pub search: Option<String>,
    /// Exact platform membership.
    pub platform: Option<String>,
    /// Exact genre membership.
    pub genre: Option<String>,
    /// Only records with at least one platform and one genre.
    pub complete_only: bool,
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
}

impl Default for GameQuery {
    fn default() -> Self {
        Self {
            search: None,
            platform: None,
            genre: None,
            complete_only: false,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl GameQuery {
    /// Page number clamped to at least 1.
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    /// Page size clamped to `1..=MAX_PAGE_SIZE`.
    pub fn page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.page_size())
    }

    /// The trimmed search term, if any.
    pub fn search_term(&self) -> Option<&str> {
        non_blank(self.search.as_deref())
    }

    pub fn platform_filter(&self) -> Option<&str> {
        non_blank(self.platform.as_deref())
    }

    pub fn genre_filter(&self) -> Option<&str> {
        non_blank(self.genre.as_deref())
    }

    /// Whether `game` passes every filter of this query.
    ///
    /// Used by stores that filter in process; the SQL in [`list_games`]
    /// expresses the same conditions.
    pub fn matches(&self, game: &GameRecord) -> bool {
        if let Some(term) = self.search_term() {
            if !game.name.to_lowercase().contains(&term.to_lowercase()) {
                return false;
            }
        }
        if let Some(platform) = self.platform_filter() {
            if !game.platforms.contains(platform) {
                return false;
            }
        }
        if let Some(genre) = self.genre_filter() {
            if !game.genres.contains(genre) {
                return false;
            }
        }
        !self.complete_only || game.is_complete()
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// One page of listing results.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePage {
    pub games: Vec<GameRecord>,
    /// Matching records across all pages.
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// List games matching `query`, ordered by name (case-insensitive), then slug.
pub fn list_games(conn: &Connection, query: &GameQuery) -> Result<GamePage, OperationError> {
    let (where_sql, mut values) = where_clause(query);

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM games{where_sql}"),
        params_from_iter(values.iter()),
        |r| r.get(0),
    )?;

    values.push(SqlValue::Integer(i64::from(query.page_size())));
    values.push(SqlValue::Integer(query.offset() as i64));
    let sql = format!(
        "SELECT {GAME_COLUMNS} FROM games{where_sql}
         ORDER BY name COLLATE NOCASE, slug LIMIT ? OFFSET ?"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values.iter()), row_to_game)?;
    let games = rows.collect::<Result<Vec<_>, _>>()?;

    Ok(GamePage {
        games,
        total: total as u64,
        page: query.page(),
        page_size: query.page_size(),
    })
}

/// Count every game in the catalog.
pub fn count_games(conn: &Connection) -> Result<u64, OperationError> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM games", [], |r| r.get(0))?;
    Ok(n as u64)
}

fn where_clause(query: &GameQuery) -> (String, Vec<SqlValue>) {
    let mut conditions = Vec::new();
    let mut values = Vec::new();

    if let Some(term) = query.search_term() {
        conditions.push("name LIKE ? ESCAPE '\\'");
        values.push(SqlValue::Text(format!("%{}%", escape_like(term))));
    }
    if let Some(platform) = query.platform_filter() {
        conditions.push("EXISTS (SELECT 1 FROM json_each(games.platforms) WHERE value = ?)");
        values.push(SqlValue::Text(platform.to_string()));
    }
    if let Some(genre) = query.genre_filter() {
        conditions.push("EXISTS (SELECT 1 FROM json_each(games.genres) WHERE value = ?)");
        values.push(SqlValue::Text(genre.to_string()));
    }
    if query.complete_only {
        conditions.push("json_array_length(platforms) > 0 AND json_array_length(genres) > 0");
    }

    if conditions.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), values)
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Get summary statistics for the catalog.
pub fn catalog_stats(conn: &Connection) -> Result<CatalogStats, OperationError> {
    let games: i64 = conn.query_row("SELECT COUNT(*) FROM games", [], |r| r.get(0))?;
    let complete_games: i64 = conn.query_row(
        "SELECT COUNT(*) FROM games
         WHERE json_array_length(platforms) > 0 AND json_array_length(genres) > 0",
        [],
        |r| r.get(0),
    )?;
    let imported_games: i64 = conn.query_row(
        "SELECT COUNT(*) FROM games WHERE provenance_kind = 'external_import'",
        [],
        |r| r.get(0),
    )?;
    let api_keys: i64 = conn.query_row("SELECT COUNT(*) FROM api_keys", [], |r| r.get(0))?;
    let last_import: Option<String> = conn.query_row(
        "SELECT MAX(imported_at) FROM import_log",
        [],
        |r| r.get(0),
    )?;

    Ok(CatalogStats {
        games,
        complete_games,
        imported_games,
        api_keys,
        last_import,
    })
}

/// Summary statistics for the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub games: i64,
    pub complete_games: i64,
    pub imported_games: i64,
    pub api_keys: i64,
    pub last_import: Option<String>,
}

// ── API Keys ────────────────────────────────────────────────────────────────

/// List all API keys, oldest first.
pub fn list_api_keys(conn: &Connection) -> Result<Vec<ApiKey>, OperationError> {
    let sql = format!("SELECT {API_KEY_COLUMNS} FROM api_keys ORDER BY created_at, key");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_api_key)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Import Log ──────────────────────────────────────────────────────────────

/// List the most recent import runs, newest first.
pub fn list_import_logs(conn: &Connection, limit: u32) -> Result<Vec<ImportLog>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, source, imported_at, records_added, records_updated, records_failed
         FROM import_log ORDER BY imported_at DESC, id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| {
        Ok(ImportLog {
            id: row.get(0)?,
            source: row.get(1)?,
            imported_at: row.get(2)?,
            records_added: row.get(3)?,
            records_updated: row.get(4)?,
            records_failed: row.get(5)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}
