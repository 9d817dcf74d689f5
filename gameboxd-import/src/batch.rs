//! Batch import: reconcile a sequence of untrusted records against the catalog.
//!
//! Each record is validated, slugged, and upserted on its own. A record that
//! fails for any reason is recorded in the result and the batch continues;
//! only input that is not a batch at all fails the whole call.

use gameboxd_catalog::json::{self, BatchError};
use gameboxd_catalog::types::*;
use gameboxd_db::{CatalogStore, StoreError};
use gameboxd_scraper::ScrapeError;
use serde_json::Value;
use thiserror::Error;

use crate::merge::{self, Validated};
use crate::progress::ImportProgress;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid batch: {0}")]
    Batch(#[from] BatchError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Provider error: {0}")]
    Provider(#[from] ScrapeError),
}

/// Import already-split batch elements.
///
/// Elements are processed sequentially in input order, so a later element
/// with the same slug as an earlier one updates it.
pub fn import_batch(
    store: &dyn CatalogStore,
    records: Vec<Value>,
    provenance: &Provenance,
    progress: Option<&dyn ImportProgress>,
) -> ImportBatchResult {
    let total = records.len();
    let mut result = ImportBatchResult::default();

    if let Some(p) = progress {
        p.on_phase(&format!("Importing {total} records ({provenance})"));
    }

    for (i, value) in records.into_iter().enumerate() {
        let index = i + 1;
        let raw: RawRecord = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                result.record_error(format!("#{index}"), format!("not a game record: {e}"));
                continue;
            }
        };

        let identifier = raw.identifier(index);
        match upsert_record(store, raw, provenance) {
            Ok((game, outcome)) => {
                if let Some(p) = progress {
                    p.on_game(index, total, &game.name);
                }
                result.record_write(&game, outcome);
            }
            Err(message) => {
                log::debug!("skipping {identifier}: {message}");
                result.record_error(identifier, message);
            }
        }
    }

    record_run(store, provenance.label(), &result);
    if let Some(p) = progress {
        p.on_complete(&result.summary());
    }
    result
}

/// Import a decoded JSON document, which must be an array of records.
pub fn import_json_value(
    store: &dyn CatalogStore,
    value: Value,
    provenance: &Provenance,
    progress: Option<&dyn ImportProgress>,
) -> Result<ImportBatchResult, ImportError> {
    let records = json::batch_from_value(value)?;
    Ok(import_batch(store, records, provenance, progress))
}

/// Import JSON text, which must be an array of records.
pub fn import_json_str(
    store: &dyn CatalogStore,
    text: &str,
    provenance: &Provenance,
    progress: Option<&dyn ImportProgress>,
) -> Result<ImportBatchResult, ImportError> {
    let records = json::parse_batch(text)?;
    Ok(import_batch(store, records, provenance, progress))
}

/// Validate one record and insert or update it.
///
/// Errors are returned as the message to record against the item.
pub(crate) fn upsert_record(
    store: &dyn CatalogStore,
    raw: RawRecord,
    provenance: &Provenance,
) -> Result<(GameRecord, WriteOutcome), String> {
    let valid = merge::validate(&raw)?;

    match find_existing(store, &raw, &valid).map_err(|e| e.to_string())? {
        Some(existing) => update(store, existing, raw, valid),
        None => {
            let game = merge::build_insert(raw.clone(), valid.clone(), provenance);
            match store.insert(&game) {
                Ok(stored) => Ok((stored, WriteOutcome::Added)),
                Err(e) if e.is_conflict() => {
                    // A row took the slug or external id after the lookup.
                    let existing = find_existing(store, &raw, &valid)
                        .map_err(|e| e.to_string())?
                        .ok_or_else(|| e.to_string())?;
                    update(store, existing, raw, valid)
                }
                Err(e) => Err(e.to_string()),
            }
        }
    }
}

fn update(
    store: &dyn CatalogStore,
    existing: GameRecord,
    raw: RawRecord,
    valid: Validated,
) -> Result<(GameRecord, WriteOutcome), String> {
    let key = existing.slug.clone();
    let merged = merge::merge_into(existing, raw, valid);
    store
        .update(&key, &merged)
        .map(|stored| (stored, WriteOutcome::Updated))
        .map_err(|e| e.to_string())
}

/// Provider id is the more reliable key; the derived slug is the fallback.
fn find_existing(
    store: &dyn CatalogStore,
    raw: &RawRecord,
    valid: &Validated,
) -> Result<Option<GameRecord>, StoreError> {
    if let Some(id) = raw.external_id {
        if let Some(found) = store.find_by_external_id(id)? {
            return Ok(Some(found));
        }
    }
    store.find_by_slug(&valid.slug)
}

/// Append an import log entry. A failure here never fails the import.
pub(crate) fn record_run(store: &dyn CatalogStore, source: &str, result: &ImportBatchResult) {
    let log = ImportLog {
        id: 0,
        source: source.to_string(),
        imported_at: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        records_added: result.added_count as i64,
        records_updated: result.updated_count as i64,
        records_failed: result.error_count as i64,
    };
    if let Err(e) = store.record_import(&log) {
        log::warn!("Failed to record import run for {source}: {e}");
    }
}
