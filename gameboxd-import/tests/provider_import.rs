use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

use gameboxd_catalog::types::*;
use gameboxd_db::{CatalogStats, CatalogStore, GamePage, GameQuery, SqliteStore, StoreError};
use gameboxd_import::*;
use gameboxd_scraper::{MetadataFetcher, ScrapeError};
use serde_json::json;

/// Canned provider: pages of summaries and a detail per id.
#[derive(Default)]
struct FakeFetcher {
    pages: HashMap<u32, Vec<RawRecord>>,
    details: HashMap<i64, RawRecord>,
    failing_pages: HashSet<u32>,
    detail_calls: RefCell<Vec<i64>>,
}

impl FakeFetcher {
    fn page(mut self, page: u32, records: Vec<serde_json::Value>) -> Self {
        let records = records
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect();
        self.pages.insert(page, records);
        self
    }

    fn detail(mut self, id: i64, record: serde_json::Value) -> Self {
        self.details.insert(id, serde_json::from_value(record).unwrap());
        self
    }

    fn failing(mut self, page: u32) -> Self {
        self.failing_pages.insert(page);
        self
    }
}

impl MetadataFetcher for FakeFetcher {
    fn source_label(&self) -> &str {
        "Fake API"
    }

    async fn fetch_page(&self, page: u32, _page_size: u32) -> Result<Vec<RawRecord>, ScrapeError> {
        if self.failing_pages.contains(&page) {
            return Err(ScrapeError::ServerError {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        Ok(self.pages.get(&page).cloned().unwrap_or_default())
    }

    async fn fetch_by_id(&self, external_id: i64) -> Result<RawRecord, ScrapeError> {
        self.detail_calls.borrow_mut().push(external_id);
        self.details
            .get(&external_id)
            .cloned()
            .ok_or(ScrapeError::NotFound)
    }
}

fn request(first_page: u32, page_count: u32) -> ProviderImportRequest {
    ProviderImportRequest {
        first_page,
        page_count,
        page_size: 10,
        ..ProviderImportRequest::default()
    }
}

#[tokio::test]
async fn imports_pages_with_details() {
    let fetcher = FakeFetcher::default()
        .page(1, vec![json!({"name": "Portal", "externalId": 1, "images": [{"url": "https://i.example/p.png"}]})])
        .detail(1, json!({"name": "Portal", "externalId": 1, "publisher": "Valve", "platforms": ["PC"]}));
    let store = Arc::new(SqliteStore::memory().unwrap());

    let report = import_provider_pages(&fetcher, store.clone(), &request(1, 1), None).await;
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.records_fetched, 1);
    assert_eq!(report.result.added_count, 1);

    let game = store.find_by_external_id(1).unwrap().unwrap();
    assert_eq!(game.slug, "portal");
    assert_eq!(game.publisher, "Valve");
    // Screenshots come from the listing, not the detail.
    assert_eq!(game.images.len(), 1);
    assert_eq!(game.added_by, Provenance::ExternalImport("Fake API".to_string()));
}

#[tokio::test]
async fn failed_page_is_one_error_and_others_continue() {
    let fetcher = FakeFetcher::default()
        .failing(1)
        .page(2, vec![json!({"name": "Braid"})]);
    let store = Arc::new(SqliteStore::memory().unwrap());

    let report = import_provider_pages(&fetcher, store.clone(), &request(1, 2), None).await;
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.result.added_count, 1);
    assert_eq!(report.result.error_count, 1);
    assert_eq!(report.result.errors[0].identifier, "page 1");
    assert!(!report.nothing_fetched());
}

#[tokio::test]
async fn nothing_fetched_when_every_page_fails() {
    let fetcher = FakeFetcher::default().failing(1);
    let store = Arc::new(SqliteStore::memory().unwrap());

    let report = import_provider_pages(&fetcher, store.clone(), &request(1, 1), None).await;
    assert!(report.nothing_fetched());
    assert_eq!(report.result.error_count, 1);
}

#[tokio::test]
async fn detail_failure_is_item_error() {
    let fetcher = FakeFetcher::default()
        .page(1, vec![json!({"name": "Ghost", "externalId": 99}), json!({"name": "Inside", "externalId": 2})])
        .detail(2, json!({"name": "Inside", "externalId": 2}));
    let store = Arc::new(SqliteStore::memory().unwrap());

    let report = import_provider_pages(&fetcher, store.clone(), &request(1, 1), None).await;
    assert_eq!(report.result.added_count, 1);
    assert_eq!(report.result.error_count, 1);
    assert_eq!(report.result.errors[0].identifier, "Ghost");
    assert_eq!(fetcher.detail_calls.borrow().len(), 2);
}

#[tokio::test]
async fn summaries_without_name_or_id_are_rejected() {
    let fetcher = FakeFetcher::default().page(
        1,
        vec![json!({"publisher": "Nobody"}), json!({"name": "Limbo"})],
    );
    let store = Arc::new(SqliteStore::memory().unwrap());

    let report = import_provider_pages(&fetcher, store.clone(), &request(1, 1), None).await;
    assert_eq!(report.result.added_count, 1);
    assert_eq!(report.result.error_count, 1);
    assert_eq!(report.result.errors[0].identifier, "#1");
    // Summaries without an id are used as-is, with no detail request.
    assert!(fetcher.detail_calls.borrow().is_empty());
}

#[tokio::test]
async fn dedupes_by_external_id_and_reslugs_on_rename() {
    let store = Arc::new(SqliteStore::memory().unwrap());
    let mut existing = GameRecord::new("working-title", "Working Title", Provenance::BatchUpload);
    existing.external_id = Some(42);
    store.insert(&existing).unwrap();

    let fetcher = FakeFetcher::default()
        .page(1, vec![json!({"name": "Final Title", "externalId": 42})])
        .detail(42, json!({"name": "Final Title", "externalId": 42}));

    let report = import_provider_pages(&fetcher, store.clone(), &request(1, 1), None).await;
    assert_eq!(report.result.updated_count, 1);
    assert_eq!(report.result.added_count, 0);
    assert!(store.find_by_slug("working-title").unwrap().is_none());

    let game = store.find_by_slug("final-title").unwrap().unwrap();
    assert_eq!(game.external_id, Some(42));
    assert_eq!(game.added_by, Provenance::BatchUpload);
    assert_eq!(store.count().unwrap(), 1);
}

#[tokio::test]
async fn falls_back_to_slug_and_records_run() {
    let store = Arc::new(SqliteStore::memory().unwrap());
    store
        .insert(&GameRecord::new("celeste", "Celeste", Provenance::JsonUpload))
        .unwrap();

    let fetcher = FakeFetcher::default()
        .page(1, vec![json!({"name": "Celeste", "externalId": 7})])
        .detail(7, json!({"name": "Celeste", "externalId": 7, "genres": ["Platformer"]}));

    let req = ProviderImportRequest {
        source_label: Some("RAWG API (Top Rated)".to_string()),
        ..request(1, 1)
    };
    let report = import_provider_pages(&fetcher, store.clone(), &req, Some(&SilentProgress)).await;
    assert_eq!(report.result.updated_count, 1);

    let game = store.find_by_slug("celeste").unwrap().unwrap();
    assert_eq!(game.external_id, Some(7));

    let logs = store.import_logs(1).unwrap();
    assert_eq!(logs[0].source, "RAWG API (Top Rated)");
    assert_eq!(logs[0].records_updated, 1);
}

#[tokio::test]
async fn concurrency_of_one_still_fetches_everything() {
    let records = (1..=12)
        .map(|i| json!({"name": format!("Game {i}"), "externalId": i}))
        .collect();
    let mut fetcher = FakeFetcher::default().page(1, records);
    for i in 1..=12 {
        fetcher = fetcher.detail(i, json!({"name": format!("Game {i}"), "externalId": i}));
    }
    let store = Arc::new(SqliteStore::memory().unwrap());

    let req = ProviderImportRequest {
        detail_concurrency: 1,
        ..request(1, 1)
    };
    let report = import_provider_pages(&fetcher, store.clone(), &req, None).await;
    assert_eq!(report.result.added_count, 12);
    // Writes follow listing order.
    assert_eq!(report.result.written[0].slug, "game-1");
    assert_eq!(report.result.written[11].slug, "game-12");
}

/// Catalog store that notes which thread each write ran on.
struct ThreadRecordingStore {
    inner: SqliteStore,
    write_threads: Mutex<Vec<ThreadId>>,
}

impl ThreadRecordingStore {
    fn note(&self) {
        self.write_threads.lock().unwrap().push(thread::current().id());
    }
}

impl CatalogStore for ThreadRecordingStore {
    fn find_by_slug(&self, slug: &str) -> Result<Option<GameRecord>, StoreError> {
        self.inner.find_by_slug(slug)
    }

    fn find_by_external_id(&self, external_id: i64) -> Result<Option<GameRecord>, StoreError> {
        self.inner.find_by_external_id(external_id)
    }

    fn insert(&self, game: &GameRecord) -> Result<GameRecord, StoreError> {
        self.note();
        self.inner.insert(game)
    }

    fn update(&self, slug: &str, game: &GameRecord) -> Result<GameRecord, StoreError> {
        self.note();
        self.inner.update(slug, game)
    }

    fn delete(&self, slug: &str) -> Result<(), StoreError> {
        self.inner.delete(slug)
    }

    fn list(&self, query: &GameQuery) -> Result<GamePage, StoreError> {
        self.inner.list(query)
    }

    fn count(&self) -> Result<u64, StoreError> {
        self.inner.count()
    }

    fn stats(&self) -> Result<CatalogStats, StoreError> {
        self.inner.stats()
    }

    fn record_import(&self, log: &ImportLog) -> Result<i64, StoreError> {
        self.note();
        self.inner.record_import(log)
    }

    fn import_logs(&self, limit: u32) -> Result<Vec<ImportLog>, StoreError> {
        self.inner.import_logs(limit)
    }
}

#[tokio::test]
async fn writes_run_off_the_async_thread() {
    let fetcher = FakeFetcher::default()
        .page(1, vec![json!({"name": "Braid"}), json!({"name": "Fez"})]);
    let store = Arc::new(ThreadRecordingStore {
        inner: SqliteStore::memory().unwrap(),
        write_threads: Mutex::new(Vec::new()),
    });

    let report = import_provider_pages(&fetcher, store.clone(), &request(1, 1), None).await;
    assert_eq!(report.result.added_count, 2);

    let threads = store.write_threads.lock().unwrap();
    // Two inserts plus the import log entry.
    assert_eq!(threads.len(), 3);
    assert!(threads.iter().all(|id| *id != thread::current().id()));
}
