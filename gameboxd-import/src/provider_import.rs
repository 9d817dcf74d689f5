//! Import pages of records from an external metadata provider.
//!
//! Three phases per page:
//! 1. fetch the page of summaries,
//! 2. fetch full details for summaries that carry a provider id, a few at a
//!    time and each under its own timeout,
//! 3. reconcile the merged records against the catalog one by one, on the
//!    blocking pool since store calls may hit disk.
//!
//! Provider failures are item errors like any other; a failed page is one
//! error and the remaining pages still run.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use gameboxd_catalog::types::*;
use gameboxd_db::CatalogStore;
use gameboxd_scraper::{MetadataFetcher, ScrapeError};
use tokio::time::Duration;

use crate::batch::{record_run, upsert_record};
use crate::merge;
use crate::progress::ImportProgress;

/// Detail requests in flight at once.
pub const DETAIL_CONCURRENCY: usize = 5;

/// Per-request timeout around every provider call.
pub const ITEM_TIMEOUT: Duration = Duration::from_secs(30);

/// What to fetch from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderImportRequest {
    /// 1-based page to start from.
    pub first_page: u32,
    pub page_count: u32,
    pub page_size: u32,
    /// Provenance label; defaults to the fetcher's own label.
    pub source_label: Option<String>,
    pub detail_concurrency: usize,
}

impl Default for ProviderImportRequest {
    fn default() -> Self {
        Self {
            first_page: 1,
            page_count: 1,
            page_size: 20,
            source_label: None,
            detail_concurrency: DETAIL_CONCURRENCY,
        }
    }
}

/// Outcome of a provider import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderImportReport {
    pub result: ImportBatchResult,
    /// Pages that were fetched successfully.
    pub pages_fetched: u32,
    /// Summaries received across all fetched pages.
    pub records_fetched: usize,
}

impl ProviderImportReport {
    /// True when not a single page could be fetched.
    pub fn nothing_fetched(&self) -> bool {
        self.pages_fetched == 0
    }
}

/// Fetch `request.page_count` pages starting at `request.first_page` and
/// reconcile every record, deduping by provider id before slug.
pub async fn import_provider_pages<F: MetadataFetcher>(
    fetcher: &F,
    store: Arc<dyn CatalogStore>,
    request: &ProviderImportRequest,
    progress: Option<&dyn ImportProgress>,
) -> ProviderImportReport {
    let source = request
        .source_label
        .clone()
        .unwrap_or_else(|| fetcher.source_label().to_string());
    let provenance = Provenance::ExternalImport(source.clone());
    let concurrency = request.detail_concurrency.max(1);
    let mut report = ProviderImportReport::default();

    let first = request.first_page.max(1);
    let last = first.saturating_add(request.page_count.max(1) - 1);

    for page in first..=last {
        if let Some(p) = progress {
            p.on_phase(&format!("Fetching page {page} from {source}"));
        }

        // ── Phase 1: page of summaries ──────────────────────────────
        let summaries = match with_timeout(fetcher.fetch_page(page, request.page_size)).await {
            Ok(summaries) => summaries,
            Err(e) => {
                log::warn!("page {page} failed: {e}");
                report.result.record_error(format!("page {page}"), e.to_string());
                continue;
            }
        };
        report.pages_fetched += 1;
        let offset = report.records_fetched;
        report.records_fetched += summaries.len();

        // ── Phase 2: details, a few at a time ───────────────────────
        let mut ready: Vec<(usize, RawRecord)> = Vec::with_capacity(summaries.len());
        let mut to_detail = Vec::new();
        for (i, summary) in summaries.into_iter().enumerate() {
            let index = offset + i + 1;
            match summary.external_id {
                Some(id) => to_detail.push((index, id, summary)),
                None if summary.trimmed_name().is_none() => {
                    report.result.record_error(
                        format!("#{index}"),
                        "record has neither a name nor an external id",
                    );
                }
                None => ready.push((index, summary)),
            }
        }

        let details: Vec<_> = stream::iter(to_detail)
            .map(|(index, id, summary)| async move {
                let detail = with_timeout(fetcher.fetch_by_id(id)).await;
                (index, summary, detail)
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        for (index, summary, detail) in details {
            match detail {
                Ok(detail) => ready.push((index, merge::overlay(summary, detail))),
                Err(e) => {
                    log::debug!("detail fetch for {} failed: {e}", summary.identifier(index));
                    report
                        .result
                        .record_error(summary.identifier(index), e.to_string());
                }
            }
        }

        // ── Phase 3: sequential writes, in listing order ────────────
        ready.sort_by_key(|(index, _)| *index);
        let total = ready.len();
        let written = match write_page(&store, ready, &provenance).await {
            Ok(written) => written,
            Err(e) => {
                log::warn!("writes for page {page} aborted: {e}");
                report.result.record_error(format!("page {page}"), e.to_string());
                continue;
            }
        };
        for (n, (identifier, outcome)) in written.into_iter().enumerate() {
            match outcome {
                Ok((game, outcome)) => {
                    if let Some(p) = progress {
                        p.on_game(n + 1, total, &game.name);
                    }
                    report.result.record_write(&game, outcome);
                }
                Err(message) => report.result.record_error(identifier, message),
            }
        }
    }

    let run = report.result.clone();
    let log_store = Arc::clone(&store);
    if let Err(e) =
        tokio::task::spawn_blocking(move || record_run(log_store.as_ref(), &source, &run)).await
    {
        log::warn!("Failed to record import run: {e}");
    }
    if let Some(p) = progress {
        p.on_complete(&report.result.summary());
    }
    report
}

type PageWrites = Vec<(String, Result<(GameRecord, WriteOutcome), String>)>;

/// Upsert one page of records in order on the blocking pool.
async fn write_page(
    store: &Arc<dyn CatalogStore>,
    ready: Vec<(usize, RawRecord)>,
    provenance: &Provenance,
) -> Result<PageWrites, tokio::task::JoinError> {
    let store = Arc::clone(store);
    let provenance = provenance.clone();
    tokio::task::spawn_blocking(move || {
        ready
            .into_iter()
            .map(|(index, raw)| {
                let identifier = raw.identifier(index);
                (identifier, upsert_record(store.as_ref(), raw, &provenance))
            })
            .collect()
    })
    .await
}

async fn with_timeout<T>(
    fut: impl Future<Output = Result<T, ScrapeError>>,
) -> Result<T, ScrapeError> {
    match tokio::time::timeout(ITEM_TIMEOUT, fut).await {
        Ok(result) => result,
        Err(_) => Err(ScrapeError::Timeout(ITEM_TIMEOUT.as_secs())),
    }
}
