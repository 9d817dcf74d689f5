use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use gameboxd_catalog::json::load_batch_file;
use gameboxd_catalog::types::{ImportBatchResult, Provenance};
use gameboxd_import::{
    import_batch, import_provider_pages, ImportError, LogProgress, ProviderImportRequest,
};
use gameboxd_lib::Settings;
use gameboxd_scraper::{Credentials, RawgClient};

use crate::CliError;

/// Import a JSON array of games from `file`.
pub(crate) fn run_import(
    settings: &Settings,
    file: &Path,
    tag: Option<String>,
) -> Result<(), CliError> {
    let records = load_batch_file(file).map_err(ImportError::from)?;
    let provenance = tag
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(Provenance::from_label)
        .unwrap_or(Provenance::JsonUpload);

    let stores = super::open(settings)?;
    log::info!(
        "{}",
        format!("Importing {} records from {}", records.len(), file.display())
            .if_supports_color(Stdout, |t| t.bold()),
    );

    let result = import_batch(stores.catalog.as_ref(), records, &provenance, Some(&LogProgress));
    print_result(&result);
    Ok(())
}

/// Import top-rated pages from RAWG.
pub(crate) fn run_import_popular(
    settings: &Settings,
    page: u32,
    page_size: u32,
    pages: u32,
    concurrency: Option<usize>,
) -> Result<(), CliError> {
    let client = RawgClient::new(Credentials::load()?)?;
    let stores = super::open(settings)?;

    let request = ProviderImportRequest {
        first_page: page,
        page_count: pages,
        page_size,
        source_label: None,
        detail_concurrency: concurrency.unwrap_or(settings.import.detail_concurrency),
    };

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {e}")))?;
    let report = rt.block_on(import_provider_pages(
        &client,
        stores.catalog.clone(),
        &request,
        Some(&LogProgress),
    ));

    log::info!(
        "Fetched {} of {} page(s), {} games listed",
        report.pages_fetched,
        pages.max(1),
        report.records_fetched,
    );
    print_result(&report.result);

    if report.nothing_fetched() {
        return Err(CliError::runtime("no pages could be fetched from RAWG"));
    }
    Ok(())
}

fn print_result(result: &ImportBatchResult) {
    crate::log_blank();
    log::info!(
        "  {} {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        result.summary(),
    );
    for error in &result.errors {
        log::warn!(
            "  {} {}: {}",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            error.identifier,
            error.message,
        );
    }
}
