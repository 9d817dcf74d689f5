use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use gameboxd_lib::Settings;

use crate::CliError;

pub(crate) fn run_stats(settings: &Settings, recent: u32) -> Result<(), CliError> {
    let stores = super::open(settings)?;
    let stats = stores.catalog.stats()?;

    log::info!(
        "{}",
        "Catalog Statistics".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Database: {}", settings.database.resolved_path().display());
    crate::log_blank();
    log::info!("  Games:          {:>8}", stats.games);
    log::info!("  Complete:       {:>8}", stats.complete_games);
    log::info!("  Imported:       {:>8}", stats.imported_games);
    log::info!("  API keys:       {:>8}", stats.api_keys);
    log::info!(
        "  Last import:    {}",
        stats.last_import.as_deref().unwrap_or("never"),
    );

    if recent == 0 {
        return Ok(());
    }
    let logs = stores.catalog.import_logs(recent)?;
    if logs.is_empty() {
        return Ok(());
    }

    crate::log_blank();
    log::info!("{}", "Recent imports".if_supports_color(Stdout, |t| t.bold()));
    for entry in &logs {
        log::info!(
            "  {}  {:<24} +{} ~{} !{}",
            entry.imported_at,
            entry.source.if_supports_color(Stdout, |t| t.cyan()),
            entry.records_added,
            entry.records_updated,
            entry.records_failed,
        );
    }
    Ok(())
}
