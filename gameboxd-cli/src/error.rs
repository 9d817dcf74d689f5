use gameboxd_db::StoreError;
use gameboxd_import::ImportError;
use gameboxd_lib::SettingsError;
use gameboxd_scraper::ScrapeError;
use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Database error: {0}")]
    Store(#[from] StoreError),

    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    #[error("RAWG error: {0}")]
    Scrape(#[from] ScrapeError),

    /// Runtime creation or async error
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl CliError {
    pub(crate) fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }
}
