pub(crate) mod config;
pub(crate) mod import;
pub(crate) mod keys;
pub(crate) mod serve;
pub(crate) mod stats;

use gameboxd_lib::{open_stores, Backend, Settings, Stores};

use crate::CliError;

/// Open the configured stores, warning when nothing will persist.
pub(crate) fn open(settings: &Settings) -> Result<Stores, CliError> {
    if settings.database.backend == Backend::Memory {
        log::warn!("The memory backend keeps nothing after this command exits");
    }
    Ok(open_stores(&settings.database)?)
}
