use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use gameboxd_lib::settings::settings_path;
use gameboxd_lib::Settings;
use gameboxd_scraper::{config_path, credential_source, CredentialSource};

use crate::CliError;

/// Show effective settings and the RAWG credential source.
pub(crate) fn run_config_show(settings: &Settings) -> Result<(), CliError> {
    log::info!(
        "{}",
        "Gameboxd Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    match settings.to_toml_string() {
        Some(text) => {
            for line in text.lines() {
                if line.trim_start().starts_with("admin_token") {
                    log::info!("  admin_token = \"****\"");
                } else {
                    log::info!("  {line}");
                }
            }
        }
        None => log::warn!("Could not render settings"),
    }
    crate::log_blank();

    let source = credential_source();
    let shown = match &source {
        CredentialSource::Missing => source
            .to_string()
            .if_supports_color(Stdout, |t| t.red())
            .to_string(),
        _ => source
            .to_string()
            .if_supports_color(Stdout, |t| t.green())
            .to_string(),
    };
    log::info!("  RAWG API key: {shown}");
    if let Some(path) = config_path() {
        log::info!("  Credentials file: {}", path.display());
    }
    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_config_path(explicit: Option<&Path>) -> Result<(), CliError> {
    match explicit {
        Some(path) => println!("{}", path.display()),
        None => println!("{}", settings_path().display()),
    }
    Ok(())
}
