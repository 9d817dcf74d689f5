use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use gameboxd_lib::{generate_key, list_keys, reset_monthly_usage, usage::redact, Settings};

use crate::CliError;

pub(crate) fn run_keys_generate(
    settings: &Settings,
    description: &str,
    unlimited: bool,
    monthly_limit: i64,
) -> Result<(), CliError> {
    let stores = super::open(settings)?;
    let key = generate_key(stores.keys.as_ref(), description, unlimited, monthly_limit)?;

    log::info!(
        "{} Issued API key",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
    );
    // The full key is shown once, on stdout, so it can be captured.
    println!("{}", key.key);
    Ok(())
}

pub(crate) fn run_keys_list(settings: &Settings) -> Result<(), CliError> {
    let stores = super::open(settings)?;
    let keys = list_keys(stores.keys.as_ref())?;

    if keys.is_empty() {
        log::info!("No API keys issued.");
        log::info!("Run 'gameboxd keys generate' to create one.");
        return Ok(());
    }

    log::info!(
        "{}",
        format!("{} API key(s)", keys.len()).if_supports_color(Stdout, |t| t.bold()),
    );
    for key in &keys {
        let usage = if key.is_unlimited {
            format!("{} (unlimited)", key.current_month_usage)
        } else {
            format!("{}/{}", key.current_month_usage, key.monthly_limit)
        };
        let usage = if key.quota_exhausted() {
            usage.if_supports_color(Stdout, |t| t.red()).to_string()
        } else {
            usage
        };
        log::info!(
            "  {:<12} {:>16}  last used {}  {}",
            redact(&key.key).if_supports_color(Stdout, |t| t.cyan()),
            usage,
            key.last_used_at.as_deref().unwrap_or("never"),
            key.description,
        );
    }
    Ok(())
}

pub(crate) fn run_keys_reset(settings: &Settings) -> Result<(), CliError> {
    let stores = super::open(settings)?;
    let reset = reset_monthly_usage(stores.keys.as_ref())?;
    log::info!("Reset monthly usage on {reset} key(s)");
    Ok(())
}
