//! gameboxd CLI
//!
//! Runs the catalog server and the offline maintenance tasks around it:
//! file and provider imports, API key administration, and statistics.

mod cli_types;
mod commands;
mod error;

use std::io::Write;

use clap::Parser;

use gameboxd_lib::Settings;

use cli_types::{Cli, Commands, ConfigAction, KeysAction};
pub(crate) use error::CliError;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let result = load_settings(&cli).and_then(|settings| run(cli, settings));
    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, settings: Settings) -> Result<(), CliError> {
    match cli.command {
        Commands::Serve { host, port } => commands::serve::run_serve(settings, host, port),
        Commands::Import { file, tag } => commands::import::run_import(&settings, &file, tag),
        Commands::ImportPopular {
            page,
            page_size,
            pages,
            concurrency,
        } => commands::import::run_import_popular(&settings, page, page_size, pages, concurrency),
        Commands::Keys { action } => match action {
            KeysAction::Generate {
                description,
                unlimited,
                monthly_limit,
            } => commands::keys::run_keys_generate(&settings, &description, unlimited, monthly_limit),
            KeysAction::List => commands::keys::run_keys_list(&settings),
            KeysAction::ResetUsage => commands::keys::run_keys_reset(&settings),
        },
        Commands::Stats { recent } => commands::stats::run_stats(&settings, recent),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(&settings),
            ConfigAction::Path => commands::config::run_config_path(cli.config.as_deref()),
        },
    }
}

/// Settings from file and environment, then command-line overrides.
fn load_settings(cli: &Cli) -> Result<Settings, CliError> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(db) = &cli.db {
        settings.database.path = Some(db.clone());
    }
    Ok(settings)
}

/// Plain messages by default; timestamps and levels in verbose mode.
/// `RUST_LOG` overrides the chosen level.
fn init_logging(quiet: bool, verbose: bool) {
    let level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    if !verbose {
        builder.format(|buf, record| match record.level() {
            log::Level::Error | log::Level::Warn => {
                writeln!(buf, "{}: {}", record.level(), record.args())
            }
            _ => writeln!(buf, "{}", record.args()),
        });
    }
    builder.init();
}

/// Emit an empty line through the logger.
pub(crate) fn log_blank() {
    log::info!("");
}
