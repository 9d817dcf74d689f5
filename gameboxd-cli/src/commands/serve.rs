use gameboxd_lib::{open_stores, Settings};
use gameboxd_scraper::{credential_source, Credentials, RawgClient};
use gameboxd_server::{AppState, Application};

use crate::CliError;

pub(crate) fn run_serve(
    mut settings: Settings,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), CliError> {
    if let Some(host) = host {
        settings.server.host = host;
    }
    if let Some(port) = port {
        settings.server.port = port;
    }

    let stores = open_stores(&settings.database)?;
    log::info!(
        "Serving {} games from the {:?} backend",
        stores.catalog.count()?,
        settings.database.backend,
    );
    let mut state = AppState::new(stores, &settings);

    match Credentials::load().and_then(RawgClient::new) {
        Ok(client) => {
            log::info!("RAWG imports enabled (key from {})", credential_source());
            state = state.with_rawg(client);
        }
        Err(e) => log::warn!("RAWG imports disabled: {e}"),
    }

    if settings.admin_token().is_none() {
        log::warn!("No admin token configured; admin routes are open to anyone");
    }

    actix_web::rt::System::new().block_on(async move {
        let app = Application::build(&settings.server.host, settings.server.port, state)?;
        app.run_until_stopped().await
    })?;
    Ok(())
}
