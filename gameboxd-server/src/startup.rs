use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};

use crate::routes;
use crate::state::AppState;

/// A bound, not yet running HTTP server. Used by `main` and by tests.
pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    /// Bind `host:port`. Port 0 picks a free port.
    pub fn build(host: &str, port: u16, state: AppState) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind((host, port))?;
        let port = listener.local_addr()?.port();
        log::info!("Listening on http://{host}:{port}");

        let server = run_server(listener, state)?;
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run_server(listener: TcpListener, state: AppState) -> Result<Server, std::io::Error> {
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .listen(listener)?
    .run();
    Ok(server)
}
