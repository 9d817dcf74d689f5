//! HTTP surface for the catalog: admin import endpoints, API key issuance,
//! and metered catalog reads.

pub mod auth;
pub mod error;
pub mod routes;
pub mod startup;
pub mod state;

pub use error::ApiError;
pub use routes::configure;
pub use startup::{run_server, Application};
pub use state::AppState;
