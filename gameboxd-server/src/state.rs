use std::sync::Arc;
use std::time::Duration;

use gameboxd_lib::{FixedWindowLimiter, Settings, Stores};
use gameboxd_scraper::RawgClient;

/// Shared handler state. Cloned into every worker.
#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    /// Admin routes are open when unset.
    pub admin_token: Option<String>,
    pub limiter: Arc<FixedWindowLimiter>,
    /// Provider client for popular-game imports, if credentials were found.
    pub rawg: Option<Arc<RawgClient>>,
    pub detail_concurrency: usize,
}

impl AppState {
    pub fn new(stores: Stores, settings: &Settings) -> Self {
        let limits = &settings.rate_limit;
        Self {
            stores,
            admin_token: settings.admin_token().map(str::to_string),
            limiter: Arc::new(FixedWindowLimiter::new(
                limits.requests,
                Duration::from_secs(limits.window_secs.max(1)),
            )),
            rawg: None,
            detail_concurrency: settings.import.detail_concurrency.max(1),
        }
    }

    pub fn with_rawg(mut self, client: RawgClient) -> Self {
        self.rawg = Some(Arc::new(client));
        self
    }
}
