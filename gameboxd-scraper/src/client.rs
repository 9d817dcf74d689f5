use std::sync::Arc;

use gameboxd_catalog::types::RawRecord;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::credentials::Credentials;
use crate::error::ScrapeError;
use crate::fetcher::MetadataFetcher;
use crate::map;
use crate::types::{ApiErrorBody, GameDetail, GameListResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.rawg.io/api";
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(250);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Ranking used for popular-game imports.
const TOP_RATED_ORDERING: &str = "-rating";

/// Provenance label for records imported from the top-rated listing.
pub const TOP_RATED_SOURCE: &str = "RAWG API (Top Rated)";

/// RAWG rejects page sizes above this.
pub const MAX_PAGE_SIZE: u32 = 40;

/// HTTP client for the RAWG API with request spacing.
pub struct RawgClient {
    http: reqwest::Client,
    creds: Credentials,
    base_url: String,
    min_interval: Duration,
    last_request: Arc<Mutex<Instant>>,
}

impl RawgClient {
    pub fn new(creds: Credentials) -> Result<Self, ScrapeError> {
        Self::with_base_url(creds, DEFAULT_BASE_URL)
    }

    /// Point the client at another host (a mirror, or a mock server in tests).
    pub fn with_base_url(creds: Credentials, base_url: &str) -> Result<Self, ScrapeError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("gameboxd/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            creds,
            base_url: base_url.trim_end_matches('/').to_string(),
            min_interval: MIN_REQUEST_INTERVAL,
            last_request: Arc::new(Mutex::new(Instant::now() - MIN_REQUEST_INTERVAL)),
        })
    }

    /// Override the minimum spacing between API requests.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// List top-rated games, one page at a time.
    pub async fn top_rated(&self, page: u32, page_size: u32) -> Result<GameListResponse, ScrapeError> {
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self.get_json(
            "/games",
            &[
                ("page", page.max(1).to_string()),
                ("page_size", page_size.to_string()),
                ("ordering", TOP_RATED_ORDERING.to_string()),
            ],
        )
        .await
    }

    /// Fetch the full record for one game.
    pub async fn game_detail(&self, id: i64) -> Result<GameDetail, ScrapeError> {
        self.get_json(&format!("/games/{id}"), &[]).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ScrapeError> {
        self.rate_limit().await;

        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(&[("key", self.creds.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        log::debug!("GET {path} -> {status}");

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ScrapeError::InvalidCredentials(
                error_message(&text).unwrap_or_else(|| "API key rejected".to_string()),
            ));
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScrapeError::NotFound);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ScrapeError::RateLimit);
        }
        if !status.is_success() {
            return Err(ScrapeError::ServerError {
                status: status.as_u16(),
                message: error_message(&text).unwrap_or_else(|| truncate(&text).to_string()),
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            ScrapeError::Api(format!(
                "Failed to parse response: {e}. Response: {}",
                truncate(&text)
            ))
        })
    }

    /// Enforce rate limiting: wait until at least `min_interval` has
    /// passed since the last API request.
    async fn rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < self.min_interval {
            tokio::time::sleep(self.min_interval - elapsed).await;
        }
        *last = Instant::now();
    }
}

impl MetadataFetcher for RawgClient {
    fn source_label(&self) -> &str {
        TOP_RATED_SOURCE
    }

    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<Vec<RawRecord>, ScrapeError> {
        let list = self.top_rated(page, page_size).await?;
        log::debug!(
            "page {page}: {} of {} games (more: {})",
            list.results.len(),
            list.count,
            list.next.is_some()
        );
        Ok(list.results.iter().map(map::summary_to_raw).collect())
    }

    async fn fetch_by_id(&self, external_id: i64) -> Result<RawRecord, ScrapeError> {
        let detail = self.game_detail(external_id).await?;
        Ok(map::detail_to_raw(&detail))
    }
}

fn error_message(text: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(text)
        .ok()
        .and_then(|b| b.message().map(str::to_string))
}

fn truncate(text: &str) -> &str {
    match text.char_indices().nth(200) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
