//! Client for the RAWG game-metadata API.
//!
//! Fetches paginated top-rated game summaries and per-game details, and maps
//! both onto the catalog's untrusted [`RawRecord`](gameboxd_catalog::RawRecord)
//! input shape.

pub mod client;
pub mod credentials;
pub mod error;
pub mod fetcher;
pub mod map;
pub mod types;

pub use client::{RawgClient, DEFAULT_BASE_URL, TOP_RATED_SOURCE};
pub use credentials::{config_path, credential_source, CredentialSource, Credentials};
pub use error::ScrapeError;
pub use fetcher::MetadataFetcher;
