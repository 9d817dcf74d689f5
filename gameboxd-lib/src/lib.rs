//! Shared application services: settings, store wiring, API key usage
//! accounting, and request rate limiting.

pub mod error;
pub mod rate_limit;
pub mod settings;
pub mod stores;
pub mod usage;

pub use error::SettingsError;
pub use rate_limit::{FixedWindowLimiter, RateLimited};
pub use settings::{Backend, DatabaseSettings, ImportSettings, RateLimitSettings, ServerSettings, Settings};
pub use stores::{open_stores, Stores};
pub use usage::{
    check_and_increment, generate_key, list_keys, new_key_string, reset_monthly_usage, UsageDenial,
    UsageGrant, KEY_LENGTH, KEY_PREFIX,
};
