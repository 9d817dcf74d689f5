//! API key issuance and per-request usage accounting.
//!
//! Every metered request calls [`check_and_increment`]. Limited keys are
//! charged through the store's conditional increment, so concurrent requests
//! cannot push a key past its monthly limit.

use gameboxd_catalog::types::ApiKey;
use gameboxd_db::{ApiKeyStore, StoreError};
use rand::Rng;
use thiserror::Error;

/// Prefix on every generated key.
pub const KEY_PREFIX: &str = "gbx_";

/// Random characters after the prefix.
pub const KEY_LENGTH: usize = 32;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// A request that may proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageGrant {
    pub key: String,
    pub is_unlimited: bool,
    /// Requests left this month; `None` for unlimited keys.
    pub remaining: Option<i64>,
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UsageDenial {
    #[error("API key is required")]
    Missing,
    #[error("Invalid API key")]
    Invalid,
    #[error("Monthly API limit reached")]
    QuotaExceeded,
}

impl UsageDenial {
    /// HTTP status to answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Missing | Self::Invalid => 401,
            Self::QuotaExceeded => 429,
        }
    }
}

/// Validate `key` and charge one request against its quota.
///
/// Unlimited keys are never charged. If the charge itself fails to write,
/// the request is still allowed and the miss is logged.
pub fn check_and_increment(
    store: &dyn ApiKeyStore,
    key: Option<&str>,
) -> Result<UsageGrant, UsageDenial> {
    let key = key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(UsageDenial::Missing)?;

    let record = match store.find_by_key(key) {
        Ok(Some(record)) => record,
        Ok(None) => return Err(UsageDenial::Invalid),
        Err(e) => {
            log::warn!("API key lookup failed: {e}");
            return Err(UsageDenial::Invalid);
        }
    };

    if record.is_unlimited {
        return Ok(UsageGrant {
            key: record.key,
            is_unlimited: true,
            remaining: None,
        });
    }

    if record.quota_exhausted() {
        return Err(UsageDenial::QuotaExceeded);
    }

    match store.consume_quota(key) {
        Ok(true) => Ok(UsageGrant {
            remaining: Some(record.monthly_limit - record.current_month_usage - 1),
            key: record.key,
            is_unlimited: false,
        }),
        // Another request took the last unit between the read and the charge.
        Ok(false) => Err(UsageDenial::QuotaExceeded),
        Err(e) => {
            log::warn!("Failed to record usage for API key {}: {e}", redact(key));
            Ok(UsageGrant {
                remaining: Some(record.monthly_limit - record.current_month_usage),
                key: record.key,
                is_unlimited: false,
            })
        }
    }
}

/// A fresh random key string: [`KEY_PREFIX`] followed by [`KEY_LENGTH`] alphanumerics.
pub fn new_key_string() -> String {
    let mut rng = rand::thread_rng();
    let random: String = (0..KEY_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect();
    format!("{KEY_PREFIX}{random}")
}

/// Issue and persist a new key with zero usage.
///
/// A collision with an existing key surfaces as the store's conflict error.
/// A negative limit is stored as zero.
pub fn generate_key(
    store: &dyn ApiKeyStore,
    description: &str,
    is_unlimited: bool,
    monthly_limit: i64,
) -> Result<ApiKey, StoreError> {
    let key = ApiKey {
        key: new_key_string(),
        description: description.trim().to_string(),
        is_unlimited,
        monthly_limit: monthly_limit.max(0),
        current_month_usage: 0,
        last_used_at: None,
        created_at: None,
    };
    let stored = store.insert_key(&key)?;
    log::info!(
        "Issued API key {} ({})",
        redact(&stored.key),
        if is_unlimited {
            "unlimited".to_string()
        } else {
            format!("{} requests/month", stored.monthly_limit)
        }
    );
    Ok(stored)
}

/// Zero every key's monthly usage. Run once at the start of each month.
pub fn reset_monthly_usage(store: &dyn ApiKeyStore) -> Result<usize, StoreError> {
    let reset = store.reset_usage()?;
    log::info!("Reset monthly usage on {reset} API keys");
    Ok(reset)
}

pub fn list_keys(store: &dyn ApiKeyStore) -> Result<Vec<ApiKey>, StoreError> {
    store.list_keys()
}

/// Shorten a key for logs: prefix plus the first few characters.
pub fn redact(key: &str) -> String {
    let visible: String = key.chars().take(KEY_PREFIX.len() + 4).collect();
    format!("{visible}…")
}
