//! Request guards: admin bearer token, rate limiting, and API key metering.

use actix_web::http::header;
use actix_web::{web, HttpRequest};
use gameboxd_lib::{check_and_increment, UsageGrant};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Deserialize)]
struct KeyParam {
    #[serde(rename = "apiKey")]
    api_key: Option<String>,
}

/// Reject the request unless it carries the configured admin token.
pub fn require_admin(req: &HttpRequest, state: &AppState) -> Result<(), ApiError> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Ok(());
    };

    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    match presented {
        Some(token) if token == expected => Ok(()),
        _ => {
            log::debug!("rejected admin request to {}", req.path());
            Err(ApiError::Unauthorized)
        }
    }
}

/// API key from the `x-api-key` header, else the `apiKey` query parameter.
pub fn api_key(req: &HttpRequest) -> Option<String> {
    let from_header = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty());
    if let Some(key) = from_header {
        return Some(key.to_string());
    }

    web::Query::<KeyParam>::from_query(req.query_string())
        .ok()
        .and_then(|q| q.into_inner().api_key)
        .filter(|k| !k.trim().is_empty())
}

/// Rate-limit the caller, then charge one request to its API key.
///
/// Requests are bucketed by key only once the key is known to exist;
/// anonymous and unknown-key traffic shares the caller's address bucket.
pub async fn meter(req: &HttpRequest, state: &AppState) -> Result<UsageGrant, ApiError> {
    let key = api_key(req);

    let known_key = match key.clone() {
        Some(k) => {
            let keys = state.stores.keys.clone();
            let exists = web::block(move || keys.find_by_key(&k).is_ok_and(|r| r.is_some()))
                .await
                .map_err(|e| ApiError::Internal(e.to_string()))?;
            key.as_deref().filter(|_| exists)
        }
        None => None,
    };
    let client = match known_key {
        Some(k) => format!("key:{k}"),
        None => format!(
            "ip:{}",
            req.connection_info().realip_remote_addr().unwrap_or("unknown")
        ),
    };
    state.limiter.check(&client).map_err(ApiError::RateLimited)?;

    let keys = state.stores.keys.clone();
    let grant = web::block(move || check_and_increment(keys.as_ref(), key.as_deref()))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(grant)
}
