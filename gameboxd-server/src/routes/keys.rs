use actix_web::{web, HttpRequest, HttpResponse};
use gameboxd_lib::generate_key;
use serde::{Deserialize, Serialize};

use super::blocking;
use crate::auth::require_admin;
use crate::error::ApiError;
use crate::state::AppState;

/// Monthly allowance when a request does not name one.
pub const DEFAULT_MONTHLY_LIMIT: i64 = 1000;

#[derive(Debug, Deserialize)]
pub struct GenerateKeyRequest {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_unlimited: bool,
    #[serde(default = "default_monthly_limit")]
    pub monthly_limit: i64,
}

fn default_monthly_limit() -> i64 {
    DEFAULT_MONTHLY_LIMIT
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateKeyResponse {
    pub api_key: String,
}

pub async fn generate_api_key(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<GenerateKeyRequest>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&req, &state)?;

    let body = body.into_inner();
    let keys = state.stores.keys.clone();
    let issued = blocking(move || {
        generate_key(
            keys.as_ref(),
            &body.description,
            body.is_unlimited,
            body.monthly_limit,
        )
        .map_err(|e| {
            log::error!("failed to issue API key: {e}");
            ApiError::Internal("Failed to generate API key".to_string())
        })
    })
    .await?;

    Ok(HttpResponse::Created().json(GenerateKeyResponse {
        api_key: issued.key,
    }))
}
