//! Admin import endpoints: pasted batches, uploaded files, and provider pages.

use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use futures::StreamExt;
use gameboxd_catalog::types::{ImportBatchResult, ItemError, Provenance, WrittenGame};
use gameboxd_import::{
    import_json_str, import_json_value, import_provider_pages, ImportError, LogProgress,
    ProviderImportRequest,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{blocking, MAX_BODY_BYTES};
use crate::auth::require_admin;
use crate::error::ApiError;
use crate::state::AppState;

/// Written games echoed back by an upload.
pub const PREVIEW_GAMES: usize = 5;

/// Most provider pages a single request may import.
pub const MAX_IMPORT_PAGES: u32 = 10;

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ItemError>,
}

impl From<ImportBatchResult> for BatchResponse {
    fn from(result: ImportBatchResult) -> Self {
        Self {
            message: result.summary(),
            errors: result.errors,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub error_details: Vec<ItemError>,
    pub preview_games: Vec<WrittenGame>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// Consecutive pages to import, starting at `page`.
    pub pages: Option<u32>,
}

pub async fn add_games_batch(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&req, &state)?;

    let value = body.into_inner();
    let catalog = state.stores.catalog.clone();
    let result = blocking(move || {
        import_json_value(
            catalog.as_ref(),
            value,
            &Provenance::BatchUpload,
            Some(&LogProgress),
        )
        .map_err(|e| match e {
            ImportError::Batch(batch) => ApiError::BadRequest(batch.to_string()),
            other => other.into(),
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(BatchResponse::from(result)))
}

/// Accepts the array as the request body or as a multipart `file` field.
pub async fn upload_json(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Payload,
) -> Result<HttpResponse, ApiError> {
    require_admin(&req, &state)?;

    let bytes = if is_multipart(&req) {
        read_file_field(&req, payload).await?
    } else {
        read_body(payload).await?
    };
    let text = String::from_utf8(bytes)
        .map_err(|_| ApiError::Internal("Uploaded file is not UTF-8 text".to_string()))?;

    let catalog = state.stores.catalog.clone();
    let result = blocking(move || {
        Ok(import_json_str(
            catalog.as_ref(),
            &text,
            &Provenance::JsonUpload,
            Some(&LogProgress),
        )?)
    })
    .await?;

    let preview_games = result.written.iter().take(PREVIEW_GAMES).cloned().collect();
    Ok(HttpResponse::Ok().json(UploadResponse {
        message: result.summary(),
        error_details: result.errors,
        preview_games,
    }))
}

pub async fn import_popular_games(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: Option<web::Json<PopularParams>>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&req, &state)?;

    let Some(client) = state.rawg.clone() else {
        return Err(ApiError::Internal("RAWG API key is not configured".to_string()));
    };
    let params = body.map(web::Json::into_inner).unwrap_or_default();
    let defaults = ProviderImportRequest::default();
    let request = ProviderImportRequest {
        first_page: params.page.unwrap_or(defaults.first_page).max(1),
        page_count: params
            .pages
            .unwrap_or(defaults.page_count)
            .clamp(1, MAX_IMPORT_PAGES),
        page_size: params.page_size.unwrap_or(defaults.page_size),
        source_label: None,
        detail_concurrency: state.detail_concurrency,
    };

    let report = import_provider_pages(
        &*client,
        state.stores.catalog.clone(),
        &request,
        Some(&LogProgress),
    )
    .await;

    if report.nothing_fetched() {
        let reason = report
            .result
            .errors
            .first()
            .map(|e| e.message.clone())
            .unwrap_or_default();
        return Err(ApiError::Internal(format!(
            "Failed to fetch games from RAWG: {reason}"
        )));
    }

    Ok(HttpResponse::Ok().json(BatchResponse::from(report.result)))
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

async fn read_body(mut payload: web::Payload) -> Result<Vec<u8>, ApiError> {
    let mut body = Vec::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| ApiError::BadRequest(format!("Error reading body: {e}")))?;
        if body.len() + chunk.len() > MAX_BODY_BYTES {
            return Err(ApiError::PayloadTooLarge);
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

async fn read_file_field(req: &HttpRequest, payload: web::Payload) -> Result<Vec<u8>, ApiError> {
    let mut multipart = Multipart::new(req.headers(), payload);

    while let Some(item) = multipart.next().await {
        let mut field =
            item.map_err(|e| ApiError::BadRequest(format!("Invalid multipart data: {e}")))?;
        let is_file = field.name() == Some("file");

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| ApiError::BadRequest(format!("Error reading file: {e}")))?;
            if is_file {
                if data.len() + chunk.len() > MAX_BODY_BYTES {
                    return Err(ApiError::PayloadTooLarge);
                }
                data.extend_from_slice(&chunk);
            }
        }
        if is_file {
            return Ok(data);
        }
    }

    Err(ApiError::BadRequest("No file uploaded".to_string()))
}
