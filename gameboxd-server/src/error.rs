use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use gameboxd_db::StoreError;
use gameboxd_import::ImportError;
use gameboxd_lib::{RateLimited, UsageDenial};
use serde_json::json;
use thiserror::Error;

/// Errors returned by handlers, rendered as `{"error": message}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Usage(#[from] UsageDenial),

    #[error("Too many requests, please try again later")]
    RateLimited(RateLimited),

    #[error("{0}")]
    NotFound(String),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Store(e) => Self::Store(e),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Usage(denial) => StatusCode::from_u16(denial.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Store(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            Self::Store(e) if !e.is_not_found() => {
                log::error!("store failure: {e}");
                "Database operation failed".to_string()
            }
            other => other.to_string(),
        };

        let mut builder = HttpResponse::build(self.status_code());
        if let Self::RateLimited(limited) = self {
            let secs = limited.retry_after.as_secs().max(1);
            builder.insert_header((header::RETRY_AFTER, secs.to_string()));
        }
        builder.json(json!({ "error": message }))
    }
}
