pub mod games;
pub mod health;
pub mod import;
pub mod keys;

use actix_web::web;

use crate::error::ApiError;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Register every route and the JSON extractor config.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(MAX_BODY_BYTES)
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .route("/health", web::get().to(health::health))
    .service(
        web::scope("/api")
            .route("/add-games-batch", web::post().to(import::add_games_batch))
            .route("/upload-json", web::post().to(import::upload_json))
            .route(
                "/import-popular-games",
                web::post().to(import::import_popular_games),
            )
            .route("/generate-api-key", web::post().to(keys::generate_api_key))
            .route("/games", web::get().to(games::list_games))
            .route("/games/{slug}", web::get().to(games::get_game))
            .route("/games/{slug}", web::delete().to(games::delete_game)),
    );
}

/// Run blocking store work off the async workers.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
}
