//! Metered catalog reads and admin deletes.

use actix_web::{web, HttpRequest, HttpResponse};
use gameboxd_db::GameQuery;
use gameboxd_lib::UsageGrant;
use serde::Deserialize;

use super::blocking;
use crate::auth::{meter, require_admin};
use crate::error::ApiError;
use crate::state::AppState;

/// Header reporting requests left on a limited key this month.
pub const USAGE_REMAINING_HEADER: &str = "x-api-usage-remaining";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub search: Option<String>,
    pub platform: Option<String>,
    pub genre: Option<String>,
    #[serde(default)]
    pub complete: bool,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<ListParams> for GameQuery {
    fn from(p: ListParams) -> Self {
        let defaults = GameQuery::default();
        Self {
            search: p.search,
            platform: p.platform,
            genre: p.genre,
            complete_only: p.complete,
            page: p.page.unwrap_or(defaults.page),
            page_size: p.page_size.unwrap_or(defaults.page_size),
        }
    }
}

fn ok_with_usage(grant: &UsageGrant) -> actix_web::HttpResponseBuilder {
    let mut builder = HttpResponse::Ok();
    if let Some(remaining) = grant.remaining {
        builder.insert_header((USAGE_REMAINING_HEADER, remaining.max(0).to_string()));
    }
    builder
}

pub async fn list_games(
    req: HttpRequest,
    state: web::Data<AppState>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, ApiError> {
    let grant = meter(&req, &state).await?;

    let query = GameQuery::from(params.into_inner());
    let catalog = state.stores.catalog.clone();
    let page = blocking(move || Ok(catalog.list(&query)?)).await?;

    Ok(ok_with_usage(&grant).json(page))
}

pub async fn get_game(
    req: HttpRequest,
    state: web::Data<AppState>,
    slug: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let grant = meter(&req, &state).await?;

    let slug = slug.into_inner();
    let catalog = state.stores.catalog.clone();
    let game = blocking(move || Ok(catalog.find_by_slug(&slug)?)).await?;

    match game {
        Some(game) => Ok(ok_with_usage(&grant).json(game)),
        None => Err(ApiError::NotFound("Game not found".to_string())),
    }
}

pub async fn delete_game(
    req: HttpRequest,
    state: web::Data<AppState>,
    slug: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&req, &state)?;

    let slug = slug.into_inner();
    let catalog = state.stores.catalog.clone();
    let deleted = slug.clone();
    blocking(move || match catalog.delete(&slug) {
        Ok(()) => Ok(()),
        Err(e) if e.is_not_found() => Err(ApiError::NotFound("Game not found".to_string())),
        Err(e) => Err(e.into()),
    })
    .await?;

    log::info!("Deleted game {deleted}");
    Ok(HttpResponse::NoContent().finish())
}
