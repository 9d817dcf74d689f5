//! Mapping RAWG responses onto the catalog input shape.

use std::collections::BTreeMap;

use gameboxd_catalog::types::{MediaLink, RawRecord, ReleaseDate};
use serde_json::{Map, Value};

use crate::types::{GameDetail, GameSummary, Named, PlatformEntry, Screenshot, StoreEntry, Tag};

/// Upper bound on hashtags kept per game; RAWG tag lists run long.
pub const MAX_HASHTAGS: usize = 10;

const NSFW_TAGS: &[&str] = &["nsfw", "sexual-content", "nudity", "hentai"];

/// Map a list entry. Summaries carry screenshots but no store URLs.
pub fn summary_to_raw(summary: &GameSummary) -> RawRecord {
    RawRecord {
        name: summary.name.clone(),
        release_date: release_date(summary.released.as_deref(), summary.tba),
        platforms: platform_names(summary.platforms.as_deref()),
        genres: names(&summary.genres),
        cover_image_url: summary.background_image.clone(),
        hashtags: hashtags(&summary.tags),
        images: screenshots(&summary.short_screenshots),
        is_nsfw: Some(is_nsfw(summary.esrb_rating.as_ref(), &summary.tags)),
        external_id: summary.id,
        extra: provider_extra(summary.rating, summary.metacritic, None),
        ..RawRecord::default()
    }
}

/// Map a full detail response.
pub fn detail_to_raw(detail: &GameDetail) -> RawRecord {
    let platforms = platform_names(detail.platforms.as_deref());
    let store_links = detail
        .stores
        .as_deref()
        .map(|stores| store_links(stores, platforms.as_deref().unwrap_or_default()))
        .filter(|links| !links.is_empty());

    RawRecord {
        name: detail.name.clone(),
        release_date: release_date(detail.released.as_deref(), detail.tba),
        description: detail
            .description_raw
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        publisher: first_name(&detail.publishers),
        developer: first_name(&detail.developers),
        platforms,
        genres: names(&detail.genres),
        cover_image_url: detail.background_image.clone(),
        aliases: (!detail.alternative_names.is_empty()).then(|| detail.alternative_names.clone()),
        hashtags: hashtags(&detail.tags),
        store_links,
        is_nsfw: Some(is_nsfw(detail.esrb_rating.as_ref(), &detail.tags)),
        external_id: Some(detail.id),
        extra: provider_extra(detail.rating, detail.metacritic, detail.website.as_deref()),
        ..RawRecord::default()
    }
}

fn release_date(released: Option<&str>, tba: bool) -> Option<String> {
    if tba {
        return Some(ReleaseDate::TBA.to_string());
    }
    released
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
}

fn names(items: &[Named]) -> Option<Vec<String>> {
    let names: Vec<String> = items
        .iter()
        .map(|n| n.name.trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect();
    (!names.is_empty()).then_some(names)
}

fn first_name(items: &[Named]) -> Option<String> {
    items
        .iter()
        .map(|n| n.name.trim())
        .find(|n| !n.is_empty())
        .map(str::to_string)
}

fn platform_names(platforms: Option<&[PlatformEntry]>) -> Option<Vec<String>> {
    let platforms: Vec<Named> = platforms?.iter().map(|p| p.platform.clone()).collect();
    names(&platforms)
}

fn hashtags(tags: &[Tag]) -> Option<Vec<String>> {
    let tags: Vec<String> = tags
        .iter()
        .filter(|t| t.language.as_deref().is_none_or(|l| l == "eng"))
        .map(|t| t.name.trim().to_string())
        .filter(|t| !t.is_empty())
        .take(MAX_HASHTAGS)
        .collect();
    (!tags.is_empty()).then_some(tags)
}

fn screenshots(shots: &[Screenshot]) -> Option<Vec<MediaLink>> {
    let images: Vec<MediaLink> = shots
        .iter()
        .enumerate()
        .map(|(i, s)| MediaLink {
            url: s.image.clone(),
            description: format!("Screenshot {}", i + 1),
        })
        .collect();
    (!images.is_empty()).then_some(images)
}

fn is_nsfw(esrb: Option<&Named>, tags: &[Tag]) -> bool {
    esrb.is_some_and(|r| r.slug == "adults-only")
        || tags.iter().any(|t| NSFW_TAGS.contains(&t.slug.as_str()))
}

fn provider_extra(rating: Option<f64>, metacritic: Option<i64>, website: Option<&str>) -> Map<String, Value> {
    let mut extra = Map::new();
    if let Some(rating) = rating {
        extra.insert("rawgRating".to_string(), Value::from(rating));
    }
    if let Some(score) = metacritic {
        extra.insert("metacritic".to_string(), Value::from(score));
    }
    if let Some(site) = website.map(str::trim).filter(|s| !s.is_empty()) {
        extra.insert("website".to_string(), Value::from(site));
    }
    extra
}

// ── Store Links ─────────────────────────────────────────────────────────────

/// Platform family a store sells for, keyed by RAWG store slug.
fn store_family(store_slug: &str) -> Option<&'static str> {
    let family = match store_slug {
        "steam" | "gog" | "epic-games" | "itch" => "pc",
        "playstation-store" => "playstation",
        "xbox-store" | "xbox360" => "xbox",
        "nintendo" => "nintendo",
        "apple-appstore" => "apple",
        "google-play" => "android",
        _ => return None,
    };
    Some(family)
}

/// Platform family of a RAWG platform name.
pub fn platform_family(platform: &str) -> Option<&'static str> {
    let p = platform.to_ascii_lowercase();
    let family = if p.contains("playstation") || p.starts_with("ps ") || p == "psp" {
        "playstation"
    } else if p.contains("xbox") {
        "xbox"
    } else if p.contains("nintendo")
        || p.contains("wii")
        || p.contains("game boy")
        || p.contains("gamecube")
        || p == "snes"
        || p == "nes"
    {
        "nintendo"
    } else if p == "ios" || p == "macos" || p == "classic macintosh" {
        "apple"
    } else if p == "android" {
        "android"
    } else if p == "pc" || p == "linux" {
        "pc"
    } else {
        return None;
    };
    Some(family)
}

/// Keep only links for stores that sell on one of `platforms`, keyed by store name.
pub fn store_links(stores: &[StoreEntry], platforms: &[String]) -> BTreeMap<String, String> {
    let families: Vec<&str> = platforms.iter().filter_map(|p| platform_family(p)).collect();

    stores
        .iter()
        .filter_map(|entry| {
            let url = entry.url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
            let family = store_family(&entry.store.slug)?;
            families
                .contains(&family)
                .then(|| (entry.store.name.clone(), url.to_string()))
        })
        .collect()
}
