//! Record validation and field-level merge.
//!
//! Incoming records are untrusted [`RawRecord`]s. They are validated into a
//! name, a derived slug, and an optional release date, then either expanded
//! into a fresh [`GameRecord`] or merged over an existing one. Incoming
//! values win wherever they are present; absent fields leave stored values
//! alone.

use gameboxd_catalog::slug;
use gameboxd_catalog::types::*;
use serde_json::{Map, Value};

/// The identity and date fields of a record that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    pub name: String,
    pub slug: String,
    /// `None` when the record did not supply a date.
    pub release_date: Option<ReleaseDate>,
}

/// Check the fields every record must get right, returning the reason on failure.
pub fn validate(raw: &RawRecord) -> Result<Validated, String> {
    let name = raw
        .trimmed_name()
        .ok_or_else(|| "name is required".to_string())?;

    let slug = slug::normalize(name);
    if slug.is_empty() {
        return Err(format!("name '{name}' has no characters usable in a slug"));
    }

    let release_date = raw
        .release_date
        .as_deref()
        .map(ReleaseDate::parse)
        .transpose()
        .map_err(|e| e.to_string())?;

    Ok(Validated {
        name: name.to_string(),
        slug,
        release_date,
    })
}

/// Build a new catalog record from validated input.
pub fn build_insert(raw: RawRecord, valid: Validated, provenance: &Provenance) -> GameRecord {
    let mut game = GameRecord::new(valid.slug, valid.name, provenance.clone());
    game.release_date = valid.release_date.unwrap_or_default();
    apply_fields(&mut game, raw);
    game
}

/// Merge validated input over an existing record.
///
/// The slug is recomputed from the (possibly new) name. Provenance and
/// creation time of `existing` are kept.
pub fn merge_into(existing: GameRecord, raw: RawRecord, valid: Validated) -> GameRecord {
    let mut game = existing;
    game.slug = valid.slug;
    game.name = valid.name;
    if let Some(date) = valid.release_date {
        game.release_date = date;
    }
    apply_fields(&mut game, raw);
    game
}

/// Copy every field `raw` provides onto `game`.
fn apply_fields(game: &mut GameRecord, raw: RawRecord) {
    if let Some(v) = raw.description {
        game.description = v;
    }
    if let Some(v) = raw.publisher {
        game.publisher = v;
    }
    if let Some(v) = raw.developer {
        game.developer = v;
    }
    if let Some(v) = raw.platforms {
        game.platforms = prune_blank(v).into_iter().collect();
    }
    if let Some(v) = raw.genres {
        game.genres = prune_blank(v).into_iter().collect();
    }
    if let Some(v) = raw.cover_image_url {
        let v = v.trim();
        game.cover_image_url = (!v.is_empty()).then(|| v.to_string());
    }
    if let Some(v) = raw.aliases {
        game.aliases = prune_blank(v);
    }
    if let Some(v) = raw.franchises {
        game.franchises = prune_blank(v);
    }
    if let Some(v) = raw.hashtags {
        game.hashtags = prune_blank(v).into_iter().collect();
    }
    if let Some(v) = raw.images {
        game.images = prune_media(v);
    }
    if let Some(v) = raw.videos {
        game.videos = prune_media(v);
    }
    if let Some(v) = raw.store_links {
        game.store_links = v
            .into_iter()
            .filter(|(store, url)| !store.trim().is_empty() && !url.trim().is_empty())
            .collect();
    }
    if let Some(v) = raw.is_nsfw {
        game.is_nsfw = v;
    }
    if raw.external_id.is_some() {
        game.external_id = raw.external_id;
    }
    merge_extra(&mut game.extra, raw.extra);
}

/// Trim entries and drop the blank ones, keeping order.
pub fn prune_blank(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn prune_media(links: Vec<MediaLink>) -> Vec<MediaLink> {
    links
        .into_iter()
        .filter(|l| !l.url.trim().is_empty())
        .collect()
}

/// Key-wise merge of open fields. Catalog-owned keys are never taken from input.
fn merge_extra(target: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (key, value) in incoming {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }
        target.insert(key, value);
    }
}

/// Layer `top` over `base`: fields present in `top` win.
///
/// Used to combine a provider's list entry with its detail record.
pub fn overlay(base: RawRecord, top: RawRecord) -> RawRecord {
    let mut extra = base.extra;
    extra.extend(top.extra);
    RawRecord {
        name: top.name.or(base.name),
        slug: top.slug.or(base.slug),
        release_date: top.release_date.or(base.release_date),
        description: top.description.or(base.description),
        publisher: top.publisher.or(base.publisher),
        developer: top.developer.or(base.developer),
        platforms: top.platforms.or(base.platforms),
        genres: top.genres.or(base.genres),
        cover_image_url: top.cover_image_url.or(base.cover_image_url),
        aliases: top.aliases.or(base.aliases),
        franchises: top.franchises.or(base.franchises),
        hashtags: top.hashtags.or(base.hashtags),
        images: top.images.or(base.images),
        videos: top.videos.or(base.videos),
        store_links: top.store_links.or(base.store_links),
        is_nsfw: top.is_nsfw.or(base.is_nsfw),
        external_id: top.external_id.or(base.external_id),
        extra,
    }
}
