use gameboxd_catalog::types::*;
use gameboxd_import::*;
use serde_json::json;

fn raw(value: serde_json::Value) -> RawRecord {
    serde_json::from_value(value).unwrap()
}

#[test]
fn validate_derives_slug_and_date() {
    let valid = validate(&raw(json!({"name": "  Pokémon: Let's Go!  ", "releaseDate": "2018-11-16"})))
        .unwrap();
    assert_eq!(valid.name, "Pokémon: Let's Go!");
    assert_eq!(valid.slug, "pokemon-let-s-go");
    assert_eq!(valid.release_date.unwrap().to_string(), "2018-11-16");
}

#[test]
fn validate_rejects_bad_input() {
    assert_eq!(validate(&raw(json!({}))).unwrap_err(), "name is required");
    assert!(validate(&raw(json!({"name": "★★★"}))).is_err());
    assert!(validate(&raw(json!({"name": "X", "releaseDate": "2018-13-40"})))
        .unwrap_err()
        .contains("2018-13-40"));
}

#[test]
fn build_insert_defaults_and_provenance() {
    let input = raw(json!({"name": "Hades", "genres": ["Roguelike", " "], "isNSFW": false}));
    let valid = validate(&input).unwrap();
    let game = build_insert(
        input,
        valid,
        &Provenance::ExternalImport("RAWG API (Top Rated)".to_string()),
    );
    assert_eq!(game.slug, "hades");
    assert_eq!(game.release_date, ReleaseDate::Tba);
    assert_eq!(game.genres.len(), 1);
    assert_eq!(game.added_by.label(), "RAWG API (Top Rated)");
}

#[test]
fn merge_into_renames_and_keeps_identity_fields() {
    let mut existing = GameRecord::new("old-name", "Old Name", Provenance::BatchUpload);
    existing.publisher = "Kept".to_string();
    existing.created_at = Some("2020-01-01 00:00:00".to_string());
    existing.extra.insert("a".to_string(), json!(1));

    let input = raw(json!({"name": "New Name", "b": 2, "createdAt": "1999-01-01"}));
    let valid = validate(&input).unwrap();
    let merged = merge_into(existing, input, valid);

    assert_eq!(merged.slug, "new-name");
    assert_eq!(merged.publisher, "Kept");
    assert_eq!(merged.created_at.as_deref(), Some("2020-01-01 00:00:00"));
    assert_eq!(merged.extra["a"], 1);
    assert_eq!(merged.extra["b"], 2);
    assert!(!merged.extra.contains_key("createdAt"));
    assert_eq!(merged.added_by, Provenance::BatchUpload);
}

#[test]
fn overlay_prefers_top() {
    let base = raw(json!({"name": "Short", "images": [{"url": "https://i.example/1"}], "externalId": 5}));
    let top = raw(json!({"name": "Full Name", "description": "detail"}));
    let combined = overlay(base, top);
    assert_eq!(combined.name.as_deref(), Some("Full Name"));
    assert_eq!(combined.description.as_deref(), Some("detail"));
    assert_eq!(combined.images.map(|i| i.len()), Some(1));
    assert_eq!(combined.external_id, Some(5));
}

#[test]
fn prune_blank_keeps_order() {
    let pruned = prune_blank(vec![" b ".into(), "".into(), "a".into(), "\t".into()]);
    assert_eq!(pruned, vec!["b".to_string(), "a".to_string()]);
}
