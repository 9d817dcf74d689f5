use gameboxd_catalog::types::*;
use serde_json::json;

#[test]
fn release_date_parses_dates_and_tba() {
    assert_eq!(ReleaseDate::parse("tba").unwrap(), ReleaseDate::Tba);
    assert_eq!(ReleaseDate::parse("").unwrap(), ReleaseDate::Tba);
    let d = ReleaseDate::parse("2017-03-03").unwrap();
    assert_eq!(d.to_string(), "2017-03-03");
    assert!(ReleaseDate::parse("March 2017").is_err());
}

#[test]
fn provenance_labels_round_trip_through_parts() {
    let cases = [
        Provenance::User("user-42".to_string()),
        Provenance::BatchUpload,
        Provenance::JsonUpload,
        Provenance::ExternalImport("RAWG API (Top Rated)".to_string()),
    ];
    for p in cases {
        assert_eq!(Provenance::from_parts(p.kind(), p.label()), p);
    }
}

#[test]
fn provenance_serializes_as_display_string() {
    let value = serde_json::to_value(Provenance::BatchUpload).unwrap();
    assert_eq!(value, json!("Batch Upload"));
    let parsed: Provenance = serde_json::from_value(json!("RAWG API (Top Rated)")).unwrap();
    assert_eq!(
        parsed,
        Provenance::ExternalImport("RAWG API (Top Rated)".to_string())
    );
}

#[test]
fn raw_record_keeps_unknown_fields() {
    let raw: RawRecord = serde_json::from_value(json!({
        "name": "Super Game",
        "isNSFW": true,
        "metacritic": 91,
        "storeLinks": {"steam": "https://store.steampowered.com/app/1"}
    }))
    .unwrap();
    assert_eq!(raw.name.as_deref(), Some("Super Game"));
    assert_eq!(raw.is_nsfw, Some(true));
    assert_eq!(raw.extra.get("metacritic"), Some(&json!(91)));
    assert!(raw.store_links.unwrap().contains_key("steam"));
}

#[test]
fn raw_record_identifier_falls_back() {
    let named = RawRecord {
        name: Some("  Halo ".to_string()),
        ..Default::default()
    };
    assert_eq!(named.identifier(0), "Halo");

    let by_id = RawRecord {
        external_id: Some(3498),
        ..Default::default()
    };
    assert_eq!(by_id.identifier(1), "external id 3498");
    assert_eq!(RawRecord::default().identifier(7), "#7");
}

#[test]
fn game_record_json_shape() {
    let mut game = GameRecord::new("super-game", "Super Game", Provenance::BatchUpload);
    game.is_nsfw = true;
    game.extra.insert("metacritic".to_string(), json!(88));

    let value = serde_json::to_value(&game).unwrap();
    assert_eq!(value["slug"], "super-game");
    assert_eq!(value["releaseDate"], "TBA");
    assert_eq!(value["isNSFW"], true);
    assert_eq!(value["addedBy"], "Batch Upload");
    assert_eq!(value["metacritic"], 88);

    let back: GameRecord = serde_json::from_value(value).unwrap();
    assert_eq!(back, game);
}

#[test]
fn completeness_requires_platforms_and_genres() {
    let mut game = GameRecord::new("a", "A", Provenance::JsonUpload);
    assert!(!game.is_complete());
    game.platforms.insert("PC".to_string());
    assert!(!game.is_complete());
    game.genres.insert("Action".to_string());
    assert!(game.is_complete());
}

#[test]
fn api_key_quota() {
    let mut key = ApiKey {
        key: "k".to_string(),
        description: String::new(),
        is_unlimited: false,
        monthly_limit: 5,
        current_month_usage: 5,
        last_used_at: None,
        created_at: None,
    };
    assert!(key.quota_exhausted());
    key.is_unlimited = true;
    assert!(!key.quota_exhausted());
}

#[test]
fn batch_result_counts_and_summary() {
    let mut result = ImportBatchResult::default();
    let game = GameRecord::new("a", "A", Provenance::BatchUpload);
    result.record_write(&game, WriteOutcome::Added);
    result.record_write(&game, WriteOutcome::Updated);
    result.record_error("#2", "name is required");
    assert_eq!(result.total(), 3);
    assert_eq!(result.summary(), "Added 1 games, updated 1, 1 errors");
}
