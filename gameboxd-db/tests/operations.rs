use gameboxd_catalog::types::*;
use gameboxd_db::*;
use serde_json::json;

fn test_game() -> GameRecord {
    let mut game = GameRecord::new("super-game", "Super Game", Provenance::BatchUpload);
    game.release_date = ReleaseDate::parse("2019-03-22").unwrap();
    game.publisher = "Acme".to_string();
    game.platforms.insert("PC".to_string());
    game.genres.insert("Action".to_string());
    game.aliases = vec!["SG".to_string()];
    game.images.push(MediaLink {
        url: "https://img.example/1.png".to_string(),
        description: "Title screen".to_string(),
    });
    game.store_links
        .insert("steam".to_string(), "https://store.example/1".to_string());
    game.extra.insert("rating".to_string(), json!(4.5));
    game
}

fn limited_key(key: &str, limit: i64, usage: i64) -> ApiKey {
    ApiKey {
        key: key.to_string(),
        description: "test".to_string(),
        is_unlimited: false,
        monthly_limit: limit,
        current_month_usage: usage,
        last_used_at: None,
        created_at: None,
    }
}

#[test]
fn insert_and_find_game() {
    let conn = open_memory().unwrap();
    let inserted = insert_game(&conn, &test_game()).unwrap();
    assert!(inserted.created_at.is_some());

    let found = find_game_by_slug(&conn, "super-game").unwrap().unwrap();
    assert_eq!(found.name, "Super Game");
    assert_eq!(found.publisher, "Acme");
    assert!(found.platforms.contains("PC"));
    assert_eq!(found.aliases, vec!["SG".to_string()]);
    assert_eq!(found.images[0].description, "Title screen");
    assert_eq!(found.store_links["steam"], "https://store.example/1");
    assert_eq!(found.extra["rating"], json!(4.5));
    assert_eq!(found.added_by, Provenance::BatchUpload);
    assert_eq!(found.release_date.to_string(), "2019-03-22");

    assert!(find_game_by_slug(&conn, "missing").unwrap().is_none());
}

#[test]
fn provenance_round_trips_through_columns() {
    let conn = open_memory().unwrap();
    let mut game = test_game();
    game.added_by = Provenance::ExternalImport("RAWG API (Top Rated)".to_string());
    game.external_id = Some(3498);
    insert_game(&conn, &game).unwrap();

    let found = find_game_by_external_id(&conn, 3498).unwrap().unwrap();
    assert_eq!(
        found.added_by,
        Provenance::ExternalImport("RAWG API (Top Rated)".to_string())
    );
    assert!(find_game_by_external_id(&conn, 1).unwrap().is_none());
}

#[test]
fn duplicate_slug_is_conflict() {
    let conn = open_memory().unwrap();
    insert_game(&conn, &test_game()).unwrap();
    let err = insert_game(&conn, &test_game()).unwrap_err();
    assert!(matches!(err, OperationError::Conflict { .. }));
}

#[test]
fn duplicate_external_id_is_conflict() {
    let conn = open_memory().unwrap();
    let mut a = test_game();
    a.external_id = Some(7);
    insert_game(&conn, &a).unwrap();

    let mut b = GameRecord::new("other", "Other", Provenance::BatchUpload);
    b.external_id = Some(7);
    let err = insert_game(&conn, &b).unwrap_err();
    assert!(matches!(err, OperationError::Conflict { .. }));
}

#[test]
fn update_replaces_fields_and_keeps_creation() {
    let conn = open_memory().unwrap();
    let inserted = insert_game(&conn, &test_game()).unwrap();

    let mut changed = inserted.clone();
    changed.description = "Now with words".to_string();
    changed.added_by = Provenance::JsonUpload;
    let updated = update_game(&conn, "super-game", &changed).unwrap();

    assert_eq!(updated.description, "Now with words");
    assert_eq!(updated.created_at, inserted.created_at);
    // Provenance is fixed at creation.
    assert_eq!(updated.added_by, Provenance::BatchUpload);
}

#[test]
fn update_can_rename_slug() {
    let conn = open_memory().unwrap();
    insert_game(&conn, &test_game()).unwrap();

    let mut renamed = test_game();
    renamed.slug = "super-game-deluxe".to_string();
    renamed.name = "Super Game Deluxe".to_string();
    update_game(&conn, "super-game", &renamed).unwrap();

    assert!(find_game_by_slug(&conn, "super-game").unwrap().is_none());
    assert!(find_game_by_slug(&conn, "super-game-deluxe").unwrap().is_some());
}

#[test]
fn update_missing_game_is_not_found() {
    let conn = open_memory().unwrap();
    let err = update_game(&conn, "nope", &test_game()).unwrap_err();
    assert!(matches!(err, OperationError::NotFound { .. }));
}

#[test]
fn delete_game_removes_row() {
    let conn = open_memory().unwrap();
    insert_game(&conn, &test_game()).unwrap();
    delete_game(&conn, "super-game").unwrap();
    assert!(find_game_by_slug(&conn, "super-game").unwrap().is_none());

    let err = delete_game(&conn, "super-game").unwrap_err();
    assert!(matches!(err, OperationError::NotFound { .. }));
}

#[test]
fn consume_quota_stops_at_limit() {
    let conn = open_memory().unwrap();
    insert_api_key(&conn, &limited_key("k", 5, 4)).unwrap();

    assert!(consume_api_key_quota(&conn, "k").unwrap());
    assert!(!consume_api_key_quota(&conn, "k").unwrap());

    let key = find_api_key(&conn, "k").unwrap().unwrap();
    assert_eq!(key.current_month_usage, 5);
    assert!(key.last_used_at.is_some());
}

#[test]
fn consume_quota_skips_unlimited_and_unknown_keys() {
    let conn = open_memory().unwrap();
    let mut unlimited = limited_key("u", 0, 0);
    unlimited.is_unlimited = true;
    insert_api_key(&conn, &unlimited).unwrap();

    assert!(!consume_api_key_quota(&conn, "u").unwrap());
    assert!(!consume_api_key_quota(&conn, "ghost").unwrap());
    assert_eq!(find_api_key(&conn, "u").unwrap().unwrap().current_month_usage, 0);
}

#[test]
fn increment_and_reset_usage() {
    let conn = open_memory().unwrap();
    insert_api_key(&conn, &limited_key("a", 10, 0)).unwrap();
    insert_api_key(&conn, &limited_key("b", 10, 0)).unwrap();

    increment_api_key_usage(&conn, "a").unwrap();
    increment_api_key_usage(&conn, "a").unwrap();
    assert_eq!(find_api_key(&conn, "a").unwrap().unwrap().current_month_usage, 2);

    assert_eq!(reset_api_key_usage(&conn).unwrap(), 1);
    assert_eq!(find_api_key(&conn, "a").unwrap().unwrap().current_month_usage, 0);

    let err = increment_api_key_usage(&conn, "ghost").unwrap_err();
    assert!(matches!(err, OperationError::NotFound { .. }));
}

#[test]
fn duplicate_api_key_is_conflict() {
    let conn = open_memory().unwrap();
    insert_api_key(&conn, &limited_key("k", 1, 0)).unwrap();
    let err = insert_api_key(&conn, &limited_key("k", 1, 0)).unwrap_err();
    assert!(matches!(err, OperationError::Conflict { .. }));
}

#[test]
fn insert_import_log_returns_id() {
    let conn = open_memory().unwrap();
    let log = ImportLog {
        id: 0,
        source: "Batch Upload".to_string(),
        imported_at: "2024-01-01 00:00:00".to_string(),
        records_added: 3,
        records_updated: 1,
        records_failed: 0,
    };
    let first = insert_import_log(&conn, &log).unwrap();
    let second = insert_import_log(&conn, &log).unwrap();
    assert!(second > first);
}
