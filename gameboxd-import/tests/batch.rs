use gameboxd_catalog::types::*;
use gameboxd_db::{CatalogStore, MemoryStore, SqliteStore};
use gameboxd_import::*;
use serde_json::json;

fn sqlite() -> SqliteStore {
    SqliteStore::memory().unwrap()
}

#[test]
fn single_record_end_to_end() {
    let store = sqlite();
    let result = import_json_value(
        &store,
        json!([{"name": "Super Game"}]),
        &Provenance::BatchUpload,
        None,
    )
    .unwrap();

    assert_eq!(result.added_count, 1);
    assert_eq!(result.updated_count, 0);
    assert_eq!(result.error_count, 0);

    let game = store.find_by_slug("super-game").unwrap().unwrap();
    assert_eq!(game.name, "Super Game");
    assert_eq!(game.added_by.label(), "Batch Upload");
    assert_eq!(game.release_date, ReleaseDate::Tba);
}

#[test]
fn repeat_import_updates_instead_of_inserting() {
    let store = sqlite();
    let first = json!([{"name": "Hollow Knight", "publisher": "Team Cherry", "platforms": ["PC"]}]);
    let second = json!([{"name": "Hollow Knight", "publisher": "Team Cherry", "platforms": ["PC", "Switch"]}]);

    let r1 = import_json_value(&store, first, &Provenance::BatchUpload, None).unwrap();
    let r2 = import_json_value(&store, second, &Provenance::JsonUpload, None).unwrap();

    assert_eq!((r1.added_count, r1.updated_count), (1, 0));
    assert_eq!((r2.added_count, r2.updated_count), (0, 1));
    assert_eq!(store.count().unwrap(), 1);

    let game = store.find_by_slug("hollow-knight").unwrap().unwrap();
    let platforms: Vec<_> = game.platforms.iter().map(String::as_str).collect();
    assert_eq!(platforms, vec!["PC", "Switch"]);
    // Provenance belongs to the first write.
    assert_eq!(game.added_by, Provenance::BatchUpload);
}

#[test]
fn one_malformed_entry_among_nine() {
    let store = sqlite();
    let mut records: Vec<_> = (1..=8).map(|i| json!({"name": format!("Game {i}")})).collect();
    records.insert(4, json!({"publisher": "Nameless"}));

    let result = import_batch(&store, records, &Provenance::BatchUpload, None);
    assert_eq!(result.added_count, 8);
    assert_eq!(result.error_count, 1);
    assert_eq!(result.total(), 9);
    assert_eq!(result.errors[0].identifier, "#5");
    assert_eq!(result.errors[0].message, "name is required");
}

#[test]
fn counts_always_cover_every_input() {
    let store = sqlite();
    let records = vec![
        json!({"name": "Alpha"}),
        json!("not an object"),
        json!({"name": "   "}),
        json!({"name": "Beta", "releaseDate": "next spring"}),
        json!({"name": "alpha"}),
        json!({"name": "!!!"}),
        json!({"name": 42}),
        json!({"name": "Gamma", "releaseDate": "tba"}),
    ];
    let n = records.len() as u64;

    let result = import_batch(&store, records, &Provenance::BatchUpload, None);
    assert_eq!(result.added_count + result.updated_count + result.error_count, n);
    assert_eq!(result.added_count, 2);
    assert_eq!(result.updated_count, 1);
    assert_eq!(result.error_count, 5);
    assert_eq!(result.errors.len(), 5);
}

#[test]
fn duplicate_slugs_in_one_batch_last_write_wins() {
    let store = sqlite();
    let records = vec![
        json!({"name": "Café Racer", "description": "first"}),
        json!({"name": "Cafe Racer", "description": "second"}),
    ];
    let result = import_batch(&store, records, &Provenance::BatchUpload, None);
    assert_eq!((result.added_count, result.updated_count), (1, 1));

    let game = store.find_by_slug("cafe-racer").unwrap().unwrap();
    assert_eq!(game.description, "second");
    assert_eq!(game.name, "Cafe Racer");
}

#[test]
fn caller_slug_is_ignored() {
    let store = sqlite();
    let result = import_json_value(
        &store,
        json!([{"name": "Real Name", "slug": "spoofed", "addedBy": "mallory"}]),
        &Provenance::JsonUpload,
        None,
    )
    .unwrap();
    assert_eq!(result.written[0].slug, "real-name");
    assert!(store.find_by_slug("spoofed").unwrap().is_none());

    let game = store.find_by_slug("real-name").unwrap().unwrap();
    assert_eq!(game.added_by, Provenance::JsonUpload);
    assert!(!game.extra.contains_key("addedBy"));
}

#[test]
fn blank_aliases_are_pruned_and_extra_kept() {
    let store = sqlite();
    import_json_value(
        &store,
        json!([{
            "name": "Outer Wilds",
            "aliases": ["", "OW", "  "],
            "franchises": [" ", "Wilds"],
            "speedrunRecord": "18:21"
        }]),
        &Provenance::BatchUpload,
        None,
    )
    .unwrap();

    let game = store.find_by_slug("outer-wilds").unwrap().unwrap();
    assert_eq!(game.aliases, vec!["OW".to_string()]);
    assert_eq!(game.franchises, vec!["Wilds".to_string()]);
    assert_eq!(game.extra["speedrunRecord"], "18:21");
}

#[test]
fn update_leaves_absent_fields_alone() {
    let store = sqlite();
    import_json_value(
        &store,
        json!([{"name": "Celeste", "publisher": "Maddy Makes Games", "releaseDate": "2018-01-25"}]),
        &Provenance::BatchUpload,
        None,
    )
    .unwrap();
    import_json_value(
        &store,
        json!([{"name": "Celeste", "description": "Climb the mountain."}]),
        &Provenance::BatchUpload,
        None,
    )
    .unwrap();

    let game = store.find_by_slug("celeste").unwrap().unwrap();
    assert_eq!(game.publisher, "Maddy Makes Games");
    assert_eq!(game.description, "Climb the mountain.");
    assert_eq!(game.release_date.to_string(), "2018-01-25");
}

#[test]
fn non_array_input_is_a_batch_error() {
    let store = sqlite();
    let err = import_json_value(&store, json!({"name": "x"}), &Provenance::BatchUpload, None)
        .unwrap_err();
    assert!(matches!(err, ImportError::Batch(_)));
    assert_eq!(store.count().unwrap(), 0);

    let err = import_json_str(&store, "[{\"name\": ", &Provenance::BatchUpload, None).unwrap_err();
    assert!(matches!(err, ImportError::Batch(_)));
}

#[test]
fn runs_are_logged() {
    let store = sqlite();
    import_json_value(&store, json!([{"name": "A"}, {}]), &Provenance::JsonUpload, None).unwrap();

    let logs = store.import_logs(10).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].source, "JSON Upload");
    assert_eq!(logs[0].records_added, 1);
    assert_eq!(logs[0].records_failed, 1);
}

#[test]
fn works_against_document_store() {
    let store = MemoryStore::new();
    let records = vec![json!({"name": "Tunic"}), json!({"name": "TUNIC", "genres": ["Adventure"]})];
    let result = import_batch(&store, records, &Provenance::BatchUpload, Some(&SilentProgress));
    assert_eq!((result.added_count, result.updated_count), (1, 1));
    assert!(store.find_by_slug("tunic").unwrap().unwrap().genres.contains("Adventure"));
}

/// A store whose reads always fail.
struct BrokenStore;

impl CatalogStore for BrokenStore {
    fn find_by_slug(&self, _: &str) -> Result<Option<GameRecord>, gameboxd_db::StoreError> {
        Err(gameboxd_db::StoreError::Unavailable("down".into()))
    }
    fn find_by_external_id(&self, _: i64) -> Result<Option<GameRecord>, gameboxd_db::StoreError> {
        Err(gameboxd_db::StoreError::Unavailable("down".into()))
    }
    fn insert(&self, _: &GameRecord) -> Result<GameRecord, gameboxd_db::StoreError> {
        Err(gameboxd_db::StoreError::Unavailable("down".into()))
    }
    fn update(&self, _: &str, _: &GameRecord) -> Result<GameRecord, gameboxd_db::StoreError> {
        Err(gameboxd_db::StoreError::Unavailable("down".into()))
    }
    fn delete(&self, _: &str) -> Result<(), gameboxd_db::StoreError> {
        Err(gameboxd_db::StoreError::Unavailable("down".into()))
    }
    fn list(&self, _: &gameboxd_db::GameQuery) -> Result<gameboxd_db::GamePage, gameboxd_db::StoreError> {
        Err(gameboxd_db::StoreError::Unavailable("down".into()))
    }
    fn count(&self) -> Result<u64, gameboxd_db::StoreError> {
        Err(gameboxd_db::StoreError::Unavailable("down".into()))
    }
    fn stats(&self) -> Result<gameboxd_db::CatalogStats, gameboxd_db::StoreError> {
        Err(gameboxd_db::StoreError::Unavailable("down".into()))
    }
    fn record_import(&self, _: &ImportLog) -> Result<i64, gameboxd_db::StoreError> {
        Err(gameboxd_db::StoreError::Unavailable("down".into()))
    }
    fn import_logs(&self, _: u32) -> Result<Vec<ImportLog>, gameboxd_db::StoreError> {
        Err(gameboxd_db::StoreError::Unavailable("down".into()))
    }
}

#[test]
fn store_failures_are_item_errors() {
    let records = vec![json!({"name": "A"}), json!({"name": "B"})];
    let result = import_batch(&BrokenStore, records, &Provenance::BatchUpload, None);
    assert_eq!(result.error_count, 2);
    assert_eq!(result.errors[0].identifier, "A");
    assert!(result.errors[0].message.contains("down"));
}
