use gameboxd_catalog::slug::{is_valid_slug, normalize};

#[test]
fn simple_name() {
    assert_eq!(normalize("Super Game"), "super-game");
}

#[test]
fn strips_diacritics() {
    assert_eq!(normalize("Pokémon Légendes"), "pokemon-legendes");
    assert_eq!(normalize("Ōkami"), "okami");
}

#[test]
fn folds_undecomposable_letters() {
    assert_eq!(normalize("Straße Fighter"), "strasse-fighter");
    assert_eq!(normalize("Ørsted Æon"), "orsted-aeon");
}

#[test]
fn collapses_punctuation_runs() {
    assert_eq!(normalize("Ratchet & Clank: Rift Apart"), "ratchet-clank-rift-apart");
    assert_eq!(normalize("Half-Life 2 --- Episode One"), "half-life-2-episode-one");
}

#[test]
fn trims_separators() {
    assert_eq!(normalize("  ...Halo!!  "), "halo");
    assert_eq!(normalize("-Doom-"), "doom");
}

#[test]
fn keeps_digits() {
    assert_eq!(normalize("FIFA 23"), "fifa-23");
    assert_eq!(normalize("2048"), "2048");
}

#[test]
fn no_usable_characters_yields_empty() {
    assert_eq!(normalize("!!!"), "");
    assert_eq!(normalize("ゼルダ"), "");
}

#[test]
fn normalize_is_idempotent() {
    let names = [
        "Super Game",
        "The Legend of Zelda: Breath of the Wild",
        "  Café -- Racer 2  ",
        "Pokémon: Let's Go, Pikachu!",
        "Straße",
        "ＦＵＬＬＷＩＤＴＨ Title",
        "a--b__c",
        "",
    ];
    for name in names {
        let once = normalize(name);
        assert_eq!(normalize(&once), once, "not idempotent for {name:?}");
    }
}

#[test]
fn fullwidth_compatibility_forms_are_folded() {
    assert_eq!(normalize("ＦＵＬＬＷＩＤＴＨ Title"), "fullwidth-title");
}

#[test]
fn valid_slug_detection() {
    assert!(is_valid_slug("super-game"));
    assert!(!is_valid_slug("Super Game"));
    assert!(!is_valid_slug("-super"));
    assert!(!is_valid_slug(""));
}
