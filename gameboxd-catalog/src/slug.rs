//! Slug derivation for catalog identity.
//!
//! A slug is the natural key of a catalog record. It is always recomputed
//! from the record's name at write time:
//! ```text
//! "Pokémon: Let's Go, Pikachu!"  ->  "pokemon-let-s-go-pikachu"
//! ```

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Derive a URL-safe slug from a display name.
///
/// Lowercases, strips diacritics, collapses every run of characters outside
/// `[a-z0-9]` into a single hyphen, and trims hyphens from both ends. The
/// result only contains `[a-z0-9-]`, so normalizing a slug again returns it
/// unchanged. Returns an empty string when the name has no usable characters.
///
/// # Examples
///
/// ```
/// use gameboxd_catalog::slug::normalize;
///
/// assert_eq!(normalize("Super Game"), "super-game");
/// assert_eq!(normalize("  Café -- Racer 2  "), "cafe-racer-2");
/// assert_eq!(normalize(&normalize("The Witcher 3")), "the-witcher-3");
/// ```
pub fn normalize(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    // Lowercase on both sides of decomposition: compatibility forms can expand to capitals.
    let lowered = name.to_lowercase();
    let chars = lowered
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase);

    for c in chars {
        if c.is_ascii_alphanumeric() {
            push_char(&mut slug, &mut pending_separator, c);
        } else if let Some(folded) = fold_letter(c) {
            for f in folded.chars() {
                push_char(&mut slug, &mut pending_separator, f);
            }
        } else {
            pending_separator = true;
        }
    }

    slug
}

/// Whether `s` is already a well-formed slug (non-empty and a fixed point of [`normalize`]).
pub fn is_valid_slug(s: &str) -> bool {
    !s.is_empty() && normalize(s) == s
}

fn push_char(slug: &mut String, pending_separator: &mut bool, c: char) {
    // Separators are only emitted between alphanumerics, which trims both ends.
    if *pending_separator && !slug.is_empty() {
        slug.push('-');
    }
    *pending_separator = false;
    slug.push(c);
}

/// Latin letters that carry no decomposable diacritic but have a common ASCII spelling.
fn fold_letter(c: char) -> Option<&'static str> {
    let folded = match c {
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        'ø' => "o",
        'đ' | 'ð' => "d",
        'ł' => "l",
        'þ' => "th",
        'ı' => "i",
        _ => return None,
    };
    Some(folded)
}
