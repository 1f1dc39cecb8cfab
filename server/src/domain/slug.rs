//! URL slugs for race events

use std::sync::OnceLock;

use chrono::{DateTime, Datelike, Utc};
use regex::Regex;

/// Used when the event name has nothing slug-worthy in it
const FALLBACK_SLUG: &str = "race-event";

/// Lower-case, transliterate common Latin diacritics, and collapse every run
/// of other characters into a single `-`.
pub fn slugify(input: &str) -> String {
    static RE_SEPARATORS: OnceLock<Regex> = OnceLock::new();
    let re = RE_SEPARATORS.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("Invalid regex"));

    let folded: String = input.to_lowercase().chars().map(fold_char).collect();
    re.replace_all(&folded, "-").trim_matches('-').to_string()
}

fn fold_char(c: char) -> String {
    let folded = match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ā' | 'ą' => "a",
        'č' | 'ć' | 'ç' => "c",
        'đ' | 'ď' => "d",
        'é' | 'è' | 'ê' | 'ë' | 'ě' | 'ē' | 'ę' => "e",
        'í' | 'ì' | 'î' | 'ï' => "i",
        'ł' | 'ľ' => "l",
        'ñ' | 'ň' | 'ń' => "n",
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' | 'ő' => "o",
        'ř' => "r",
        'š' | 'ś' => "s",
        'ť' => "t",
        'ú' | 'ù' | 'û' | 'ü' | 'ů' | 'ű' => "u",
        'ý' | 'ÿ' => "y",
        'ž' | 'ź' | 'ż' => "z",
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        _ => return c.to_string(),
    };
    folded.to_string()
}

/// Base slug for a new event: `<slugified name>-<year>`
///
/// The year comes from the first race's start, or `now` when the event has
/// no races. Uniqueness suffixes are added by the store.
pub fn race_event_slug(
    event_name: &str,
    first_race_start: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> String {
    let name = match slugify(event_name) {
        s if s.is_empty() => FALLBACK_SLUG.to_string(),
        s => s,
    };
    let year = first_race_start.unwrap_or(now).year();
    format!("{}-{}", name, year)
}
