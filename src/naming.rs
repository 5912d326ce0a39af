//! Text normalization for directory and file names.
//!
//! Collections and images carry no titles of their own: the directory name
//! (the *slug*) and the file name are the only text the photographer
//! provides. This module turns those into display strings and derives
//! stable placeholder colors from them.
//!
//! ## Titles
//!
//! - `car-meet-2024` → "Car Meet 2024"
//! - `the_art_of_light` → "The Art Of Light"
//! - `wedding-05-03-2024` → "Wedding 05 Mar 2024"
//! - `IMG_0042.jpg` (via [`file_name_to_alt`]) → "Img 0042"
//!
//! ## Colors
//!
//! [`hash_string_to_hsl`] is the classic 31-multiplier string hash over
//! UTF-16 code units, wrapped to 32 bits, so a given name always maps to the
//! same hue no matter which process computes it.

use crate::types::GalleryKind;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// Words kept lower-case by the per-token pass.
const STOP_WORDS: &[&str] = &["and", "or", "the", "of", "a", "an"];

pub const DEFAULT_SATURATION: u32 = 65;
pub const DEFAULT_LIGHTNESS: u32 = 60;

/// `DD-MM-YYYY` at the very end of a slug, with `-` or `_` separators.
static TRAILING_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[-_\s])(\d{2})[-_](\d{2})[-_](\d{4})$").expect("static regex")
});

/// Convert a directory or file stem into a display title.
///
/// Separators (`-`, `_`) become single spaces and each word is lower-cased
/// and then capitalized. Stop words and four-digit years skip the per-token
/// capitalization, but the final pass upper-cases the first letter of every
/// word (including those after punctuation such as `'`, `&` or `.`), so they
/// end up capitalized too. A trailing `DD-MM-YYYY` date is
/// rendered as `DD Mon YYYY` when it names a real calendar day.
///
/// Re-applying the function to its own output is a no-op unless the input
/// contained a date.
pub fn slug_to_title(slug: &str) -> String {
    let (head, date) = split_trailing_date(slug);

    let mut words: Vec<String> = head
        .split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(normalize_token)
        .collect();
    if let Some(date) = date {
        words.push(date);
    }

    capitalize_words(&words.join(" "))
}

/// Strip the extension from a file name and title-case the remainder.
///
/// `golden-hour.jpg` → "Golden Hour". A leading dot is not an extension
/// separator, so `.hidden` stays as-is.
pub fn file_name_to_alt(file_name: &str) -> String {
    let stem = match file_name.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < file_name.len() => &file_name[..pos],
        _ => file_name,
    };
    slug_to_title(stem)
}

/// Deterministic `hsl(H, S%, L%)` color for an arbitrary string.
pub fn hash_string_to_hsl(input: &str, saturation: u32, lightness: u32) -> String {
    let hash = string_hash(input);
    let hue = hash.unsigned_abs() % 360;
    format!("hsl({hue}, {saturation}%, {lightness}%)")
}

/// 32-bit polynomial hash (`h = h * 31 + unit`) over UTF-16 code units.
pub fn string_hash(input: &str) -> i32 {
    input
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Tags for a collection: the kind first, then each lower-cased slug token.
///
/// Duplicates are dropped, keeping first-seen order.
pub fn slug_tags(kind: GalleryKind, slug: &str) -> Vec<String> {
    let mut tags = vec![kind.as_str().to_string()];
    for part in slug.split(['-', '_']).filter(|p| !p.is_empty()) {
        let tag = part.to_lowercase();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

fn normalize_token(word: &str) -> String {
    let lower = word.to_lowercase();
    if STOP_WORDS.contains(&lower.as_str()) || is_year(&lower) {
        return lower;
    }
    capitalize_first(&lower)
}

fn is_year(token: &str) -> bool {
    token.len() == 4 && token.bytes().all(|b| b.is_ascii_digit())
}

/// Split a trailing date off the slug, returning the rest and the formatted date.
fn split_trailing_date(slug: &str) -> (&str, Option<String>) {
    let Some(caps) = TRAILING_DATE.captures(slug) else {
        return (slug, None);
    };
    let (Some(whole), Some(d), Some(m), Some(y)) =
        (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
    else {
        return (slug, None);
    };
    let (day, month, year) = (d.as_str(), m.as_str(), y.as_str());

    let formatted = match (day.parse::<u32>(), month.parse::<u32>(), year.parse::<i32>()) {
        (Ok(dd), Ok(mm), Ok(yyyy)) => NaiveDate::from_ymd_opt(yyyy, mm, dd)
            .map(|date| date.format("%d %b %Y").to_string()),
        _ => None,
    }
    .unwrap_or_else(|| format!("{day} {month} {year}"));

    (&slug[..whole.start()], Some(formatted))
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Collapse whitespace, then upper-case the first character of every word.
///
/// A word is a run of alphanumerics and `_`, so punctuation starts a new one:
/// `o'neil` → "O'Neil", `b&w` → "B&W", `studio.v2` → "Studio.V2".
fn capitalize_words(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut out = String::with_capacity(collapsed.len());
    let mut in_word = false;
    for c in collapsed.chars() {
        let is_word = c.is_alphanumeric() || c == '_';
        if is_word && !in_word {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        in_word = is_word;
    }
    out
}
