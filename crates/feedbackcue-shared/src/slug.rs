//! Slug normalization.
//!
//! A slug is the URL-safe public identifier of a board. Only the pure
//! string transformation lives here; collision resolution against stored
//! boards is done by the store.

use deunicode::deunicode;

use crate::constants::FALLBACK_SLUG;

/// Normalize free text into a slug base token.
///
/// The name is transliterated to ASCII first (`é` becomes `e`, `Ü` becomes
/// `U`). Letters and digits are then kept (lowercased) and every run of any
/// other character collapses into a single `-`. Leading and trailing
/// separators are dropped, so the result may be empty.
pub fn slugify(name: &str) -> String {
    let ascii = deunicode(name);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_sep = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }

    slug
}

/// Like [`slugify`], but never empty: names without a usable character
/// map to [`FALLBACK_SLUG`].
pub fn base_slug(name: &str) -> String {
    let slug = slugify(name);
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// The `n`-th collision candidate for `base` (`base-1`, `base-2`, ...).
pub fn with_suffix(base: &str, n: u64) -> String {
    format!("{base}-{n}")
}
