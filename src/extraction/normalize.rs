//! Text normalization for keyword and item matching
//!
//! Two flavours:
//! - `normalize_for_match`: Unicode fold, diacritics stripped, whitespace
//!   removed, lowercase. Used for item filters against record names.
//! - `compact`: lowercase with whitespace removed, no Unicode folding. Used
//!   for keyword tables so "이번 주" and "이번주" hit the same entry.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize a name for containment matching.
///
/// Performs:
/// - Canonical decomposition (NFD) and combining-mark removal
/// - Recomposition (NFC) so Hangul syllables survive intact
/// - Whitespace removal
/// - Lowercase conversion
///
/// # Examples
///
/// ```
/// use neuraltwin_assistant::extraction::normalize_for_match;
///
/// assert_eq!(normalize_for_match("  Café Latte "), "cafelatte");
/// assert_eq!(normalize_for_match("아우터 "), "아우터");
/// ```
pub fn normalize_for_match(s: &str) -> String {
    let stripped: String = s.nfd().filter(|c| !is_combining_mark(*c)).collect();
    stripped
        .nfc()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Lowercase and drop all whitespace
pub fn compact(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Precomposed Hangul syllable (가..힣)
pub fn is_hangul_syllable(c: char) -> bool {
    ('가'..='힣').contains(&c)
}

/// Substring containment on normalized forms
pub fn matches_filter(name: &str, term: &str) -> bool {
    let term = normalize_for_match(term);
    !term.is_empty() && normalize_for_match(name).contains(&term)
}
