//! String canonicalization used by the matchers.

use std::sync::LazyLock;

use regex::Regex;
use unaccent::unaccent;
use unicode_normalization::UnicodeNormalization;

/// Bracketed or parenthetical segments, e.g. `(Live)` or `[Remastered 2011]`.
static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\[(].*?[\])]").expect("bracket pattern is valid"));

/// Remove every bracketed segment from a title and trim what is left.
///
/// `"Song (Live) [2011 Remaster]"` becomes `"Song"`.
pub fn strip_brackets(title: &str) -> String {
    BRACKETED.replace_all(title, "").trim().to_string()
}

/// Normalize a string for comparison
///
/// Applies: NFKC normalization, diacritic removal, lowercase, punctuation
/// removal, whitespace collapse
pub fn normalize_string(s: &str) -> String {
    let composed: String = s.nfkc().collect();

    unaccent(&composed)
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                Some(c)
            } else if c == '\'' || c == '’' {
                // don't -> dont
                None
            } else {
                Some(' ')
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// `true` when either string contains the other. Empty strings never relate,
/// since every string trivially contains the empty one.
pub fn substring_related(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(b) || b.contains(a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_brackets() {
        assert_eq!(strip_brackets("Song (Live)"), "Song");
        assert_eq!(
            strip_brackets("Bohemian Rhapsody [Remastered 2011]"),
            "Bohemian Rhapsody"
        );
        assert_eq!(strip_brackets("Song (feat. X) [Edit]"), "Song");
        assert_eq!(strip_brackets("No Brackets"), "No Brackets");
    }

    #[test]
    fn test_normalize_string() {
        assert_eq!(normalize_string("Hello World!"), "hello world");
        assert_eq!(normalize_string("Don't Stop"), "dont stop");
        assert_eq!(normalize_string("  Multiple   Spaces  "), "multiple spaces");
        // Full-width characters
        assert_eq!(normalize_string("Ｆｕｌｌ　Ｗｉｄｔｈ"), "full width");
    }

    #[test]
    fn test_normalize_strips_diacritics() {
        assert_eq!(normalize_string("Beyoncé"), "beyonce");
        assert_eq!(normalize_string("Sigur Rós"), "sigur ros");
        assert_eq!(normalize_string("Mötley Crüe"), "motley crue");
    }

    #[test]
    fn test_substring_related() {
        assert!(substring_related("Song", "Song Title"));
        assert!(substring_related("Song Title", "Song"));
        assert!(!substring_related("", "Song"));
        assert!(!substring_related("Other", "Song"));
    }
}
