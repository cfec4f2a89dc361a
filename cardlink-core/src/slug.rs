//! Slug helpers.
//!
//! Slugs are compared verbatim everywhere. These helpers only pull apart the
//! conventional `name-parts-IDSUFFIX` shape for the identifier heuristic.

/// True for an empty or whitespace-only slug.
pub fn is_blank_slug(slug: &str) -> bool {
    slug.trim().is_empty()
}

/// Final `separator`-delimited segment of `slug`, if it is non-empty and at
/// least `min_len` characters long.
///
/// ```
/// use cardlink_core::identifier_suffix;
///
/// assert_eq!(identifier_suffix("john-doe-abc123", '-', 6), Some("abc123"));
/// assert_eq!(identifier_suffix("john-doe-abc", '-', 6), None);
/// ```
pub fn identifier_suffix(slug: &str, separator: char, min_len: usize) -> Option<&str> {
    let last = slug.rsplit(separator).next()?;
    (!last.is_empty() && last.chars().count() >= min_len).then_some(last)
}
