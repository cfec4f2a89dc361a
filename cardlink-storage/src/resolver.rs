//! Slug resolver: derive a candidate identifier from a slug.
//!
//! Identifiers are not guaranteed to be embedded in slugs, so the cached
//! projections are authoritative: a projection whose slug equals the
//! requested slug names the identifier. Only when no projection matches is
//! the slug's final segment tried as an identifier suffix.
//!
//! The suffix heuristic is a last resort. Two identifiers sharing a suffix
//! collide, and the first one enumerated wins.

use cardlink_core::{identifier_suffix, CardId, ResolverConfig};

use crate::cache::CacheSnapshot;

/// How an identifier was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMethod {
    /// A cached projection carries exactly the requested slug.
    SlugProjection,
    /// A cached identifier equals or ends with the slug's final segment.
    SuffixHeuristic,
}

/// A derived identifier and how it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierMatch {
    pub id: CardId,
    pub method: MatchMethod,
}

/// Derive a candidate identifier for `slug` from the cache snapshot.
///
/// Pure and synchronous. Multiple matches are not expected because slugs
/// are meant to be unique; if they occur, the first in enumeration order
/// wins.
pub fn resolve_identifier(
    slug: &str,
    snapshot: &CacheSnapshot,
    config: &ResolverConfig,
) -> Option<IdentifierMatch> {
    if let Some((id, _)) = snapshot
        .projections()
        .find(|(_, projection)| projection.card_slug == slug)
    {
        return Some(IdentifierMatch {
            id: id.clone(),
            method: MatchMethod::SlugProjection,
        });
    }

    let suffix = identifier_suffix(slug, config.slug_separator, config.min_suffix_len)?;
    snapshot
        .ids()
        .find(|id| id.matches_suffix(suffix))
        .map(|id| IdentifierMatch {
            id: id.clone(),
            method: MatchMethod::SuffixHeuristic,
        })
}
