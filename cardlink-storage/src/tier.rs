//! Per-tier lookup results.
//!
//! Every tier reports one of three outcomes. A miss means the source
//! answered and had nothing acceptable; an error means the source could not
//! answer. Both fall through to the next tier, but the trace keeps them
//! apart.

use cardlink_core::CardlinkError;
use std::fmt;

/// One lookup strategy in the fallback chain, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    /// Local cache, keyed by the derived identifier.
    Cache,
    /// Remote fetch by the derived identifier.
    DirectFetch,
    /// Remote query on slug and publish state.
    Query,
}

impl Tier {
    pub fn is_remote(&self) -> bool {
        !matches!(self, Self::Cache)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cache => "cache",
            Self::DirectFetch => "direct_fetch",
            Self::Query => "query",
        })
    }
}

/// Why a tier produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissReason {
    /// The tier needs an identifier and none was derived.
    NoIdentifier,
    /// Nothing stored under the identifier, or no query result.
    Absent,
    /// Only one half of the cached profile/projection pair exists.
    Incomplete,
    /// A record was found but is not published.
    Unpublished,
    /// A record was found but carries a different slug.
    SlugMismatch,
}

impl fmt::Display for MissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoIdentifier => "no identifier",
            Self::Absent => "absent",
            Self::Incomplete => "incomplete cache entry",
            Self::Unpublished => "unpublished",
            Self::SlugMismatch => "slug mismatch",
        })
    }
}

/// Result of running a single tier.
#[derive(Debug, Clone, PartialEq)]
pub enum TierOutcome<T> {
    Hit(T),
    Miss(MissReason),
    Error(CardlinkError),
}

impl<T> TierOutcome<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    /// Drop the payload, keeping what happened.
    pub fn status(&self) -> AttemptStatus {
        match self {
            Self::Hit(_) => AttemptStatus::Hit,
            Self::Miss(reason) => AttemptStatus::Miss(*reason),
            Self::Error(e) => AttemptStatus::Error(e.clone()),
        }
    }

    pub fn hit(self) -> Option<T> {
        match self {
            Self::Hit(value) => Some(value),
            _ => None,
        }
    }
}

/// Payload-free [`TierOutcome`], as kept in a lookup trace.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptStatus {
    Hit,
    Miss(MissReason),
    Error(CardlinkError),
}

/// One entry of a lookup trace.
#[derive(Debug, Clone, PartialEq)]
pub struct TierAttempt {
    pub tier: Tier,
    pub status: AttemptStatus,
}

impl TierAttempt {
    pub fn is_error(&self) -> bool {
        matches!(self.status, AttemptStatus::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardlink_core::RemoteError;

    #[test]
    fn test_tier_priority_order() {
        let mut tiers = vec![Tier::Query, Tier::Cache, Tier::DirectFetch];
        tiers.sort();
        assert_eq!(tiers, vec![Tier::Cache, Tier::DirectFetch, Tier::Query]);
        assert!(!Tier::Cache.is_remote());
        assert!(Tier::Query.is_remote());
    }

    #[test]
    fn test_outcome_status_keeps_error_and_miss_apart() {
        let miss: TierOutcome<()> = TierOutcome::Miss(MissReason::Absent);
        let error: TierOutcome<()> =
            TierOutcome::Error(RemoteError::Timeout { timeout_ms: 5 }.into());

        assert_eq!(miss.status(), AttemptStatus::Miss(MissReason::Absent));
        assert!(matches!(error.status(), AttemptStatus::Error(_)));
        assert_ne!(miss.status(), error.status());
    }

    #[test]
    fn test_hit_payload() {
        assert_eq!(TierOutcome::Hit(7).hit(), Some(7));
        assert_eq!(TierOutcome::<i32>::Miss(MissReason::Unpublished).hit(), None);
    }
}
