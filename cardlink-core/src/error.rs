//! Error types for cardlink operations

use thiserror::Error;

/// Local cache store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache backend failed: {reason}")]
    Backend { reason: String },

    #[error("Failed to encode cache entry {key}: {reason}")]
    Encode { key: String, reason: String },

    #[error("Failed to decode cache entry {key}: {reason}")]
    Decode { key: String, reason: String },

    #[error("Cache lock poisoned")]
    LockPoisoned,
}

/// Remote document store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Remote store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Permission denied reading {collection}: {reason}")]
    PermissionDenied { collection: String, reason: String },

    #[error("Remote call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid document {collection}/{id}: {reason}")]
    InvalidDocument {
        collection: String,
        id: String,
        reason: String,
    },

    #[error("Query on {collection} failed: {reason}")]
    QueryFailed { collection: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for lower-level cardlink faults.
///
/// None of these reach a `resolve` caller directly: the lookup tiers record
/// them and move on to the next tier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CardlinkError {
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for cardlink operations.
pub type CardlinkResult<T> = Result<T, CardlinkError>;

/// Failure surfaced to the caller of a slug resolution.
///
/// "Exists but unpublished" and "does not exist" are both `NotFound` so
/// callers cannot probe for private cards.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// No identifier could be derived and nothing matched the slug remotely.
    #[error("Invalid card URL: {slug:?}")]
    InvalidSlug { slug: String },

    /// Lookups ran but no published card carries this slug.
    #[error("Card not found or not published: {slug}")]
    NotFound { slug: String },

    /// The resolution could not start.
    #[error("Failed to load card: {reason}")]
    LoadFailed { reason: String },
}

impl ResolveError {
    pub fn invalid_slug(slug: impl Into<String>) -> Self {
        Self::InvalidSlug { slug: slug.into() }
    }

    pub fn not_found(slug: impl Into<String>) -> Self {
        Self::NotFound { slug: slug.into() }
    }

    pub fn load_failed(reason: impl std::fmt::Display) -> Self {
        Self::LoadFailed {
            reason: reason.to_string(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display_permission_denied() {
        let err = RemoteError::PermissionDenied {
            collection: "users".to_string(),
            reason: "missing rules".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Permission denied"));
        assert!(msg.contains("users"));
    }

    #[test]
    fn test_cache_error_display_decode() {
        let err = CacheError::Decode {
            key: "card_data_abc123".to_string(),
            reason: "expected value".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("card_data_abc123"));
        assert!(msg.contains("expected value"));
    }

    #[test]
    fn test_cardlink_error_from_remote() {
        let err: CardlinkError = RemoteError::Timeout { timeout_ms: 250 }.into();
        assert!(matches!(err, CardlinkError::Remote(RemoteError::Timeout { .. })));
        assert!(format!("{}", err).contains("250ms"));
    }

    #[test]
    fn test_resolve_error_messages() {
        assert_eq!(
            ResolveError::not_found("jane-smith-xyz999").to_string(),
            "Card not found or not published: jane-smith-xyz999"
        );
        assert!(ResolveError::invalid_slug("")
            .to_string()
            .starts_with("Invalid card URL"));
        assert!(ResolveError::load_failed("disk gone")
            .to_string()
            .contains("disk gone"));
    }
}
