//! Resolver configuration
//!
//! Loaded from environment variables with defaults matching the published
//! card URL format.

use crate::ConfigError;
use std::time::Duration;

/// Default remote collection holding card documents.
pub const DEFAULT_COLLECTION: &str = "users";

/// Default slug segment separator.
pub const DEFAULT_SLUG_SEPARATOR: char = '-';

/// Minimum length of a slug's last segment before it is treated as an
/// identifier suffix.
pub const DEFAULT_MIN_SUFFIX_LEN: usize = 6;

/// Default bound on a single remote call.
pub const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 10_000;

/// Configuration for slug resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Remote collection holding card documents.
    pub collection: String,
    /// Separator between slug segments.
    pub slug_separator: char,
    /// Minimum suffix length for the identifier heuristic.
    pub min_suffix_len: usize,
    /// Whether remote hits are written back to the local cache.
    pub write_through: bool,
    /// Upper bound on each remote call.
    pub remote_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            slug_separator: DEFAULT_SLUG_SEPARATOR,
            min_suffix_len: DEFAULT_MIN_SUFFIX_LEN,
            write_through: true,
            remote_timeout: Duration::from_millis(DEFAULT_REMOTE_TIMEOUT_MS),
        }
    }
}

impl ResolverConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ResolverConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `CARDLINK_COLLECTION`: Remote collection name (default: users)
    /// - `CARDLINK_SLUG_SEPARATOR`: Single-character slug separator (default: -)
    /// - `CARDLINK_MIN_SUFFIX_LEN`: Minimum identifier suffix length (default: 6)
    /// - `CARDLINK_WRITE_THROUGH`: Write remote hits to the cache (default: true)
    /// - `CARDLINK_REMOTE_TIMEOUT_MS`: Per-call remote timeout (default: 10000)
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let collection = std::env::var("CARDLINK_COLLECTION")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.collection);

        let slug_separator = std::env::var("CARDLINK_SLUG_SEPARATOR")
            .ok()
            .and_then(|s| {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => None,
                }
            })
            .unwrap_or(defaults.slug_separator);

        let min_suffix_len = std::env::var("CARDLINK_MIN_SUFFIX_LEN")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.min_suffix_len);

        let write_through = std::env::var("CARDLINK_WRITE_THROUGH")
            .ok()
            .map(|s| s.to_lowercase() != "false" && s != "0")
            .unwrap_or(defaults.write_through);

        let remote_timeout = std::env::var("CARDLINK_REMOTE_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.remote_timeout);

        Self {
            collection,
            slug_separator,
            min_suffix_len,
            write_through,
            remote_timeout,
        }
    }

    /// Set the remote collection.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Set the slug separator.
    pub fn with_separator(mut self, separator: char) -> Self {
        self.slug_separator = separator;
        self
    }

    /// Set the minimum identifier suffix length.
    pub fn with_min_suffix_len(mut self, len: usize) -> Self {
        self.min_suffix_len = len;
        self
    }

    /// Enable or disable write-through.
    pub fn with_write_through(mut self, enabled: bool) -> Self {
        self.write_through = enabled;
        self
    }

    /// Set the per-call remote timeout.
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    /// Reject values the resolver cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collection.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "collection".to_string(),
                value: self.collection.clone(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.min_suffix_len == 0 {
            return Err(ConfigError::InvalidValue {
                field: "min_suffix_len".to_string(),
                value: "0".to_string(),
                reason: "an empty suffix matches every identifier".to_string(),
            });
        }
        if self.remote_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "remote_timeout".to_string(),
                value: "0ms".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
