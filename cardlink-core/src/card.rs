//! Card record and its lightweight status/slug projection.
//!
//! Field names on the wire are the remote document's camelCase names, so a
//! document fetched from the store decodes directly into a [`CardRecord`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Gating flag determining whether a card is externally visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PublishState {
    /// Not visible by slug. Also the state of a document with no status.
    #[default]
    Draft,
    /// Visible by slug.
    Published,
}

impl PublishState {
    /// Wire value, as stored in the `cardStatus` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Published => "Published",
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published)
    }
}

/// Decode a `cardStatus` value. Only the exact string `"Published"`
/// publishes; null, unknown strings and non-string values are `Draft`.
fn lenient_publish_state<'de, D>(deserializer: D) -> Result<PublishState, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value.as_ref().and_then(Value::as_str) {
        Some("Published") => PublishState::Published,
        _ => PublishState::Draft,
    })
}

impl fmt::Display for PublishState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Social networks a card can link to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocialNetwork {
    LinkedIn,
    Twitter,
    WhatsApp,
    Facebook,
}

/// A single populated social link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialLink<'a> {
    pub network: SocialNetwork,
    pub url: &'a str,
}

/// Full profile projection of a published (or draft) card.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Free-text bio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_me: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,

    #[serde(default, deserialize_with = "lenient_publish_state")]
    pub card_status: PublishState,
    #[serde(default)]
    pub card_slug: String,

    /// Document fields this type does not model, kept so a cache round trip
    /// loses nothing the remote store returned.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl CardRecord {
    /// Create an empty record with the given slug and publish state.
    pub fn new(card_slug: impl Into<String>, card_status: PublishState) -> Self {
        Self {
            card_slug: card_slug.into(),
            card_status,
            ..Default::default()
        }
    }

    /// Set the display name.
    pub fn with_full_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = Some(name.into());
        self
    }

    /// True when this record may be served for `slug`: it must be published
    /// and its slug must match exactly (case-sensitive, no normalization).
    pub fn is_resolvable_by(&self, slug: &str) -> bool {
        self.card_status.is_published() && self.card_slug == slug
    }

    /// The status/slug projection of this record.
    pub fn projection(&self) -> CardProjection {
        CardProjection {
            card_status: self.card_status,
            card_slug: self.card_slug.clone(),
        }
    }

    /// Populated social links, in display order.
    pub fn social_links(&self) -> Vec<SocialLink<'_>> {
        [
            (SocialNetwork::LinkedIn, &self.linkedin),
            (SocialNetwork::Twitter, &self.twitter),
            (SocialNetwork::WhatsApp, &self.whatsapp),
            (SocialNetwork::Facebook, &self.facebook),
        ]
        .into_iter()
        .filter_map(|(network, url)| {
            url.as_deref()
                .filter(|u| !u.is_empty())
                .map(|url| SocialLink { network, url })
        })
        .collect()
    }
}

/// Lightweight `{cardStatus, cardSlug}` projection stored next to the full
/// blob so slugs can be matched without decoding whole records.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardProjection {
    #[serde(default, deserialize_with = "lenient_publish_state")]
    pub card_status: PublishState,
    #[serde(default)]
    pub card_slug: String,
}

impl CardProjection {
    pub fn new(card_slug: impl Into<String>, card_status: PublishState) -> Self {
        Self {
            card_status,
            card_slug: card_slug.into(),
        }
    }

    /// Same gate as [`CardRecord::is_resolvable_by`].
    pub fn is_resolvable_by(&self, slug: &str) -> bool {
        self.card_status.is_published() && self.card_slug == slug
    }
}

impl From<&CardRecord> for CardProjection {
    fn from(record: &CardRecord) -> Self {
        record.projection()
    }
}

// ============================================================================
// TESTS
// ============================================================================
