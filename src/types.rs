use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::platform::PlatformType;

/// A saved item as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Raw platform tag; kept as a string so unknown tags don't break a whole listing.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    /// Note body, only present for notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        rename = "createdAt",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ContentItem {
    pub fn platform(&self) -> Option<PlatformType> {
        self.kind.parse().ok()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = crate::mapping::normalize_tag(tag);
        self.tags.iter().any(|t| crate::mapping::normalize_tag(t) == wanted)
    }
}

/// Accepts RFC 3339 strings or epoch milliseconds; anything else reads as absent.
fn lenient_timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(d)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => DateTime::parse_from_rfc3339(&s).ok().map(|t| t.with_timezone(&Utc)),
        Some(serde_json::Value::Number(n)) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    })
}

/// Body of `POST /content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContent {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: PlatformType,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub tags: Vec<String>,
}

impl NewContent {
    pub fn link(kind: PlatformType, title: &str, link: &str, tags: Vec<String>) -> Self {
        Self { title: title.to_string(), kind, link: link.trim().to_string(), content: None, tags }
    }

    pub fn note(title: &str, body: &str, tags: Vec<String>) -> Self {
        Self { title: title.to_string(), kind: PlatformType::Note, link: String::new(), content: Some(body.to_string()), tags }
    }
}

/// Public read-only view behind a sharing hash.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedSnapshot {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub content: Vec<ContentItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ContentList {
    #[serde(default)]
    pub content: Vec<ContentItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ShareResponse {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
