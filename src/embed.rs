//! Resolve a saved item into something renderable.
//!
//! Resolution is pure and synchronous: the same input always gives the same
//! descriptor, and malformed links come back as [`EmbedDescriptor::InvalidLink`]
//! rather than as an error. Loading widget scripts is the job of
//! [`crate::loader::ScriptLoader`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::platform::PlatformType;
use crate::registry::{self, Embedding};
use crate::types::ContentItem;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmbedDescriptor {
    Iframe {
        src: String,
        title: String,
    },
    ScriptWidget {
        markup: String,
        script_url: String,
        render_hook: String,
    },
    StaticCard {
        headline: String,
        body: Option<String>,
        cta_label: Option<String>,
        cta_url: Option<String>,
    },
    InvalidLink {
        reason: String,
    },
}

impl EmbedDescriptor {
    /// Card linking out to the original content.
    pub fn link_out(headline: &str, cta_label: &str, url: &str) -> Self {
        EmbedDescriptor::StaticCard {
            headline: headline.to_string(),
            body: None,
            cta_label: Some(cta_label.to_string()),
            cta_url: Some(url.trim().to_string()),
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, EmbedDescriptor::InvalidLink { .. })
    }
}

/// Resolve `(platform, link, title, note body)` into exactly one descriptor.
pub fn resolve(platform: PlatformType, link: &str, title: &str, note_body: Option<&str>) -> EmbedDescriptor {
    let Some(spec) = registry::lookup(platform) else {
        return EmbedDescriptor::StaticCard {
            headline: title.to_string(),
            body: Some(note_body.unwrap_or_default().to_string()),
            cta_label: None,
            cta_url: None,
        };
    };

    let Some(extraction) = (spec.extract)(link) else {
        debug!(platform = %platform, link, "link did not match platform pattern");
        return EmbedDescriptor::InvalidLink { reason: format!("unrecognized URL shape for {platform}") };
    };

    let title = if title.trim().is_empty() { spec.default_title } else { title };

    if !extraction.embeddable {
        return EmbedDescriptor::link_out(title, spec.cta_label, link);
    }

    match spec.embedding {
        Embedding::LinkOnly => EmbedDescriptor::link_out(title, spec.cta_label, link),
        Embedding::Iframe(template) => match template(&extraction, link) {
            Some(src) => EmbedDescriptor::Iframe { src, title: title.to_string() },
            None => EmbedDescriptor::InvalidLink { reason: format!("cannot build embed URL for {platform}") },
        },
        Embedding::Widget(widget) => EmbedDescriptor::ScriptWidget {
            markup: (widget.markup)(&extraction, link, title),
            script_url: widget.script_url.to_string(),
            render_hook: widget.render_hook.to_string(),
        },
    }
}

/// Resolve an item as returned by the backend. Unknown type tags render as invalid links.
pub fn resolve_item(item: &ContentItem) -> EmbedDescriptor {
    match item.platform() {
        Some(platform) => resolve(platform, &item.link, &item.title, item.content.as_deref()),
        None => EmbedDescriptor::InvalidLink { reason: format!("unsupported platform type `{}`", item.kind) },
    }
}
