//! Static platform table: extractor, presentation hints and embedding strategy per platform.

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::extract::{self, Extraction, Extractor};
use crate::platform::PlatformType;

/// Fixed key appended to Excalidraw links; the embed viewer rejects links without one.
pub const EXCALIDRAW_PLACEHOLDER_KEY: &str = "0123456789abcdefghijkl";
const ENCRYPTION_KEY_PARAM: &str = "encryptionKey";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Embeddability {
    DirectIframe,
    ScriptWidget,
    LinkOnly,
}

/// Card layout hint consumed by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStyle {
    Video,
    Post,
    Board,
    Document,
    Audio,
}

impl CardStyle {
    pub fn css_class(self) -> &'static str {
        match self {
            CardStyle::Video | CardStyle::Board => "aspect-video",
            CardStyle::Post => "min-h-200",
            CardStyle::Document => "min-h-250",
            CardStyle::Audio => "h-152",
        }
    }
}

/// Builds the iframe `src` from the extraction and the original link.
pub type IframeTemplate = fn(&Extraction, &str) -> Option<String>;

/// Builds the placeholder markup a widget script turns into the live embed.
pub type WidgetMarkup = fn(&Extraction, &str, &str) -> String;

#[derive(Debug, Clone, Copy)]
pub struct WidgetSpec {
    pub script_url: &'static str,
    /// Global function the script exposes, called with the embed's node.
    pub render_hook: &'static str,
    pub markup: WidgetMarkup,
}

#[derive(Debug, Clone, Copy)]
pub enum Embedding {
    Iframe(IframeTemplate),
    Widget(WidgetSpec),
    LinkOnly,
}

#[derive(Debug)]
pub struct PlatformSpec {
    pub platform: PlatformType,
    pub name: &'static str,
    pub icon: &'static str,
    pub style: CardStyle,
    pub extract: Extractor,
    pub embedding: Embedding,
    /// Title used when the saved item has none.
    pub default_title: &'static str,
    /// Call-to-action label for static cards linking out.
    pub cta_label: &'static str,
}

impl PlatformSpec {
    pub fn embeddability(&self) -> Embeddability {
        match self.embedding {
            Embedding::Iframe(_) => Embeddability::DirectIframe,
            Embedding::Widget(_) => Embeddability::ScriptWidget,
            Embedding::LinkOnly => Embeddability::LinkOnly,
        }
    }
}

/// Registry entry for a platform. `Note` has no link to classify and therefore no entry.
pub fn lookup(platform: PlatformType) -> Option<&'static PlatformSpec> {
    let spec = match platform {
        PlatformType::Youtube => &YOUTUBE,
        PlatformType::Twitter => &TWITTER,
        PlatformType::Instagram => &INSTAGRAM,
        PlatformType::Linkedin => &LINKEDIN,
        PlatformType::Notion => &NOTION,
        PlatformType::Eraser => &ERASER,
        PlatformType::Excalidraw => &EXCALIDRAW,
        PlatformType::Googledocs => &GOOGLEDOCS,
        PlatformType::Github => &GITHUB,
        PlatformType::Figma => &FIGMA,
        PlatformType::Codepen => &CODEPEN,
        PlatformType::Spotify => &SPOTIFY,
        PlatformType::Miro => &MIRO,
        PlatformType::Facebook => &FACEBOOK,
        PlatformType::Medium => &MEDIUM,
        PlatformType::Note => return None,
    };
    Some(spec)
}

/// Display name, including the note pseudo-platform.
pub fn display_name(platform: PlatformType) -> &'static str {
    lookup(platform).map(|s| s.name).unwrap_or("Note")
}

static YOUTUBE: PlatformSpec = PlatformSpec {
    platform: PlatformType::Youtube,
    name: "YouTube",
    icon: "youtube",
    style: CardStyle::Video,
    extract: extract::youtube,
    embedding: Embedding::Iframe(youtube_src),
    default_title: "YouTube video player",
    cta_label: "Watch on YouTube",
};

static TWITTER: PlatformSpec = PlatformSpec {
    platform: PlatformType::Twitter,
    name: "Twitter",
    icon: "twitter",
    style: CardStyle::Post,
    extract: extract::twitter,
    embedding: Embedding::Widget(WidgetSpec {
        script_url: "https://platform.twitter.com/widgets.js",
        render_hook: "twttr.widgets.load",
        markup: tweet_markup,
    }),
    default_title: "Loading tweet...",
    cta_label: "View on X",
};

static INSTAGRAM: PlatformSpec = PlatformSpec {
    platform: PlatformType::Instagram,
    name: "Instagram",
    icon: "instagram",
    style: CardStyle::Post,
    extract: extract::instagram,
    embedding: Embedding::Widget(WidgetSpec {
        script_url: "https://www.instagram.com/embed.js",
        render_hook: "instgrm.Embeds.process",
        markup: instagram_markup,
    }),
    default_title: "Instagram Post",
    cta_label: "View on Instagram",
};

static LINKEDIN: PlatformSpec = PlatformSpec {
    platform: PlatformType::Linkedin,
    name: "LinkedIn",
    icon: "linkedin",
    style: CardStyle::Post,
    extract: extract::linkedin,
    embedding: Embedding::LinkOnly,
    default_title: "View this post on LinkedIn",
    cta_label: "View on LinkedIn",
};

static NOTION: PlatformSpec = PlatformSpec {
    platform: PlatformType::Notion,
    name: "Notion",
    icon: "notion",
    style: CardStyle::Document,
    extract: extract::notion,
    embedding: Embedding::LinkOnly,
    default_title: "View this document on Notion",
    cta_label: "Open in Notion",
};

static ERASER: PlatformSpec = PlatformSpec {
    platform: PlatformType::Eraser,
    name: "Eraser",
    icon: "eraser",
    style: CardStyle::Board,
    extract: extract::eraser,
    embedding: Embedding::LinkOnly,
    default_title: "View this whiteboard on Eraser",
    cta_label: "Open in Eraser",
};

static EXCALIDRAW: PlatformSpec = PlatformSpec {
    platform: PlatformType::Excalidraw,
    name: "Excalidraw",
    icon: "excalidraw",
    style: CardStyle::Board,
    extract: extract::excalidraw,
    embedding: Embedding::Iframe(excalidraw_src),
    default_title: "Excalidraw Whiteboard",
    cta_label: "Open in Excalidraw",
};

static GOOGLEDOCS: PlatformSpec = PlatformSpec {
    platform: PlatformType::Googledocs,
    name: "Google Docs",
    icon: "googledocs",
    style: CardStyle::Document,
    extract: extract::googledocs,
    embedding: Embedding::Iframe(googledocs_src),
    default_title: "Google document",
    cta_label: "Open in Google Docs",
};

static GITHUB: PlatformSpec = PlatformSpec {
    platform: PlatformType::Github,
    name: "GitHub",
    icon: "github",
    style: CardStyle::Document,
    extract: extract::github,
    embedding: Embedding::LinkOnly,
    default_title: "View this repository on GitHub",
    cta_label: "View on GitHub",
};

static FIGMA: PlatformSpec = PlatformSpec {
    platform: PlatformType::Figma,
    name: "Figma",
    icon: "figma",
    style: CardStyle::Board,
    extract: extract::figma,
    embedding: Embedding::Iframe(figma_src),
    default_title: "Figma design",
    cta_label: "Open in Figma",
};

static CODEPEN: PlatformSpec = PlatformSpec {
    platform: PlatformType::Codepen,
    name: "CodePen",
    icon: "codepen",
    style: CardStyle::Video,
    extract: extract::codepen,
    embedding: Embedding::Iframe(codepen_src),
    default_title: "CodePen embed",
    cta_label: "Open on CodePen",
};

static SPOTIFY: PlatformSpec = PlatformSpec {
    platform: PlatformType::Spotify,
    name: "Spotify",
    icon: "spotify",
    style: CardStyle::Audio,
    extract: extract::spotify,
    embedding: Embedding::Iframe(spotify_src),
    default_title: "Spotify player",
    cta_label: "Listen on Spotify",
};

static MIRO: PlatformSpec = PlatformSpec {
    platform: PlatformType::Miro,
    name: "Miro",
    icon: "miro",
    style: CardStyle::Board,
    extract: extract::miro,
    embedding: Embedding::Iframe(miro_src),
    default_title: "Miro board",
    cta_label: "Open in Miro",
};

static FACEBOOK: PlatformSpec = PlatformSpec {
    platform: PlatformType::Facebook,
    name: "Facebook",
    icon: "facebook",
    style: CardStyle::Post,
    extract: extract::facebook,
    embedding: Embedding::Iframe(facebook_src),
    default_title: "Facebook post",
    cta_label: "View on Facebook",
};

static MEDIUM: PlatformSpec = PlatformSpec {
    platform: PlatformType::Medium,
    name: "Medium",
    icon: "medium",
    style: CardStyle::Document,
    extract: extract::medium,
    embedding: Embedding::LinkOnly,
    default_title: "Read this story on Medium",
    cta_label: "Read on Medium",
};

// --- iframe templates ---

fn youtube_src(e: &Extraction, _link: &str) -> Option<String> {
    Some(format!("https://www.youtube.com/embed/{}", e.id))
}

fn excalidraw_src(_e: &Extraction, link: &str) -> Option<String> {
    with_encryption_key(link)
}

fn googledocs_src(e: &Extraction, _link: &str) -> Option<String> {
    let published = e.id.starts_with("e/");
    let path = match (e.variant.as_deref()?, published) {
        ("document", true) => "pub?embedded=true",
        ("spreadsheets", true) => "pubhtml?widget=true&headers=false",
        ("presentation", _) => "embed",
        ("forms", _) => "viewform?embedded=true",
        _ => "preview",
    };
    Some(format!("https://docs.google.com/{}/d/{}/{}", e.variant.as_deref()?, e.id, path))
}

fn figma_src(_e: &Extraction, link: &str) -> Option<String> {
    Url::parse_with_params("https://www.figma.com/embed", &[("embed_host", "brainbox"), ("url", link.trim())])
        .ok()
        .map(String::from)
}

fn codepen_src(e: &Extraction, _link: &str) -> Option<String> {
    let (user, hash) = e.id.split_once('/')?;
    Some(format!("https://codepen.io/{user}/embed/{hash}?default-tab=result"))
}

fn spotify_src(e: &Extraction, _link: &str) -> Option<String> {
    Some(format!("https://open.spotify.com/embed/{}/{}", e.variant.as_deref()?, e.id))
}

fn miro_src(e: &Extraction, _link: &str) -> Option<String> {
    Some(format!("https://miro.com/app/live-embed/{}/?autoplay=false", e.id))
}

fn facebook_src(e: &Extraction, link: &str) -> Option<String> {
    let plugin = match e.variant.as_deref() {
        Some("video") => "video.php",
        _ => "post.php",
    };
    Url::parse_with_params(
        &format!("https://www.facebook.com/plugins/{plugin}"),
        &[("href", link.trim()), ("show_text", "true")],
    )
    .ok()
    .map(String::from)
}

/// Appends the placeholder `encryptionKey` query parameter unless the link already carries one.
/// Returns `None` when the link is not an absolute URL.
pub fn with_encryption_key(link: &str) -> Option<String> {
    let mut url = Url::parse(link.trim()).ok()?;
    if !url.query_pairs().any(|(k, _)| k == ENCRYPTION_KEY_PARAM) {
        url.query_pairs_mut().append_pair(ENCRYPTION_KEY_PARAM, EXCALIDRAW_PLACEHOLDER_KEY);
    }
    Some(url.into())
}

// --- widget placeholders ---

fn tweet_markup(e: &Extraction, _link: &str, title: &str) -> String {
    format!(
        r#"<blockquote class="twitter-tweet" data-conversation="none"><a href="https://twitter.com/x/status/{}">{}</a></blockquote>"#,
        e.id,
        encode_text(title)
    )
}

fn instagram_markup(e: &Extraction, link: &str, title: &str) -> String {
    format!(
        r#"<blockquote class="instagram-media" data-instgrm-captioned data-instgrm-permalink="https://www.instagram.com/p/{}/"><a href="{}">{}</a></blockquote>"#,
        encode_double_quoted_attribute(&e.id),
        encode_double_quoted_attribute(link.trim()),
        encode_text(title)
    )
}
