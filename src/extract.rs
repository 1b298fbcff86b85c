//! URL pattern extractors, one per platform.
//!
//! Every extractor takes the raw link the user pasted and returns the
//! platform identifier it found, or `None` when the link does not have the
//! platform's shape. Patterns are case-insensitive and accept `http`/`https`
//! and bare or `www.` hosts.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Result of a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub id: String,
    /// Platform sub-kind when the embed URL depends on it (`track`, `document`, `video`, ...).
    pub variant: Option<String>,
    /// False for link shapes that carry an id but cannot be embedded (share short links).
    pub embeddable: bool,
}

impl Extraction {
    fn new(id: &str) -> Self {
        Self { id: id.to_string(), variant: None, embeddable: true }
    }

    fn with_variant(id: &str, variant: &str) -> Self {
        Self { id: id.to_string(), variant: Some(variant.to_ascii_lowercase()), embeddable: true }
    }

    fn link_only(mut self) -> Self {
        self.embeddable = false;
        self
    }
}

pub type Extractor = fn(&str) -> Option<Extraction>;

static RE_YOUTUBE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:https?://)?(?:www\.|m\.|music\.)?(?:youtube(?:-nocookie)?\.com/(?:watch\?(?:[^#]*&)?v=|embed/|shorts/|v/|live/)|youtu\.be/)([a-z0-9_-]{11})(?:[?&#/]|$)",
    )
    .unwrap()
});
static RE_TWITTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.|mobile\.)?(?:twitter|x)\.com/(?:i/web|\w+)/status(?:es)?/(\d+)").unwrap()
});
static RE_INSTAGRAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.)?instagram\.com/(?:[\w.]+/)?(?:p|reels?|tv)/([\w-]+)").unwrap()
});
static RE_LINKEDIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^https?://(?:www\.|[a-z]{2}\.)?linkedin\.com/(?:posts/(?:[^/?#]*?[-_](?:activity|share|ugcpost)-)?(\d+)|feed/update/urn:li:(?:activity|share|ugcpost):(\d+))",
    )
    .unwrap()
});
static RE_NOTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.)?(?:[\w-]+\.)?notion\.(?:so|site)/(?:[^?#]*?[/-])?([0-9a-f]{32})(?:[?#/]|$)").unwrap()
});
static RE_ERASER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.|app\.)?eraser\.io/workspace/([a-z0-9]+)").unwrap()
});
static RE_EXCALIDRAW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^https?://(?:(?:www\.)?excalidraw\.com/?(?:\?[^#]*)?#(json|room)=([\w-]+)|link\.excalidraw\.com/(l/[\w-]+|readonly)/([\w-]+))",
    )
    .unwrap()
});
static RE_GOOGLEDOCS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://docs\.google\.com/(document|spreadsheets|presentation|forms)/d/(e/)?([\w-]{20,})").unwrap()
});
static RE_GITHUB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.)?github\.com/([\w.-]+)/([\w.-]+?)(?:\.git)?(?:[/?#]|$)").unwrap()
});
static RE_FIGMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.)?figma\.com/(file|design|proto|board)/([a-z0-9]{22,128})").unwrap()
});
static RE_CODEPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.)?codepen\.io/([\w-]+)/(?:pen|full|details|embed)/([a-z0-9]+)").unwrap()
});
static RE_SPOTIFY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^https?://open\.spotify\.com/(?:intl-[a-z]{2}(?:-[a-z]+)?/)?(?:embed/)?(track|album|playlist|episode|show|artist)/([a-z0-9]{22})(?:[/?#]|$)",
    )
    .unwrap()
});
static RE_MIRO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.)?miro\.com/app/(?:board|live-embed)/([\w=-]+)").unwrap()
});
static RE_MEDIUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:[\w-]+\.)?medium\.com/(?:[^?#]*?-)?([0-9a-f]{10,12})(?:[/?#]|$)").unwrap()
});

static RE_FB_SHARE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:(?:www\.|m\.|web\.)?facebook\.com/share/(?:[rvp]/)?|fb\.watch/)([\w-]+)").unwrap()
});
static RE_FB_CANONICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.|m\.|web\.)?facebook\.com/[\w.-]+/(posts|videos)/(\w+)").unwrap()
});
static RE_FB_REEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.|m\.|web\.)?facebook\.com/reels?/(\d+)").unwrap()
});
static RE_FB_STORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.|m\.|web\.)?facebook\.com/permalink\.php\?(?:[^#]*&)?story_fbid=(\w+)").unwrap()
});
static RE_FB_VIDEO_QUERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.|m\.|web\.)?facebook\.com/(?:video\.php|watch/?)\?(?:[^#]*&)?v=(\d+)").unwrap()
});

/// Top-level GitHub paths that are not repository owners.
const GITHUB_SKIP: &[&str] = &[
    "orgs", "settings", "features", "marketplace", "topics", "explore", "sponsors", "login", "about",
];

fn first_capture(re: &Regex, url: &str, groups: &[usize]) -> Option<String> {
    let caps = re.captures(url.trim())?;
    groups.iter().find_map(|&g| caps.get(g)).map(|m| m.as_str().to_string())
}

pub fn youtube(url: &str) -> Option<Extraction> {
    first_capture(&RE_YOUTUBE, url, &[1]).map(|id| Extraction::new(&id))
}

pub fn twitter(url: &str) -> Option<Extraction> {
    first_capture(&RE_TWITTER, url, &[1]).map(|id| Extraction::new(&id))
}

pub fn instagram(url: &str) -> Option<Extraction> {
    first_capture(&RE_INSTAGRAM, url, &[1]).map(|id| Extraction::new(&id))
}

pub fn linkedin(url: &str) -> Option<Extraction> {
    first_capture(&RE_LINKEDIN, url, &[1, 2]).map(|id| Extraction::new(&id))
}

pub fn notion(url: &str) -> Option<Extraction> {
    first_capture(&RE_NOTION, url, &[1]).map(|id| Extraction::new(&id.to_ascii_lowercase()))
}

pub fn eraser(url: &str) -> Option<Extraction> {
    first_capture(&RE_ERASER, url, &[1]).map(|id| Extraction::new(&id))
}

pub fn excalidraw(url: &str) -> Option<Extraction> {
    let caps = RE_EXCALIDRAW.captures(url.trim())?;
    if let (Some(kind), Some(id)) = (caps.get(1), caps.get(2)) {
        return Some(Extraction::with_variant(id.as_str(), kind.as_str()));
    }
    let kind = if caps.get(3)?.as_str().eq_ignore_ascii_case("readonly") { "readonly" } else { "link" };
    Some(Extraction::with_variant(caps.get(4)?.as_str(), kind))
}

/// Published documents (`/d/e/{id}`) keep the `e/` prefix in the id.
pub fn googledocs(url: &str) -> Option<Extraction> {
    let caps = RE_GOOGLEDOCS.captures(url.trim())?;
    let kind = caps.get(1)?.as_str();
    let id = caps.get(3)?.as_str();
    let id = if caps.get(2).is_some() { format!("e/{id}") } else { id.to_string() };
    Some(Extraction::with_variant(&id, kind))
}

pub fn github(url: &str) -> Option<Extraction> {
    let caps = RE_GITHUB.captures(url.trim())?;
    let owner = caps.get(1)?.as_str();
    let repo = caps.get(2)?.as_str();
    if GITHUB_SKIP.iter().any(|s| s.eq_ignore_ascii_case(owner)) {
        return None;
    }
    Some(Extraction::new(&format!("{owner}/{repo}")))
}

pub fn figma(url: &str) -> Option<Extraction> {
    let caps = RE_FIGMA.captures(url.trim())?;
    Some(Extraction::with_variant(caps.get(2)?.as_str(), caps.get(1)?.as_str()))
}

pub fn codepen(url: &str) -> Option<Extraction> {
    let caps = RE_CODEPEN.captures(url.trim())?;
    Some(Extraction::new(&format!("{}/{}", caps.get(1)?.as_str(), caps.get(2)?.as_str())))
}

pub fn spotify(url: &str) -> Option<Extraction> {
    let caps = RE_SPOTIFY.captures(url.trim())?;
    Some(Extraction::with_variant(caps.get(2)?.as_str(), caps.get(1)?.as_str()))
}

pub fn miro(url: &str) -> Option<Extraction> {
    first_capture(&RE_MIRO, url, &[1]).map(|id| Extraction::new(&id))
}

pub fn medium(url: &str) -> Option<Extraction> {
    first_capture(&RE_MEDIUM, url, &[1]).map(|id| Extraction::new(&id.to_ascii_lowercase()))
}

/// Short share links still yield their token, flagged as not embeddable.
pub fn facebook(url: &str) -> Option<Extraction> {
    if let Some(token) = first_capture(&RE_FB_SHARE, url, &[1]) {
        return Some(Extraction::with_variant(&token, "share").link_only());
    }
    if let Some(caps) = RE_FB_CANONICAL.captures(url.trim()) {
        let variant = if caps[1].eq_ignore_ascii_case("videos") { "video" } else { "post" };
        return Some(Extraction::with_variant(&caps[2], variant));
    }
    if let Some(id) = first_capture(&RE_FB_REEL, url, &[1]) {
        return Some(Extraction::with_variant(&id, "video"));
    }
    if let Some(id) = first_capture(&RE_FB_STORY, url, &[1]) {
        return Some(Extraction::with_variant(&id, "post"));
    }
    first_capture(&RE_FB_VIDEO_QUERY, url, &[1]).map(|id| Extraction::with_variant(&id, "video"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_of(f: Extractor, url: &str) -> Option<String> {
        f(url).map(|e| e.id)
    }

    #[test]
    fn youtube_accepts_known_shapes() {
        let cases = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "http://youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?t=42",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://youtube.com/shorts/dQw4w9WgXcQ",
            "HTTPS://WWW.YOUTUBE.COM/watch?v=dQw4w9WgXcQ&list=PL1",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ#t=1",
        ];
        for url in cases {
            assert_eq!(id_of(youtube, url).as_deref(), Some("dQw4w9WgXcQ"), "{url}");
        }
    }

    #[test]
    fn youtube_requires_eleven_char_id() {
        assert_eq!(youtube("https://example.com/watch?v=short"), None);
        assert_eq!(youtube("https://www.youtube.com/watch?v=short"), None);
        assert_eq!(youtube("https://www.youtube.com/watch?v=dQw4w9WgXcQXX"), None);
        assert_eq!(youtube("not a url"), None);
    }

    #[test]
    fn twitter_accepts_both_domains() {
        assert_eq!(id_of(twitter, "https://twitter.com/jack/status/20").as_deref(), Some("20"));
        assert_eq!(
            id_of(twitter, "https://x.com/rustlang/status/1789012345678901234?s=20").as_deref(),
            Some("1789012345678901234")
        );
        assert_eq!(id_of(twitter, "https://www.X.com/someone/status/42").as_deref(), Some("42"));
        assert_eq!(twitter("https://x.com/rustlang"), None);
        assert_eq!(twitter("https://notx.com/a/status/1"), None);
    }

    #[test]
    fn instagram_post_and_reel() {
        assert_eq!(id_of(instagram, "https://www.instagram.com/p/CxYz_12-ab/").as_deref(), Some("CxYz_12-ab"));
        assert_eq!(id_of(instagram, "https://instagram.com/reel/C0ffee99/").as_deref(), Some("C0ffee99"));
        assert_eq!(instagram("https://instagram.com/rustacean"), None);
    }

    #[test]
    fn linkedin_post_shapes() {
        assert_eq!(id_of(linkedin, "https://www.linkedin.com/posts/7101234567890").as_deref(), Some("7101234567890"));
        assert_eq!(
            id_of(linkedin, "https://www.linkedin.com/posts/jane-doe_rust-activity-7101234567890-AbCd").as_deref(),
            Some("7101234567890")
        );
        assert_eq!(
            id_of(linkedin, "https://linkedin.com/feed/update/urn:li:activity:7101234567890/").as_deref(),
            Some("7101234567890")
        );
        assert_eq!(linkedin("https://www.linkedin.com/in/jane-doe"), None);
    }

    #[test]
    fn notion_page_ids() {
        let id = "0123456789abcdef0123456789abcdef";
        assert_eq!(
            id_of(notion, &format!("https://www.notion.so/acme/Roadmap-{id}")).as_deref(),
            Some(id)
        );
        assert_eq!(id_of(notion, &format!("https://acme.notion.site/{id}?pvs=4")).as_deref(), Some(id));
        assert_eq!(notion("https://www.notion.so/acme"), None);
    }

    #[test]
    fn excalidraw_shapes() {
        let json = excalidraw("https://excalidraw.com/#json=abc123XYZ,k3y").unwrap();
        assert_eq!(json.id, "abc123XYZ");
        assert_eq!(json.variant.as_deref(), Some("json"));
        let room = excalidraw("https://excalidraw.com/#room=r00m,key").unwrap();
        assert_eq!(room.variant.as_deref(), Some("room"));
        let link = excalidraw("https://link.excalidraw.com/l/5Qpg/1a2b3c").unwrap();
        assert_eq!((link.id.as_str(), link.variant.as_deref()), ("1a2b3c", Some("link")));
        let ro = excalidraw("https://link.excalidraw.com/readonly/Zx9").unwrap();
        assert_eq!(ro.variant.as_deref(), Some("readonly"));
        assert_eq!(excalidraw("https://excalidraw.com/"), None);
        let queried = excalidraw("https://excalidraw.com/?theme=dark#room=r00m,key").unwrap();
        assert_eq!((queried.id.as_str(), queried.variant.as_deref()), ("r00m", Some("room")));
    }

    #[test]
    fn eraser_workspace() {
        assert_eq!(id_of(eraser, "https://app.eraser.io/workspace/Ab12Cd34").as_deref(), Some("Ab12Cd34"));
        assert_eq!(eraser("https://eraser.io/pricing"), None);
    }

    #[test]
    fn googledocs_kinds() {
        let doc = googledocs("https://docs.google.com/document/d/1AbCdEfGhIjKlMnOpQrStUvWxYz/edit").unwrap();
        assert_eq!(doc.id, "1AbCdEfGhIjKlMnOpQrStUvWxYz");
        assert_eq!(doc.variant.as_deref(), Some("document"));
        let published = googledocs("https://docs.google.com/spreadsheets/d/e/2PACX-1vAbCdEfGhIjKlMnOp/pubhtml").unwrap();
        assert_eq!(published.id, "e/2PACX-1vAbCdEfGhIjKlMnOp");
        assert_eq!(googledocs("https://docs.google.com/document/u/0/"), None);
    }

    #[test]
    fn github_repository_slug() {
        assert_eq!(id_of(github, "https://github.com/rust-lang/rust").as_deref(), Some("rust-lang/rust"));
        assert_eq!(id_of(github, "https://github.com/tokio-rs/tokio.git").as_deref(), Some("tokio-rs/tokio"));
        assert_eq!(
            id_of(github, "https://www.github.com/serde-rs/serde/tree/master/serde").as_deref(),
            Some("serde-rs/serde")
        );
        assert_eq!(github("https://github.com/rust-lang"), None);
        assert_eq!(github("https://github.com/orgs/rust-lang"), None);
    }

    #[test]
    fn figma_codepen_spotify_miro() {
        let f = figma("https://www.figma.com/design/AbCdEfGhIjKlMnOpQrStUv/Landing?node-id=0-1").unwrap();
        assert_eq!((f.id.as_str(), f.variant.as_deref()), ("AbCdEfGhIjKlMnOpQrStUv", Some("design")));
        assert_eq!(id_of(codepen, "https://codepen.io/chriscoyier/pen/gfdDu").as_deref(), Some("chriscoyier/gfdDu"));
        let s = spotify("https://open.spotify.com/intl-de/track/4uLU6hMCjMI75M1A2tKUQC?si=x").unwrap();
        assert_eq!((s.id.as_str(), s.variant.as_deref()), ("4uLU6hMCjMI75M1A2tKUQC", Some("track")));
        assert_eq!(id_of(miro, "https://miro.com/app/board/uXjVOLAbC12=/").as_deref(), Some("uXjVOLAbC12="));
        assert_eq!(figma("https://figma.com/community"), None);
        assert_eq!(spotify("https://open.spotify.com/track/short"), None);
    }

    #[test]
    fn medium_post_id() {
        assert_eq!(
            id_of(medium, "https://medium.com/@ferris/why-rust-1a2b3c4d5e6f").as_deref(),
            Some("1a2b3c4d5e6f")
        );
        assert_eq!(medium("https://medium.com/@ferris"), None);
    }

    #[test]
    fn facebook_shapes() {
        let post = facebook("https://www.facebook.com/rustlang/posts/pfbid02AbC").unwrap();
        assert_eq!((post.id.as_str(), post.variant.as_deref(), post.embeddable), ("pfbid02AbC", Some("post"), true));
        let video = facebook("https://facebook.com/rustlang/videos/1234567890").unwrap();
        assert_eq!(video.variant.as_deref(), Some("video"));
        let story = facebook("https://m.facebook.com/permalink.php?story_fbid=98765&id=111").unwrap();
        assert_eq!((story.id.as_str(), story.variant.as_deref()), ("98765", Some("post")));
        let watch = facebook("https://www.facebook.com/watch/?v=55555").unwrap();
        assert_eq!((watch.id.as_str(), watch.variant.as_deref()), ("55555", Some("video")));
        assert_eq!(facebook("https://www.facebook.com/rustlang"), None);
    }

    #[test]
    fn facebook_share_links_are_not_embeddable() {
        for url in ["https://facebook.com/share/r/abc123", "https://www.facebook.com/share/v/XyZ/", "https://fb.watch/q1w2e3/"] {
            let e = facebook(url).unwrap();
            assert!(!e.embeddable, "{url}");
            assert_eq!(e.variant.as_deref(), Some("share"));
        }
    }

    #[test]
    fn garbage_never_matches() {
        let all: [Extractor; 15] = [
            youtube, twitter, instagram, linkedin, notion, eraser, excalidraw, googledocs, github, figma, codepen,
            spotify, miro, medium, facebook,
        ];
        for f in all {
            assert_eq!(f("definitely not a link"), None);
            assert_eq!(f(""), None);
        }
    }
}
