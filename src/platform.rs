use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// Platform a saved item comes from. `Note` is the free-text pseudo-platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformType {
    Youtube,
    Twitter,
    Instagram,
    Linkedin,
    Notion,
    Eraser,
    Excalidraw,
    Googledocs,
    Github,
    Figma,
    Codepen,
    Spotify,
    Miro,
    Facebook,
    Medium,
    Note,
}

impl PlatformType {
    pub const ALL: [PlatformType; 16] = [
        PlatformType::Youtube,
        PlatformType::Twitter,
        PlatformType::Instagram,
        PlatformType::Linkedin,
        PlatformType::Notion,
        PlatformType::Eraser,
        PlatformType::Excalidraw,
        PlatformType::Googledocs,
        PlatformType::Github,
        PlatformType::Figma,
        PlatformType::Codepen,
        PlatformType::Spotify,
        PlatformType::Miro,
        PlatformType::Facebook,
        PlatformType::Medium,
        PlatformType::Note,
    ];

    /// Wire tag used by the backend (`"youtube"`, `"googledocs"`, ...).
    pub fn tag(self) -> &'static str {
        match self {
            PlatformType::Youtube => "youtube",
            PlatformType::Twitter => "twitter",
            PlatformType::Instagram => "instagram",
            PlatformType::Linkedin => "linkedin",
            PlatformType::Notion => "notion",
            PlatformType::Eraser => "eraser",
            PlatformType::Excalidraw => "excalidraw",
            PlatformType::Googledocs => "googledocs",
            PlatformType::Github => "github",
            PlatformType::Figma => "figma",
            PlatformType::Codepen => "codepen",
            PlatformType::Spotify => "spotify",
            PlatformType::Miro => "miro",
            PlatformType::Facebook => "facebook",
            PlatformType::Medium => "medium",
            PlatformType::Note => "note",
        }
    }

    pub fn is_note(self) -> bool {
        matches!(self, PlatformType::Note)
    }
}

impl fmt::Display for PlatformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for PlatformType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        match wanted.as_str() {
            "x" => return Ok(PlatformType::Twitter),
            "gdocs" | "google-docs" => return Ok(PlatformType::Googledocs),
            _ => {}
        }
        PlatformType::ALL
            .iter()
            .copied()
            .find(|p| p.tag() == wanted)
            .ok_or_else(|| anyhow!("unknown platform type `{}`", s.trim()))
    }
}
