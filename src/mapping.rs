use crate::platform::PlatformType;
use crate::types::ContentItem;

/// Split comma-separated user input into tags, dropping empty entries and leading `#`.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|t| t.trim().trim_start_matches('#').trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn normalize_tag(tag: &str) -> String {
    tag.trim().trim_start_matches('#').to_lowercase()
}

/// Tags are shown with a single leading `#`.
pub fn display_tag(tag: &str) -> String {
    if tag.starts_with('#') { tag.to_string() } else { format!("#{tag}") }
}

/// Items matching an optional platform filter and an optional tag, order preserved.
pub fn filter_items<'a>(
    items: &'a [ContentItem],
    platform: Option<PlatformType>,
    tag: Option<&str>,
) -> Vec<&'a ContentItem> {
    items
        .iter()
        .filter(|i| platform.map_or(true, |p| i.platform() == Some(p)))
        .filter(|i| tag.map_or(true, |t| i.has_tag(t)))
        .collect()
}
