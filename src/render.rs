//! Static HTML export of a collection.
//!
//! [`HtmlDocument`] stands in for a browser document: it is the
//! [`ScriptHost`] the loader injects widget scripts into, and it remembers
//! every script and render-hook call so they can be written into the page.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::embed::{resolve_item, EmbedDescriptor};
use crate::loader::{ScriptHost, ScriptLoader};
use crate::mapping::display_tag;
use crate::registry;
use crate::types::ContentItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Grid,
    List,
}

/// Headless document: scripts are "loaded" as soon as they are appended.
#[derive(Default)]
pub struct HtmlDocument {
    scripts: Mutex<Vec<String>>,
    hooks: Mutex<Vec<(String, String)>>,
}

impl HtmlDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script URLs in injection order.
    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// `(render_hook, node)` pairs in call order.
    pub fn hook_calls(&self) -> Vec<(String, String)> {
        self.hooks.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl ScriptHost for HtmlDocument {
    async fn inject(&self, script_url: &str) -> Result<()> {
        let mut scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
        if !scripts.iter().any(|s| s == script_url) {
            scripts.push(script_url.to_string());
        }
        Ok(())
    }

    fn invoke_hook(&self, render_hook: &str, node: &str) -> Result<()> {
        self.hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((render_hook.to_string(), node.to_string()));
        Ok(())
    }
}

struct Card<'a> {
    node: String,
    item: &'a ContentItem,
    shown: EmbedDescriptor,
}

/// Render `items` to a standalone page. Every item produces a card; invalid
/// links render in place rather than being skipped.
pub async fn render_page(items: &[ContentItem], heading: &str, layout: Layout, loader: &ScriptLoader, doc: &HtmlDocument) -> String {
    let cards = join_all(items.iter().map(|item| async move {
        let node = format!("embed-{}", Uuid::new_v4().simple());
        let mount = loader.mount(node.clone());
        let descriptor = resolve_item(item);
        let shown = loader.render_into(&mount, &descriptor, &item.link).await;
        Card { node, item, shown }
    }))
    .await;
    debug!(cards = cards.len(), scripts = doc.scripts().len(), "rendered page");

    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(out, "<title>{}</title>", text(heading));
    out.push_str(STYLE);
    out.push_str("</head>\n<body>\n");
    let _ = writeln!(out, "<h1>{}</h1>", text(heading));
    let _ = writeln!(out, "<main class=\"cards cards--{}\">", layout_class(layout));
    for card in &cards {
        write_card(&mut out, card);
    }
    out.push_str("</main>\n");
    for src in doc.scripts() {
        let _ = writeln!(out, "<script async src=\"{}\"></script>", attr(&src));
    }
    for (hook, node) in doc.hook_calls() {
        let _ = writeln!(
            out,
            "<script>window.addEventListener(\"load\",function(){{{}(document.getElementById(\"{}\"));}});</script>",
            hook,
            attr(&node)
        );
    }
    out.push_str("</body>\n</html>\n");
    out
}

fn layout_class(layout: Layout) -> &'static str {
    match layout {
        Layout::Grid => "grid",
        Layout::List => "list",
    }
}

fn write_card(out: &mut String, card: &Card<'_>) {
    let spec = card.item.platform().and_then(registry::lookup);
    let style = spec.map(|s| s.style.css_class()).unwrap_or("note");
    let icon = spec.map(|s| s.icon).unwrap_or("note");
    let _ = writeln!(
        out,
        "<article class=\"card {style}\" id=\"{}\" data-type=\"{}\">",
        attr(&card.node),
        attr(&card.item.kind)
    );
    let _ = writeln!(out, "<header><span class=\"icon icon-{}\"></span><h2>{}</h2></header>", attr(icon), text(&card.item.title));
    out.push_str("<div class=\"card-body\">");
    write_descriptor(out, &card.shown, &card.item.link);
    out.push_str("</div>\n");
    if !card.item.tags.is_empty() {
        out.push_str("<ul class=\"tags\">");
        for tag in &card.item.tags {
            let _ = write!(out, "<li>{}</li>", text(&display_tag(tag)));
        }
        out.push_str("</ul>\n");
    }
    if let Some(at) = card.item.created_at {
        let _ = writeln!(out, "<time datetime=\"{}\">Added on {}</time>", at.to_rfc3339(), at.format("%d/%m/%Y"));
    }
    out.push_str("</article>\n");
}

fn write_descriptor(out: &mut String, d: &EmbedDescriptor, link: &str) {
    match d {
        EmbedDescriptor::Iframe { src, title } => {
            let _ = write!(
                out,
                "<iframe src=\"{}\" title=\"{}\" loading=\"lazy\" allowfullscreen></iframe>",
                attr(src),
                attr(title)
            );
        }
        // registry markup is escaped when built
        EmbedDescriptor::ScriptWidget { markup, .. } => out.push_str(markup),
        EmbedDescriptor::StaticCard { headline, body, cta_label, cta_url } => {
            out.push_str("<div class=\"static-card\">");
            let _ = write!(out, "<h3>{}</h3>", text(headline));
            if let Some(body) = body {
                let _ = write!(out, "<p class=\"note\">{}</p>", text(body));
            }
            if let (Some(label), Some(url)) = (cta_label, cta_url) {
                let _ = write!(out, "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>", attr(url), text(label));
            }
            out.push_str("</div>");
        }
        EmbedDescriptor::InvalidLink { reason } => {
            let _ = write!(out, "<div class=\"invalid-link\" role=\"alert\"><strong>Invalid link</strong><p>{}</p>", text(reason));
            if !link.trim().is_empty() {
                let _ = write!(out, "<code>{}</code>", text(link));
            }
            out.push_str("</div>");
        }
    }
}

/// Convenience for callers without a loader of their own.
pub async fn export(items: &[ContentItem], heading: &str, layout: Layout, script_timeout: std::time::Duration) -> String {
    let doc = Arc::new(HtmlDocument::new());
    let loader = ScriptLoader::new(doc.clone(), script_timeout);
    render_page(items, heading, layout, &loader, &doc).await
}

const STYLE: &str = "<style>
body{font-family:system-ui,sans-serif;margin:2rem;background:#f9fafb}
.cards--grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(320px,1fr));gap:1rem}
.cards--list{display:flex;flex-direction:column;gap:1rem;max-width:720px}
.card{background:#fff;border-radius:.5rem;padding:1rem;box-shadow:0 1px 3px rgba(0,0,0,.1)}
.card iframe{width:100%;border:0}
.aspect-video iframe{aspect-ratio:16/9}
.min-h-200 iframe{min-height:200px}
.h-152 iframe{height:152px}
.min-h-250 iframe{min-height:250px}
.note{white-space:pre-wrap}
.invalid-link{color:#b91c1c}
.tags{list-style:none;padding:0;display:flex;gap:.5rem;color:#6d28d9}
</style>
";
