pub mod api;
pub mod config;
pub mod db;
pub mod embed;
pub mod extract;
pub mod loader;
pub mod mapping;
pub mod platform;
pub mod registry;
pub mod render;
pub mod session;
pub mod storage;
pub mod types;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::api::{ApiClient, ApiError};
    pub use crate::config::Config;
    pub use crate::embed::{resolve, resolve_item, EmbedDescriptor};
    pub use crate::loader::{EmbedMount, LoadStatus, ScriptHost, ScriptLoader};
    pub use crate::platform::PlatformType;
    pub use crate::render::{HtmlDocument, Layout};
    pub use crate::types::{ContentItem, NewContent, SharedSnapshot};
    pub use crate::Brainbox;
}

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::config::Config;
use crate::db::Database;
use crate::embed::EmbedDescriptor;
use crate::platform::PlatformType;
use crate::render::Layout;
use crate::session::Session;
use crate::storage::Storage;
use crate::types::{AuthResponse, ContentItem, NewContent, SharedSnapshot};

/// Entry point tying the backend client, the local session and the resolver together.
#[derive(Clone)]
pub struct Brainbox {
    config: Config,
    session: Session,
    api: ApiClient,
}

impl Brainbox {
    /// Open the session database, run migrations and build the API client.
    pub async fn connect(config: Config) -> Result<Self> {
        let db = Database::connect(config.database_url.as_deref()).await?;
        db.run_migrations().await?;
        Self::with_storage(config, Arc::new(db))
    }

    /// Build on an existing session store (e.g. [`storage::MemoryStorage`]).
    pub fn with_storage(config: Config, store: Arc<dyn Storage>) -> Result<Self> {
        let session = Session::new(store);
        let api = ApiClient::new(&config.api_url, config.request_timeout(), session.clone())?;
        Ok(Self { config, session, api })
    }

    pub fn config(&self) -> &Config { &self.config }
    pub fn api(&self) -> &ApiClient { &self.api }

    pub async fn is_authenticated(&self) -> Result<bool> { self.session.is_authenticated().await }

    /// True only the first time this is asked for the local store.
    pub async fn first_visit(&self) -> Result<bool> { self.session.mark_visited().await }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let auth = self.api.signin(email, password).await?;
        if auth.token.is_none() {
            bail!("sign-in failed: {}", if auth.message.is_empty() { "no token returned" } else { auth.message.as_str() });
        }
        Ok(auth)
    }

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<String> {
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            bail!("name, email and password are all required");
        }
        Ok(self.api.signup(name.trim(), email, password).await?.message)
    }

    pub async fn logout(&self) -> Result<()> {
        self.session.logout().await?;
        info!("signed out");
        Ok(())
    }

    /// The user's items, optionally narrowed to one platform and/or tag.
    pub async fn list(&self, platform: Option<PlatformType>, tag: Option<&str>) -> Result<Vec<ContentItem>> {
        let items = self.api.list_content().await?;
        Ok(mapping::filter_items(&items, platform, tag).into_iter().cloned().collect())
    }

    /// Save a link. Links that won't embed are still saved; they render as invalid later.
    pub async fn add(&self, platform: PlatformType, title: &str, link: &str, tags: Vec<String>) -> Result<Option<String>> {
        if platform.is_note() {
            bail!("use `note` to save a note");
        }
        if link.trim().is_empty() {
            bail!("a link is required for {platform}");
        }
        if let EmbedDescriptor::InvalidLink { reason } = embed::resolve(platform, link, title, None) {
            warn!(%platform, link, %reason, "saving a link that will not embed");
        }
        let message = self.api.create_content(&NewContent::link(platform, title, link, tags)).await?;
        info!(%platform, "content added");
        Ok(message)
    }

    pub async fn note(&self, title: &str, body: &str, tags: Vec<String>) -> Result<Option<String>> {
        if body.trim().is_empty() {
            bail!("a note needs some text");
        }
        let message = self.api.create_content(&NewContent::note(title, body, tags)).await?;
        info!("note added");
        Ok(message)
    }

    /// Replace a note's body.
    pub async fn edit_note(&self, id: &str, body: &str) -> Result<()> {
        self.api.update_note(id, body).await.with_context(|| format!("updating note {id}"))
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.api.delete_content(id).await.with_context(|| format!("deleting {id}"))?;
        info!(id, "content deleted");
        Ok(())
    }

    /// Enable sharing and return the public URL, or disable it and return None.
    pub async fn share(&self, enable: bool) -> Result<Option<String>> {
        let hash = self.api.set_sharing(enable).await?;
        Ok(hash.map(|h| self.config.share_url(&h)))
    }

    /// Public snapshot behind a sharing hash or a full share URL.
    pub async fn shared(&self, hash_or_url: &str) -> Result<SharedSnapshot> {
        let hash = share_hash(hash_or_url).context("no sharing hash given")?;
        Ok(self.api.shared_snapshot(hash).await?)
    }

    pub fn resolve(&self, platform: PlatformType, link: &str, title: &str) -> EmbedDescriptor {
        embed::resolve(platform, link, title, None)
    }

    /// Render the user's collection, or a shared one when `hash` is given, to HTML.
    pub async fn export(&self, hash: Option<&str>, layout: Layout) -> Result<String> {
        let (heading, items) = match hash {
            Some(h) => {
                let snap = self.shared(h).await?;
                let heading = if snap.username.is_empty() { "Shared Brain".to_string() } else { format!("{}'s Brain", snap.username) };
                (heading, snap.content)
            }
            None => ("My Brain".to_string(), self.list(None, None).await?),
        };
        Ok(render::export(&items, &heading, layout, self.config.script_timeout()).await)
    }
}

/// Accepts either a bare hash or a `.../share/<hash>` URL.
pub fn share_hash(input: &str) -> Option<&str> {
    let input = input.trim().trim_end_matches('/');
    let hash = match input.rfind("/share/") {
        Some(i) => &input[i + "/share/".len()..],
        None => input,
    };
    let hash = hash.split(['?', '#']).next().unwrap_or_default();
    (!hash.is_empty() && !hash.contains('/')).then_some(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn share_hash_accepts_urls_and_bare_hashes() {
        assert_eq!(share_hash("abc123"), Some("abc123"));
        assert_eq!(share_hash("https://brainbox.app/share/abc123/"), Some("abc123"));
        assert_eq!(share_hash("http://localhost:5173/share/abc123?ref=x"), Some("abc123"));
        assert_eq!(share_hash("  "), None);
        assert_eq!(share_hash("https://brainbox.app/other/path"), None);
    }

    #[tokio::test]
    async fn local_checks_run_before_any_request() {
        let bb = Brainbox::with_storage(Config::default(), Arc::new(MemoryStorage::new())).unwrap();
        assert!(bb.add(PlatformType::Youtube, "t", "  ", vec![]).await.is_err());
        assert!(bb.add(PlatformType::Note, "t", "https://x.com", vec![]).await.is_err());
        assert!(bb.note("t", "   ", vec![]).await.is_err());
        assert!(bb.signup("", "a@b.c", "pw").await.is_err());
        assert!(bb.first_visit().await.unwrap());
        assert!(!bb.first_visit().await.unwrap());
    }

    #[test]
    fn rejects_non_http_api_url() {
        let cfg = Config { api_url: "ftp://example.com".into(), ..Config::default() };
        assert!(Brainbox::with_storage(cfg, Arc::new(MemoryStorage::new())).is_err());
    }
}
