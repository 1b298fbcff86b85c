//! Third-party widget script loading.
//!
//! One [`ScriptLoader`] is built per document and handed to whatever renders
//! embeds. Each script URL is injected at most once; concurrent embeds of the
//! same platform wait on the same load and are notified in the order they
//! registered. Dropping an [`EmbedMount`] only forgets that embed's pending
//! waiters: the shared load and the script element stay, since other embeds
//! may rely on the global the script defines.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::embed::EmbedDescriptor;

pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(8);

/// The document the loader works against.
#[async_trait]
pub trait ScriptHost: Send + Sync {
    /// Append a `<script>` element for `script_url`; completes when its load event fires.
    async fn inject(&self, script_url: &str) -> Result<()>;
    /// Call the global `render_hook` (e.g. `twttr.widgets.load`) scoped to `node`.
    fn invoke_hook(&self, render_hook: &str, node: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    NotLoaded,
    Loading,
    Loaded,
    Failed,
}

struct Waiter {
    mount: u64,
    node: String,
    tx: oneshot::Sender<bool>,
}

#[derive(Default)]
struct ScriptSlot {
    status: LoadStatus,
    waiters: Vec<Waiter>,
}

type Slots = Arc<Mutex<HashMap<String, ScriptSlot>>>;

fn lock(slots: &Slots) -> MutexGuard<'_, HashMap<String, ScriptSlot>> {
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle for a mounted embed. Dropping it unregisters this mount's pending waiters,
/// and only those, even if another mount shares the same node id.
pub struct EmbedMount {
    id: u64,
    node: String,
    slots: Slots,
}

impl EmbedMount {
    pub fn node(&self) -> &str {
        &self.node
    }
}

impl Drop for EmbedMount {
    fn drop(&mut self) {
        forget_mount(&self.slots, self.id);
    }
}

fn forget_mount(slots: &Slots, mount: u64) {
    for slot in lock(slots).values_mut() {
        slot.waiters.retain(|w| w.mount != mount);
    }
}

#[derive(Clone)]
pub struct ScriptLoader {
    host: Arc<dyn ScriptHost>,
    slots: Slots,
    next_mount: Arc<AtomicU64>,
    timeout: Duration,
}

impl ScriptLoader {
    pub fn new(host: Arc<dyn ScriptHost>, timeout: Duration) -> Self {
        Self { host, slots: Arc::new(Mutex::new(HashMap::new())), next_mount: Arc::new(AtomicU64::new(1)), timeout }
    }

    pub fn mount(&self, node: impl Into<String>) -> EmbedMount {
        let id = self.next_mount.fetch_add(1, Ordering::Relaxed);
        EmbedMount { id, node: node.into(), slots: self.slots.clone() }
    }

    pub fn status(&self, script_url: &str) -> LoadStatus {
        lock(&self.slots).get(script_url).map(|s| s.status).unwrap_or_default()
    }

    /// Nodes still waiting on `script_url`, in registration order.
    pub fn waiting_nodes(&self, script_url: &str) -> Vec<String> {
        lock(&self.slots)
            .get(script_url)
            .map(|s| s.waiters.iter().map(|w| w.node.clone()).collect())
            .unwrap_or_default()
    }

    /// Resolve once `script_url` has loaded, joining an in-flight load if there is one.
    pub async fn ensure_loaded(&self, script_url: &str, mount: &EmbedMount) -> Result<()> {
        let rx = {
            let mut slots = lock(&self.slots);
            let slot = slots.entry(script_url.to_string()).or_default();
            match slot.status {
                LoadStatus::Loaded => return Ok(()),
                LoadStatus::Failed => bail!("script {script_url} failed to load"),
                LoadStatus::Loading | LoadStatus::NotLoaded => {
                    let (tx, rx) = oneshot::channel();
                    slot.waiters.push(Waiter { mount: mount.id, node: mount.node.clone(), tx });
                    if slot.status == LoadStatus::NotLoaded {
                        slot.status = LoadStatus::Loading;
                        self.spawn_load(script_url);
                    }
                    rx
                }
            }
        };
        match rx.await {
            Ok(true) => Ok(()),
            Ok(false) => Err(anyhow!("script {script_url} failed to load")),
            Err(_) => Err(anyhow!("embed {} was unmounted before {script_url} loaded", mount.node)),
        }
    }

    // The load runs detached so that no single waiter going away can cancel it.
    fn spawn_load(&self, script_url: &str) {
        let host = self.host.clone();
        let slots = self.slots.clone();
        let url = script_url.to_string();
        debug!(script = %url, "injecting widget script");
        tokio::spawn(async move {
            let result = host.inject(&url).await;
            let waiters = {
                let mut slots = lock(&slots);
                let slot = slots.entry(url.clone()).or_default();
                slot.status = if result.is_ok() { LoadStatus::Loaded } else { LoadStatus::Failed };
                std::mem::take(&mut slot.waiters)
            };
            match &result {
                Ok(()) => debug!(script = %url, waiters = waiters.len(), "widget script loaded"),
                Err(e) => warn!(script = %url, error = %e, "widget script failed to load"),
            }
            for w in waiters {
                let _ = w.tx.send(result.is_ok());
            }
        });
    }

    /// Turn a widget placeholder into the live widget for this mount.
    ///
    /// Returns the descriptor to display: the widget itself once the hook ran,
    /// or a "view externally" card when the script failed or timed out.
    /// Other descriptor kinds pass through unchanged.
    pub async fn render_into(&self, mount: &EmbedMount, descriptor: &EmbedDescriptor, link: &str) -> EmbedDescriptor {
        let EmbedDescriptor::ScriptWidget { script_url, render_hook, .. } = descriptor else {
            return descriptor.clone();
        };
        let loaded = match tokio::time::timeout(self.timeout, self.ensure_loaded(script_url, mount)).await {
            Ok(r) => r,
            Err(_) => {
                forget_mount(&self.slots, mount.id);
                Err(anyhow!("timed out after {:?} waiting for {script_url}", self.timeout))
            }
        };
        let rendered = loaded.and_then(|()| self.host.invoke_hook(render_hook, mount.node()));
        match rendered {
            Ok(()) => descriptor.clone(),
            Err(e) => {
                warn!(node = mount.node(), error = %e, "falling back to external link");
                EmbedDescriptor::link_out("This embed could not be loaded", "View externally", link)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::watch;

    const TWITTER_JS: &str = "https://platform.twitter.com/widgets.js";

    /// Host whose scripts finish loading only once the gate opens.
    struct FakeHost {
        gate: watch::Receiver<bool>,
        fail: bool,
        injected: Mutex<Vec<String>>,
        hooks: Mutex<Vec<(String, String)>>,
    }

    impl FakeHost {
        fn gated(fail: bool) -> (Arc<Self>, watch::Sender<bool>) {
            let (tx, rx) = watch::channel(false);
            let host = Arc::new(Self { gate: rx, fail, injected: Mutex::new(vec![]), hooks: Mutex::new(vec![]) });
            (host, tx)
        }

        fn injected(&self) -> Vec<String> {
            self.injected.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ScriptHost for FakeHost {
        async fn inject(&self, script_url: &str) -> Result<()> {
            self.injected.lock().unwrap().push(script_url.to_string());
            let mut gate = self.gate.clone();
            while !*gate.borrow() {
                if gate.changed().await.is_err() {
                    break;
                }
            }
            if self.fail { bail!("blocked by client") } else { Ok(()) }
        }

        fn invoke_hook(&self, render_hook: &str, node: &str) -> Result<()> {
            self.hooks.lock().unwrap().push((render_hook.to_string(), node.to_string()));
            Ok(())
        }
    }

    fn widget() -> EmbedDescriptor {
        EmbedDescriptor::ScriptWidget {
            markup: "<blockquote></blockquote>".into(),
            script_url: TWITTER_JS.into(),
            render_hook: "twttr.widgets.load".into(),
        }
    }

    #[tokio::test]
    async fn concurrent_loads_share_one_script() {
        let (host, open) = FakeHost::gated(false);
        let loader = ScriptLoader::new(host.clone(), Duration::from_secs(5));
        let release = async {
            tokio::task::yield_now().await;
            open.send(true).unwrap();
        };
        let (ma, mb) = (loader.mount("a"), loader.mount("b"));
        let (a, b, ()) = tokio::join!(loader.ensure_loaded(TWITTER_JS, &ma), loader.ensure_loaded(TWITTER_JS, &mb), release);
        a.unwrap();
        b.unwrap();
        assert_eq!(host.injected(), vec![TWITTER_JS.to_string()]);
        assert_eq!(loader.status(TWITTER_JS), LoadStatus::Loaded);

        loader.ensure_loaded(TWITTER_JS, &loader.mount("c")).await.unwrap();
        assert_eq!(host.injected().len(), 1);
    }

    #[tokio::test]
    async fn waiters_are_kept_in_registration_order() {
        let (host, _open) = FakeHost::gated(false);
        let loader = ScriptLoader::new(host, Duration::from_secs(5));
        let (m1, m2) = (loader.mount("first"), loader.mount("second"));
        let first = loader.ensure_loaded(TWITTER_JS, &m1);
        let second = loader.ensure_loaded(TWITTER_JS, &m2);
        tokio::pin!(first, second);
        assert!(futures::poll!(&mut first).is_pending());
        assert!(futures::poll!(&mut second).is_pending());
        assert_eq!(loader.waiting_nodes(TWITTER_JS), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn unmount_drops_waiter_but_not_the_load() {
        let (host, open) = FakeHost::gated(false);
        let loader = ScriptLoader::new(host.clone(), Duration::from_secs(5));
        let mount = loader.mount("a");
        {
            let pending = loader.ensure_loaded(TWITTER_JS, &mount);
            tokio::pin!(pending);
            assert!(futures::poll!(&mut pending).is_pending());
        }
        drop(mount);
        assert!(loader.waiting_nodes(TWITTER_JS).is_empty());
        assert_eq!(loader.status(TWITTER_JS), LoadStatus::Loading);

        open.send(true).unwrap();
        loader.ensure_loaded(TWITTER_JS, &loader.mount("b")).await.unwrap();
        assert_eq!(loader.status(TWITTER_JS), LoadStatus::Loaded);
        assert_eq!(host.injected().len(), 1);
    }

    #[tokio::test]
    async fn mounts_sharing_a_node_id_keep_their_own_waiters() {
        let (host, _open) = FakeHost::gated(false);
        let loader = ScriptLoader::new(host, Duration::from_secs(5));
        let (first, second) = (loader.mount("same"), loader.mount("same"));
        {
            let a = loader.ensure_loaded(TWITTER_JS, &first);
            let b = loader.ensure_loaded(TWITTER_JS, &second);
            tokio::pin!(a, b);
            assert!(futures::poll!(&mut a).is_pending());
            assert!(futures::poll!(&mut b).is_pending());
        }
        assert_eq!(loader.waiting_nodes(TWITTER_JS), vec!["same", "same"]);

        drop(first);
        assert_eq!(loader.waiting_nodes(TWITTER_JS), vec!["same"]);
        drop(second);
        assert!(loader.waiting_nodes(TWITTER_JS).is_empty());
    }

    #[tokio::test]
    async fn render_invokes_hook_for_the_mounted_node() {
        let (host, open) = FakeHost::gated(false);
        open.send(true).unwrap();
        let loader = ScriptLoader::new(host.clone(), Duration::from_secs(5));
        let mount = loader.mount("embed-1");
        let out = loader.render_into(&mount, &widget(), "https://x.com/a/status/1").await;
        assert_eq!(out, widget());
        assert_eq!(
            host.hooks.lock().unwrap().clone(),
            vec![("twttr.widgets.load".to_string(), "embed-1".to_string())]
        );
    }

    #[tokio::test]
    async fn timeout_falls_back_to_static_card() {
        let (host, _open) = FakeHost::gated(false);
        let loader = ScriptLoader::new(host.clone(), Duration::from_millis(30));
        let mount = loader.mount("slow");
        let link = "https://x.com/a/status/1";
        let out = loader.render_into(&mount, &widget(), link).await;
        assert_eq!(out, EmbedDescriptor::link_out("This embed could not be loaded", "View externally", link));
        assert!(loader.waiting_nodes(TWITTER_JS).is_empty());
        assert!(host.hooks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_load_is_terminal() {
        let (host, open) = FakeHost::gated(true);
        open.send(true).unwrap();
        let loader = ScriptLoader::new(host.clone(), Duration::from_secs(5));
        let mount = loader.mount("n");
        let out = loader.render_into(&mount, &widget(), "https://x.com/a/status/1").await;
        assert!(matches!(out, EmbedDescriptor::StaticCard { .. }));
        assert_eq!(loader.status(TWITTER_JS), LoadStatus::Failed);
        assert!(loader.ensure_loaded(TWITTER_JS, &loader.mount("m")).await.is_err());
        assert_eq!(host.injected().len(), 1);
    }

    #[tokio::test]
    async fn non_widget_descriptors_pass_through() {
        let (host, _open) = FakeHost::gated(false);
        let loader = ScriptLoader::new(host.clone(), Duration::from_millis(10));
        let mount = loader.mount("x");
        let iframe = EmbedDescriptor::Iframe { src: "https://www.youtube.com/embed/dQw4w9WgXcQ".into(), title: "t".into() };
        assert_eq!(loader.render_into(&mount, &iframe, "").await, iframe);
        assert!(host.injected().is_empty());
    }
}
