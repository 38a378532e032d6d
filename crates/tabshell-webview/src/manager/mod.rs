//! View orchestration.
//!
//! `ViewManager` owns the registry of Views, keeps a pool of preloaded
//! surfaces per destination class, and is the one place that enforces
//! "at most one shown non-exempt surface".

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tabshell_common::{EventBus, InflightMap, ViewId};
use tabshell_config::ViewsConfig;

use crate::bridge::{HostBridge, SurfaceOptions};
use crate::content::ContentStore;
use crate::pool::ViewPool;
use crate::view::View;

mod activation;
mod handlers;
mod lifecycle;
mod types;


pub use types::{ViewData, ViewIntent};

/// Cheap to clone; clones share the same registry.
#[derive(Clone)]
pub struct ViewManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    host: Arc<dyn HostBridge>,
    bus: EventBus,
    content: Option<Arc<dyn ContentStore>>,
    config: ViewsConfig,
    state: Mutex<ManagerState>,
    /// Bookmark saves in flight, keyed by canonical URL.
    bookmarks: InflightMap<String, Option<String>>,
}

struct ManagerState {
    views: HashMap<ViewId, Arc<View>>,
    active: Option<ViewId>,
    sidebar: Option<ViewId>,
    /// Parent View id -> overlay shown on top of it.
    overlays: HashMap<ViewId, Arc<View>>,
    exclusive: HashSet<String>,
    /// Views hidden because of exclusivity, restored on release.
    hidden_for_exclusive: Vec<ViewId>,
    pool: ViewPool,
    shutting_down: bool,
}

impl ViewManager {
    pub fn new(host: Arc<dyn HostBridge>, bus: EventBus, config: ViewsConfig) -> Self {
        Self::build(host, bus, config, None)
    }

    /// Like [`new`](Self::new), resolving `tabshell://resource/` titles and
    /// bookmarks through `content`.
    pub fn with_content_store(
        host: Arc<dyn HostBridge>,
        bus: EventBus,
        config: ViewsConfig,
        content: Arc<dyn ContentStore>,
    ) -> Self {
        Self::build(host, bus, config, Some(content))
    }

    fn build(
        host: Arc<dyn HostBridge>,
        bus: EventBus,
        config: ViewsConfig,
        content: Option<Arc<dyn ContentStore>>,
    ) -> Self {
        let pool = ViewPool::new(config.pool_size as usize);
        Self {
            inner: Arc::new(ManagerInner {
                host,
                bus,
                content,
                config,
                state: Mutex::new(ManagerState {
                    views: HashMap::new(),
                    active: None,
                    sidebar: None,
                    overlays: HashMap::new(),
                    exclusive: HashSet::new(),
                    hidden_for_exclusive: Vec::new(),
                    pool,
                    shutting_down: false,
                }),
                bookmarks: InflightMap::new(),
            }),
        }
    }

    pub fn host(&self) -> &Arc<dyn HostBridge> {
        &self.inner.host
    }

    pub fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    pub fn config(&self) -> &ViewsConfig {
        &self.inner.config
    }

    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.inner.config.readiness_timeout_ms))
    }

    pub fn get(&self, id: &ViewId) -> Option<Arc<View>> {
        self.lock().views.get(id).cloned()
    }

    pub fn contains(&self, id: &ViewId) -> bool {
        self.lock().views.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().views.is_empty()
    }

    pub fn view_ids(&self) -> Vec<ViewId> {
        self.lock().views.keys().cloned().collect()
    }

    pub fn active_id(&self) -> Option<ViewId> {
        self.lock().active.clone()
    }

    pub fn active_view(&self) -> Option<Arc<View>> {
        let state = self.lock();
        state.active.as_ref().and_then(|id| state.views.get(id).cloned())
    }

    /// Registered Views currently shown, in no particular order.
    pub fn shown_views(&self) -> Vec<Arc<View>> {
        self.lock()
            .views
            .values()
            .filter(|v| v.is_shown())
            .cloned()
            .collect()
    }

    pub fn pool_len(&self, class: tabshell_common::DestinationClass) -> usize {
        self.lock().pool.len(class)
    }

    pub fn refills_scheduled(&self) -> usize {
        self.lock().pool.refills_scheduled()
    }

    /// Surface options for a new surface in the shared session partition.
    pub(crate) fn surface_options(&self, url: &str, activate: bool) -> SurfaceOptions {
        SurfaceOptions {
            url: url.to_string(),
            partition: self.inner.config.partition.clone(),
            user_agent: self.inner.config.user_agent.clone(),
            bounds: None,
            activate,
            permanently_active: false,
            history: None,
        }
    }

    pub(crate) fn new_view(&self, state: crate::view::ViewState) -> Arc<View> {
        Arc::new(View::new(
            Arc::clone(&self.inner.host),
            self.readiness_timeout(),
            state,
        ))
    }

    fn lock(&self) -> MutexGuard<'_, ManagerState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
