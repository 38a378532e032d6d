//! Floating overlay surfaces.
//!
//! Overlays are permanently active Views kept in their own registry,
//! separate from the ViewManager's. They are pre-warmed like regular
//! Views, dismissed by a click outside their bounds, and never persisted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tabshell_common::{is_same_destination, DestinationClass, Point, Rect, ViewId};
use tabshell_config::OverlayConfig;
use tracing::{debug, info, warn};

use crate::events::HostEvent;
use crate::manager::ViewManager;
use crate::pool::ViewPool;
use crate::view::{
    BindingSignal, HistoryEntry, NavigationHistory, View, ViewContainer, ViewState,
};

struct OverlayEntry {
    view: Arc<View>,
    bounds: Rect,
    parent: Option<ViewId>,
}

struct OverlayState {
    overlays: HashMap<ViewId, OverlayEntry>,
    active: Option<ViewId>,
    pool: ViewPool,
    shutting_down: bool,
}

struct OverlayInner {
    manager: ViewManager,
    config: OverlayConfig,
    state: Mutex<OverlayState>,
}

/// Cheap to clone; clones share the same registry.
#[derive(Clone)]
pub struct OverlayPool {
    inner: Arc<OverlayInner>,
}

impl OverlayPool {
    pub fn new(manager: ViewManager, config: OverlayConfig) -> Self {
        let pool = ViewPool::new(config.pool_size as usize);
        Self {
            inner: Arc::new(OverlayInner {
                manager,
                config,
                state: Mutex::new(OverlayState {
                    overlays: HashMap::new(),
                    active: None,
                    pool,
                    shutting_down: false,
                }),
            }),
        }
    }

    /// Show an overlay for `url` at `bounds`, replacing the current one.
    ///
    /// With a `parent`, activating that View in the ViewManager activates
    /// the overlay instead until it is destroyed.
    pub fn open(&self, url: &str, bounds: Rect, parent: Option<&ViewId>) -> Option<Arc<View>> {
        let (previous, pooled) = {
            let mut state = self.lock();
            if state.shutting_down {
                return None;
            }
            (state.active.clone(), state.pool.take(DestinationClass::of(url)))
        };
        if let Some(previous) = previous {
            self.destroy(&previous);
        }

        let view = match pooled {
            Some(view) => {
                view.set_bounds(bounds);
                if !is_same_destination(&view.url(), url) {
                    let target = url.to_string();
                    view.modify(|s| {
                        s.url = target.clone();
                        s.title.clear();
                        s.history = NavigationHistory::single(HistoryEntry::new(target, ""));
                    });
                    view.load_programmatic(url);
                }
                self.schedule_refill(DestinationClass::of(url));
                debug!(view_id = %view.id(), url, "reused pooled overlay");
                view
            }
            None => {
                let view = self.inner.manager.new_view(ViewState::with_url(url));
                let mut options = self.inner.manager.surface_options(url, false);
                options.bounds = Some(bounds);
                options.permanently_active = true;
                if let Err(e) = view.mount(options) {
                    warn!(url, error = %e, "failed to open overlay");
                    view.destroy();
                    return None;
                }
                view
            }
        };

        view.change_permanently_active(true);
        view.set_container(ViewContainer::Overlay);
        view.show();

        {
            let mut state = self.lock();
            state.overlays.insert(
                view.id().clone(),
                OverlayEntry {
                    view: Arc::clone(&view),
                    bounds,
                    parent: parent.cloned(),
                },
            );
            state.active = Some(view.id().clone());
        }
        if let Some(parent) = parent {
            self.inner.manager.set_overlay(parent, Arc::clone(&view));
        }
        info!(view_id = %view.id(), url, "overlay opened");
        Some(view)
    }

    /// Dismiss the active overlay when `point` falls outside its bounds.
    pub fn handle_window_click(&self, point: Point) -> bool {
        let outside = {
            let state = self.lock();
            state
                .active
                .as_ref()
                .and_then(|id| state.overlays.get(id))
                .filter(|entry| !entry.bounds.contains(point))
                .map(|entry| entry.view.id().clone())
        };
        match outside {
            Some(id) => {
                debug!(view_id = %id, x = point.x, y = point.y, "click outside overlay");
                self.destroy(&id)
            }
            None => false,
        }
    }

    /// Destroy the active overlay, if any.
    pub fn close(&self) -> Option<ViewId> {
        let id = self.lock().active.clone()?;
        self.destroy(&id).then_some(id)
    }

    /// Fully release an overlay's surface and clear its indirection.
    pub fn destroy(&self, id: &ViewId) -> bool {
        let entry = {
            let mut state = self.lock();
            let Some(entry) = state.overlays.remove(id) else {
                drop(state);
                debug!(view_id = %id, "destroy of unknown overlay");
                return false;
            };
            if state.active.as_ref() == Some(id) {
                state.active = None;
            }
            entry
        };

        entry.view.destroy();
        let cleared = self.inner.manager.clear_overlay_view(id);
        debug!(view_id = %id, parent = ?entry.parent, cleared, "overlay destroyed");
        true
    }

    /// Route a host event to an overlay or pooled overlay surface.
    /// Returns whether the event was consumed here.
    pub fn handle_host_event(&self, event: &HostEvent) -> bool {
        let (view, registered) = {
            let state = self.lock();
            match state.overlays.get(&event.view_id) {
                Some(entry) => (Arc::clone(&entry.view), true),
                None => match state.pool.get(&event.view_id) {
                    Some(view) => (view, false),
                    None => return false,
                },
            }
        };

        let update = view.handle_event(&event.kind);
        let gone = update
            .signals
            .iter()
            .any(|signal| matches!(signal, BindingSignal::SurfaceGone));
        if gone && registered {
            warn!(view_id = %event.view_id, "overlay surface lost");
            self.destroy(&event.view_id);
        }
        true
    }

    pub fn contains(&self, id: &ViewId) -> bool {
        self.lock().overlays.contains_key(id)
    }

    pub fn active_id(&self) -> Option<ViewId> {
        self.lock().active.clone()
    }

    pub fn active_view(&self) -> Option<Arc<View>> {
        let state = self.lock();
        state
            .active
            .as_ref()
            .and_then(|id| state.overlays.get(id))
            .map(|entry| Arc::clone(&entry.view))
    }

    pub fn len(&self) -> usize {
        self.lock().overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().overlays.is_empty()
    }

    pub fn pool_len(&self) -> usize {
        self.lock().pool.len(self.pool_class())
    }

    pub fn refills_scheduled(&self) -> usize {
        self.lock().pool.refills_scheduled()
    }

    /// Preload overlay surfaces on the configured URL.
    pub fn prewarm(&self) -> usize {
        self.refill(self.pool_class())
    }

    /// Destroy every overlay and pooled surface. Later refills are no-ops.
    pub fn shutdown(&self) {
        let (overlays, pooled) = {
            let mut state = self.lock();
            state.shutting_down = true;
            state.active = None;
            let overlays: Vec<ViewId> = state.overlays.keys().cloned().collect();
            (overlays, state.pool.drain())
        };
        for id in &overlays {
            self.destroy(id);
        }
        for view in &pooled {
            view.destroy();
        }
        info!(overlays = overlays.len(), pooled = pooled.len(), "overlay pool shut down");
    }

    fn pool_class(&self) -> DestinationClass {
        DestinationClass::of(&self.inner.config.url)
    }

    fn schedule_refill(&self, class: DestinationClass) {
        {
            let mut state = self.lock();
            if state.shutting_down {
                return;
            }
            state.pool.note_refill_scheduled();
        }
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let overlays = self.clone();
                runtime.spawn(async move {
                    overlays.refill(class);
                });
            }
            Err(_) => {
                self.refill(class);
            }
        }
    }

    fn refill(&self, class: DestinationClass) -> usize {
        let deficit = {
            let state = self.lock();
            if state.shutting_down {
                return 0;
            }
            state.pool.deficit(class)
        };

        let url = if class == self.pool_class() {
            self.inner.config.url.as_str()
        } else {
            class.blank_url()
        };
        let mut added = 0;
        for _ in 0..deficit {
            let view = self.inner.manager.new_view(ViewState::with_url(url));
            let mut options = self.inner.manager.surface_options(url, false);
            options.permanently_active = true;
            if let Err(e) = view.preload(options) {
                warn!(?class, error = %e, "overlay pool refill failed");
                break;
            }
            let rejected = {
                let mut state = self.lock();
                if state.shutting_down {
                    Some(view)
                } else {
                    state.pool.put(class, view).err()
                }
            };
            if let Some(view) = rejected {
                view.destroy();
                break;
            }
            added += 1;
        }
        added
    }

    fn lock(&self) -> MutexGuard<'_, OverlayState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
