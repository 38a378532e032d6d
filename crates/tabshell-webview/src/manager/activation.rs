//! Activation, exclusivity, side panel and overlay indirection.

use std::sync::Arc;

use tabshell_common::{ShellEvent, ViewId};
use tracing::{debug, warn};

use crate::view::{View, ViewContainer};

use super::ViewManager;

impl ViewManager {
    /// Show `id` and hide every other shown non-exempt View.
    ///
    /// An overlay registered on `id` is activated instead. Cold Views are
    /// mounted first. While surfaces are held hidden the View becomes
    /// active but is only shown on release.
    pub fn activate(&self, id: &ViewId) -> bool {
        let (target, others, held) = {
            let state = self.lock();
            if let Some(overlay) = state.overlays.get(id).cloned() {
                drop(state);
                debug!(view_id = %id, overlay_id = %overlay.id(), "activating overlay instead");
                return overlay.show();
            }
            let Some(target) = state.views.get(id).cloned() else {
                drop(state);
                warn!(view_id = %id, "activate of unknown view");
                return false;
            };
            let others: Vec<Arc<View>> = state
                .views
                .values()
                .filter(|v| v.id() != id)
                .cloned()
                .collect();
            (target, others, !state.exclusive.is_empty())
        };

        if !target.is_hot() || target.has_relocation_guard() {
            let url = mount_url(&target);
            if let Err(e) = target.mount(self.surface_options(&url, false)) {
                warn!(view_id = %id, error = %e, "activate failed to mount view");
                return false;
            }
        }

        let exempt = target.is_permanently_active();
        if !exempt {
            for other in others
                .iter()
                .filter(|v| v.is_shown() && !v.is_permanently_active())
            {
                other.hide();
            }
        }

        {
            let mut state = self.lock();
            if !exempt {
                state.active = Some(id.clone());
            }
            if held {
                let views = &state.views;
                let keep: Vec<ViewId> = state
                    .hidden_for_exclusive
                    .iter()
                    .filter(|hidden| {
                        exempt
                            || views
                                .get(*hidden)
                                .is_some_and(|v| v.is_permanently_active())
                    })
                    .cloned()
                    .collect();
                state.hidden_for_exclusive = keep;
                if !state.hidden_for_exclusive.contains(id) {
                    state.hidden_for_exclusive.push(id.clone());
                }
            }
        }

        if !held {
            target.show();
        }
        debug!(view_id = %id, exempt, held, "activated view");
        self.inner.bus.publish(ShellEvent::ViewActivated(id.clone()));
        true
    }

    /// Whether any exclusivity reason is holding surfaces hidden.
    pub fn surfaces_hidden(&self) -> bool {
        !self.lock().exclusive.is_empty()
    }

    /// Hide every shown surface while `reason` is held.
    ///
    /// On the first reason the active surface is captured into its
    /// `snapshot` before hiding. Returns whether surfaces were hidden now.
    pub async fn request_exclusive(&self, reason: impl Into<String>) -> bool {
        let reason = reason.into();
        let first = {
            let mut state = self.lock();
            let was_empty = state.exclusive.is_empty();
            state.exclusive.insert(reason.clone());
            was_empty
        };
        if !first {
            debug!(reason = %reason, "exclusivity already held");
            return false;
        }

        let active = self.active_view();
        if let Some(view) = &active {
            let snapshot = view.capture_snapshot().await;
            view.set_snapshot(snapshot);
        }

        let shown = {
            let mut state = self.lock();
            if state.exclusive.is_empty() {
                None
            } else {
                let shown: Vec<Arc<View>> = state
                    .views
                    .values()
                    .filter(|v| v.is_shown())
                    .cloned()
                    .collect();
                for view in &shown {
                    if !state.hidden_for_exclusive.contains(view.id()) {
                        state.hidden_for_exclusive.push(view.id().clone());
                    }
                }
                Some(shown)
            }
        };

        let Some(shown) = shown else {
            // Released while capturing.
            if let Some(view) = active {
                view.set_snapshot(None);
            }
            return false;
        };

        for view in &shown {
            view.hide();
        }
        debug!(reason = %reason, hidden = shown.len(), "surfaces hidden");
        true
    }

    /// Drop `reason`. When none remain, hidden surfaces are shown again and
    /// snapshots cleared. Returns whether surfaces were restored.
    pub fn release_exclusive(&self, reason: &str) -> bool {
        let (views, all) = {
            let mut state = self.lock();
            if !state.exclusive.remove(reason) {
                drop(state);
                debug!(reason, "release of unknown exclusivity reason");
                return false;
            }
            if !state.exclusive.is_empty() {
                return false;
            }
            let ids = std::mem::take(&mut state.hidden_for_exclusive);
            let active = state.active.clone();
            let mut views: Vec<Arc<View>> = ids
                .iter()
                .filter_map(|id| state.views.get(id).cloned())
                .collect();
            // Active surface last so it ends up on top.
            views.sort_by_key(|v| Some(v.id()) == active.as_ref());
            let all: Vec<Arc<View>> = state.views.values().cloned().collect();
            (views, all)
        };

        for view in &views {
            view.show();
        }
        for view in &all {
            view.set_snapshot(None);
        }
        debug!(restored = views.len(), "surfaces restored");
        true
    }

    // -- Side panel --

    pub fn sidebar_id(&self) -> Option<ViewId> {
        self.lock().sidebar.clone()
    }

    pub fn sidebar_view(&self) -> Option<Arc<View>> {
        let state = self.lock();
        state.sidebar.as_ref().and_then(|id| state.views.get(id).cloned())
    }

    /// Show `id` in the side panel, exempt from single-active enforcement.
    /// A different View already in the panel is destroyed.
    pub fn open_sidebar(&self, id: &ViewId) -> bool {
        let (view, previous) = {
            let state = self.lock();
            let Some(view) = state.views.get(id).cloned() else {
                drop(state);
                warn!(view_id = %id, "open_sidebar for unknown view");
                return false;
            };
            let previous = state.sidebar.clone().filter(|current| current != id);
            (view, previous)
        };
        if previous.is_some() {
            self.close_sidebar(true);
        }

        view.change_permanently_active(true);
        view.set_container(ViewContainer::Sidebar);
        if !view.is_hot() || view.has_relocation_guard() {
            let url = mount_url(&view);
            let mut options = self.surface_options(&url, false);
            options.permanently_active = true;
            if let Err(e) = view.mount(options) {
                warn!(view_id = %id, error = %e, "side panel failed to mount view");
                return false;
            }
        }

        let held = {
            let mut state = self.lock();
            state.sidebar = Some(id.clone());
            if state.active.as_ref() == Some(id) {
                state.active = None;
            }
            let held = !state.exclusive.is_empty();
            if held && !state.hidden_for_exclusive.contains(id) {
                state.hidden_for_exclusive.push(id.clone());
            }
            held
        };
        if !held {
            view.show();
        }

        debug!(view_id = %id, "side panel opened");
        self.inner
            .bus
            .publish(ShellEvent::SidebarChanged { open: true });
        true
    }

    /// Empty the side panel. The View is destroyed, or hidden, unmounted and
    /// kept registered for reparenting. A relocating View keeps its surface.
    pub fn close_sidebar(&self, destroy: bool) -> Option<ViewId> {
        let id = self.lock().sidebar.take()?;
        let view = self.get(&id);

        if let Some(view) = &view {
            view.change_permanently_active(false);
        }
        if destroy {
            self.destroy(&id);
        } else if let Some(view) = view {
            view.hide();
            view.set_container(ViewContainer::None);
            view.unmount();
        }

        debug!(view_id = %id, destroy, "side panel closed");
        self.inner
            .bus
            .publish(ShellEvent::SidebarChanged { open: false });
        Some(id)
    }

    // -- Overlay indirection --

    /// Activating `parent` will activate `overlay` until cleared.
    pub fn set_overlay(&self, parent: &ViewId, overlay: Arc<View>) {
        self.lock().overlays.insert(parent.clone(), overlay);
    }

    pub fn overlay_for(&self, parent: &ViewId) -> Option<Arc<View>> {
        self.lock().overlays.get(parent).cloned()
    }

    pub fn clear_overlay(&self, parent: &ViewId) -> Option<Arc<View>> {
        self.lock().overlays.remove(parent)
    }

    /// Remove every indirection pointing at `overlay_id`.
    pub fn clear_overlay_view(&self, overlay_id: &ViewId) -> usize {
        let mut state = self.lock();
        let before = state.overlays.len();
        state.overlays.retain(|_, overlay| overlay.id() != overlay_id);
        before - state.overlays.len()
    }
}

/// URL to load when a cold View is mounted.
fn mount_url(view: &View) -> String {
    let state = view.state();
    if !state.url.is_empty() {
        return state.url;
    }
    state
        .history
        .current()
        .map(|entry| entry.url.clone())
        .unwrap_or_else(|| "about:blank".to_string())
}
