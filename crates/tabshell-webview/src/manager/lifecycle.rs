//! Creation, pooling and teardown of Views.

use std::sync::Arc;

use tabshell_common::{DestinationClass, InternalRoute, ShellEvent, ViewId};
use tracing::{debug, info, warn};

use crate::view::{View, ViewState};

use super::{ViewData, ViewManager};

impl ViewManager {
    /// Create and register a View for `data`.
    ///
    /// Unless `fresh` is set or `data` carries history to replay, a pooled
    /// View of the same destination class is reused: its state is set
    /// optimistically, the load is issued on the live surface and one
    /// refill is scheduled. Otherwise a cold View is returned.
    pub fn create(&self, mut data: ViewData, fresh: bool) -> Arc<View> {
        let class = DestinationClass::of(&data.url);
        let route_resource = match InternalRoute::parse(&data.url) {
            Some(InternalRoute::Resource(id)) => Some(id),
            _ => None,
        };
        if data.resource_id.is_none() {
            data.resource_id = route_resource.clone();
        }
        let needs_title = data.title.is_none();
        let url = data.url.clone();

        let pooled = if !fresh && data.history.is_empty() {
            self.lock().pool.take(class)
        } else {
            None
        };

        let view = match pooled {
            Some(view) => {
                let next = data.into_state();
                view.modify(|s| {
                    s.url = next.url;
                    s.title = next.title;
                    s.favicon = next.favicon;
                    s.history = next.history;
                    s.resource_id = next.resource_id;
                    s.detected_app = None;
                    s.dom_ready = false;
                    s.did_finish_load = false;
                });
                view.load_programmatic(&url);
                debug!(view_id = %view.id(), url = %url, ?class, "reused pooled view");
                self.schedule_refill(class);
                view
            }
            None => {
                let view = self.new_view(data.into_state());
                debug!(view_id = %view.id(), url = %url, fresh, "created cold view");
                view
            }
        };

        self.lock()
            .views
            .insert(view.id().clone(), Arc::clone(&view));
        self.inner.bus.publish(ShellEvent::ViewCreated(view.id().clone()));

        if let (true, Some(resource_id)) = (needs_title, route_resource) {
            self.resolve_content_title(&view, resource_id);
        }
        view
    }

    /// Destroy and unregister. Unknown ids return `false`.
    pub fn destroy(&self, id: &ViewId) -> bool {
        let (view, was_sidebar) = {
            let mut state = self.lock();
            let Some(view) = state.views.remove(id) else {
                drop(state);
                warn!(view_id = %id, "destroy of unknown view");
                return false;
            };
            if state.active.as_ref() == Some(id) {
                state.active = None;
            }
            let was_sidebar = state.sidebar.as_ref() == Some(id);
            if was_sidebar {
                state.sidebar = None;
            }
            state.overlays.remove(id);
            state.hidden_for_exclusive.retain(|hidden| hidden != id);
            (view, was_sidebar)
        };

        view.destroy();
        self.inner.bus.publish(ShellEvent::ViewDeleted(id.clone()));
        if was_sidebar {
            self.inner
                .bus
                .publish(ShellEvent::SidebarChanged { open: false });
        }
        true
    }

    /// Fill the pools of every destination class. Returns entries added.
    pub fn prewarm(&self) -> usize {
        DestinationClass::ALL
            .into_iter()
            .map(|class| self.refill(class))
            .sum()
    }

    /// Schedule one asynchronous refill of `class`.
    ///
    /// Without a runtime the refill runs inline.
    pub(crate) fn schedule_refill(&self, class: DestinationClass) {
        {
            let mut state = self.lock();
            if state.shutting_down {
                return;
            }
            state.pool.note_refill_scheduled();
        }

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let manager = self.clone();
                runtime.spawn(async move {
                    manager.refill(class);
                });
            }
            Err(_) => {
                self.refill(class);
            }
        }
    }

    /// Preload Views until `class` is at capacity.
    pub(crate) fn refill(&self, class: DestinationClass) -> usize {
        let deficit = {
            let state = self.lock();
            if state.shutting_down {
                return 0;
            }
            state.pool.deficit(class)
        };

        let mut added = 0;
        for _ in 0..deficit {
            let blank = class.blank_url();
            let view = self.new_view(ViewState::with_url(blank));
            if let Err(e) = view.preload(self.surface_options(blank, false)) {
                warn!(?class, error = %e, "pool refill failed");
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

        if added > 0 {
            debug!(?class, added, "refilled view pool");
        }
        added
    }

    fn resolve_content_title(&self, view: &Arc<View>, resource_id: String) {
        let Some(content) = self.inner.content.clone() else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!(resource_id = %resource_id, "no runtime, title left unresolved");
            return;
        };

        let view = Arc::clone(view);
        runtime.spawn(async move {
            match content.resolve(&resource_id).await {
                Ok(Some(meta)) => view.modify(|s| {
                    if s.title.is_empty() {
                        s.title = meta.title.clone();
                    }
                    if let Some(entry) = s.history.current_mut() {
                        if entry.title.is_empty() {
                            entry.title = meta.title;
                        }
                    }
                }),
                Ok(None) => debug!(resource_id = %resource_id, "resource not found"),
                Err(e) => warn!(resource_id = %resource_id, error = %e, "resource lookup failed"),
            }
        });
    }

    /// Destroy every pooled and registered View. Later refills are no-ops.
    pub fn shutdown(&self) {
        let (views, pooled) = {
            let mut state = self.lock();
            state.shutting_down = true;
            state.active = None;
            state.sidebar = None;
            state.overlays.clear();
            state.hidden_for_exclusive.clear();
            let views: Vec<Arc<View>> = state.views.drain().map(|(_, v)| v).collect();
            (views, state.pool.drain())
        };

        for view in pooled.iter().chain(views.iter()) {
            view.destroy();
        }
        info!(views = views.len(), pooled = pooled.len(), "view manager shut down");
    }
}
