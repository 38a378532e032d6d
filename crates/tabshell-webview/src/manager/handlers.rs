//! Host event routing and content-store hooks.

use tabshell_common::{canonical_url, ShellEvent, ViewId};
use tracing::{debug, warn};

use crate::events::HostEvent;
use crate::view::BindingSignal;

use super::{ViewIntent, ViewManager};

impl ViewManager {
    /// Apply one host event to the View it names.
    ///
    /// Events for unknown ids are dropped. Signals the orchestrator cannot
    /// act on are returned as an intent for the layer above.
    pub fn handle_host_event(&self, event: &HostEvent) -> Option<ViewIntent> {
        let (view, registered) = {
            let state = self.lock();
            match state.views.get(&event.view_id) {
                Some(view) => (view.clone(), true),
                None => match state.pool.get(&event.view_id) {
                    Some(view) => (view, false),
                    None => {
                        drop(state);
                        debug!(view_id = %event.view_id, event = event.kind.name(), "event for unknown view dropped");
                        return None;
                    }
                },
            }
        };

        let update = view.handle_event(&event.kind);
        if !registered {
            return None;
        }
        if update.changed {
            self.inner
                .bus
                .publish(ShellEvent::ViewDataChanged(event.view_id.clone()));
        }

        let mut intent = None;
        for signal in update.signals {
            match signal {
                BindingSignal::Visited(url) => {
                    debug!(view_id = %event.view_id, url = %url, "visited");
                }
                BindingSignal::NewWindow { url, disposition } => {
                    let active = disposition.is_foreground();
                    self.inner.bus.publish(ShellEvent::NewWindowRequest {
                        source: event.view_id.clone(),
                        url: url.clone(),
                        active,
                    });
                    intent = Some(ViewIntent::OpenTab {
                        source: event.view_id.clone(),
                        url,
                        active,
                    });
                }
                BindingSignal::PageMessage(message) => {
                    intent = Some(ViewIntent::PageMessage {
                        view_id: event.view_id.clone(),
                        message,
                    });
                }
                BindingSignal::SurfaceGone => {
                    warn!(view_id = %event.view_id, "surface lost, will remount on next activation");
                }
            }
        }
        intent
    }

    /// Save the View's page to the content store and link the View to the
    /// resulting resource. Concurrent calls for the same canonical URL share
    /// one save.
    pub async fn bookmark_page(&self, id: &ViewId) -> Option<String> {
        let Some(content) = self.inner.content.clone() else {
            warn!(view_id = %id, "bookmark without a content store");
            return None;
        };
        let Some(view) = self.get(id) else {
            warn!(view_id = %id, "bookmark of unknown view");
            return None;
        };

        let state = view.state();
        let key = canonical_url(&state.url);
        let store = content.clone();
        let resource = self
            .inner
            .bookmarks
            .run(key, move || async move {
                match store.save_page(&state.url, &state.title).await {
                    Ok(resource_id) => Some(resource_id),
                    Err(e) => {
                        warn!(url = %state.url, error = %e, "saving page failed");
                        None
                    }
                }
            })
            .await?;

        view.modify(|s| s.resource_id = Some(resource.clone()));
        if let Err(e) = content.set_view_resource(id, Some(&resource)).await {
            warn!(view_id = %id, error = %e, "linking view to resource failed");
        }
        Some(resource)
    }

    /// Unlink the View from its resource.
    pub async fn clear_resource(&self, id: &ViewId) -> bool {
        let Some(view) = self.get(id) else {
            warn!(view_id = %id, "clear_resource of unknown view");
            return false;
        };
        let had = view.state().resource_id.is_some();
        view.modify(|s| s.resource_id = None);

        if let Some(content) = &self.inner.content {
            if let Err(e) = content.set_view_resource(id, None).await {
                warn!(view_id = %id, error = %e, "unlinking view from resource failed");
            }
        }
        had
    }
}
