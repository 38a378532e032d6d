//! Opening tabs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tabshell_common::{canonical_url, Debouncer, ShellEvent, TabId};
use tabshell_webview::{View, ViewContainer, ViewData};
use tracing::{debug, warn};

use crate::tab::{Tab, TabLifecycle};

use super::{reindex, records_for, TabEntry, TabOptions, TabsService};

impl TabsService {
    /// Open `url` in a new tab backed by a pooled or fresh View.
    pub async fn create(&self, url: &str, opts: TabOptions) -> Option<TabId> {
        if self.lock().shutting_down {
            warn!(url, "tab creation during shutdown ignored");
            return None;
        }
        let view = self.inner.views.create(ViewData::with_url(url), opts.fresh);
        self.create_with_view(view, opts).await
    }

    /// Adopt an existing View, e.g. one moved out of the side panel.
    pub async fn create_with_view(&self, view: Arc<View>, opts: TabOptions) -> Option<TabId> {
        self.insert_tab(TabId::new(), view, opts, None).await
    }

    /// Select the tab already showing `url` (canonically), or open one.
    pub async fn open_or_create(&self, url: &str, opts: TabOptions) -> Option<TabId> {
        let target = canonical_url(url);
        let existing = {
            let state = self.lock();
            state
                .strip
                .ids()
                .iter()
                .find(|id| {
                    state
                        .tabs
                        .get(*id)
                        .is_some_and(|e| canonical_url(&e.tab.url()) == target)
                })
                .cloned()
        };

        match existing {
            Some(id) => {
                debug!(tab_id = %id, url, "reusing tab with same destination");
                if opts.active {
                    self.activate_tab(&id).await;
                }
                Some(id)
            }
            None => self.create(url, opts).await,
        }
    }

    pub(super) async fn insert_tab(
        &self,
        id: TabId,
        view: Arc<View>,
        opts: TabOptions,
        created_at: Option<DateTime<Utc>>,
    ) -> Option<TabId> {
        view.set_container(ViewContainer::Tab);
        let mut tab = Tab::new(id.clone(), Arc::clone(&view));
        tab.pinned = opts.pinned;
        if let Some(created_at) = created_at {
            tab.created_at = created_at;
        }
        if !opts.active {
            tab.lifecycle = TabLifecycle::MarkedForLoad;
        }

        let persist = Arc::new(Debouncer::new(self.debounce_window()));
        let (records, index) = {
            let mut state = self.lock();
            if state.shutting_down {
                return None;
            }
            let active_pinned = state
                .strip
                .active()
                .and_then(|active| state.tabs.get(active))
                .is_some_and(|e| e.tab.pinned);
            let at = opts
                .index
                .unwrap_or_else(|| state.strip.insertion_index(active_pinned));
            let index = state.strip.insert(at, id.clone());
            tab.index = index;
            state.tabs.insert(
                id.clone(),
                TabEntry {
                    tab,
                    watcher: None,
                    persist: Arc::clone(&persist),
                },
            );
            let mut changed = reindex(&mut state);
            changed.push(id.clone());
            (records_for(&state, &changed), index)
        };

        let watcher = self.spawn_watcher(&id, &view, &persist);
        if let Some(entry) = self.lock().tabs.get_mut(&id) {
            entry.watcher = watcher;
        }

        self.write_records(records).await;
        debug!(tab_id = %id, view_id = %view.id(), index, active = opts.active, "tab created");
        self.inner.bus.publish(ShellEvent::TabCreated(id.clone()));

        if opts.active {
            self.activate_tab(&id).await;
        }
        Some(id)
    }
}
