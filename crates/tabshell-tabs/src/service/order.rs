//! Selection, ordering and pinning.

use std::sync::Arc;

use tabshell_common::{ShellEvent, TabId};
use tracing::{debug, warn};

use crate::tab::TabLifecycle;

use super::{reindex, records_for, TabsService};

impl TabsService {
    /// Select `id` and show its View.
    pub async fn activate_tab(&self, id: &TabId) -> bool {
        let view = {
            let mut state = self.lock();
            let Some(view) = state.tabs.get(id).map(|e| Arc::clone(&e.tab.view)) else {
                drop(state);
                warn!(tab_id = %id, "activate of unknown tab");
                return false;
            };
            let previous = state.strip.active().cloned().filter(|p| p != id);
            state.strip.set_active(id);
            if let Some(previous) = previous {
                if let Some(entry) = state.tabs.get_mut(&previous) {
                    entry.tab.lifecycle = TabLifecycle::Inactive;
                }
            }
            if let Some(entry) = state.tabs.get_mut(id) {
                entry.tab.lifecycle = TabLifecycle::Active;
            }
            view
        };

        if !self.inner.views.activate(view.id()) {
            warn!(tab_id = %id, view_id = %view.id(), "tab selected but its view could not be shown");
        }
        self.persist_active(Some(id)).await;
        self.inner.bus.publish(ShellEvent::TabActivated(id.clone()));
        true
    }

    /// Select the tab after the current one, wrapping around.
    pub async fn select_next(&self) -> Option<TabId> {
        let next = self.lock().strip.cycle_next().cloned()?;
        self.activate_tab(&next).await;
        Some(next)
    }

    /// Select the tab before the current one, wrapping around.
    pub async fn select_prev(&self) -> Option<TabId> {
        let prev = self.lock().strip.cycle_prev().cloned()?;
        self.activate_tab(&prev).await;
        Some(prev)
    }

    /// Move `id` to `new_index`, clamped to the strip.
    ///
    /// Every tab whose index changed is written back. A failed write is
    /// logged and the in-memory order kept.
    pub async fn reorder_tab(&self, id: &TabId, new_index: usize) -> bool {
        let (records, to) = {
            let mut state = self.lock();
            let Some(to) = state.strip.move_to(id, new_index) else {
                drop(state);
                warn!(tab_id = %id, "reorder of unknown tab");
                return false;
            };
            let changed = reindex(&mut state);
            (records_for(&state, &changed), to)
        };

        debug!(tab_id = %id, to, changed = records.len(), "tab reordered");
        self.write_records(records).await;
        self.inner.bus.publish(ShellEvent::TabsReordered);
        true
    }

    pub async fn set_pinned(&self, id: &TabId, pinned: bool) -> bool {
        let record = {
            let mut state = self.lock();
            let Some(entry) = state.tabs.get_mut(id) else {
                drop(state);
                warn!(tab_id = %id, "pin of unknown tab");
                return false;
            };
            if entry.tab.pinned == pinned {
                return true;
            }
            entry.tab.pinned = pinned;
            entry.tab.touch();
            entry.tab.record()
        };
        self.write_records(vec![record]).await;
        true
    }
}
