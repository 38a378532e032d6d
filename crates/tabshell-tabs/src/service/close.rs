//! Closing, deleting and reopening tabs.

use tabshell_common::{ShellEvent, TabId, Table};
use tracing::{debug, warn};

use crate::tab::{Tab, TabLifecycle, TabRecord};

use super::{reindex, records_for, TabOptions, TabsService};

/// A tab taken out of the strip, before its side effects are applied.
pub(super) struct Removed {
    pub(super) tab: Tab,
    pub(super) was_active: bool,
    pub(super) successor: Option<TabId>,
    pub(super) records: Vec<TabRecord>,
}

impl TabsService {
    /// The user-facing close gesture.
    ///
    /// Pinned tabs are never removed: if selected, the selection moves to
    /// the following tab, or the preceding one when none follows.
    pub async fn close_tab(&self, id: &TabId) -> bool {
        let Some(tab) = self.get(id) else {
            warn!(tab_id = %id, "close of unknown tab");
            return false;
        };
        if !tab.pinned {
            return self.delete(id).await;
        }

        let neighbor = {
            let state = self.lock();
            if state.strip.active() == Some(id) {
                state.strip.neighbor(id).cloned()
            } else {
                None
            }
        };
        debug!(tab_id = %id, neighbor = ?neighbor, "pinned tab kept on close");
        if let Some(neighbor) = neighbor {
            self.activate_tab(&neighbor).await;
        }
        true
    }

    /// Remove a tab and destroy its View, keeping its record for
    /// [`reopen_last_closed`](Self::reopen_last_closed).
    pub async fn delete(&self, id: &TabId) -> bool {
        let Some(mut removed) = self.take_tab(id) else {
            warn!(tab_id = %id, "delete of unknown tab");
            return false;
        };
        removed.tab.lifecycle = TabLifecycle::Closed;
        let record = removed.tab.record();
        if let Some(evicted) = self.lock().closed.push(record) {
            debug!(tab_id = %evicted.id, "closed-tab stack full, oldest dropped");
        }

        self.inner.views.destroy(removed.tab.view_id());
        self.finish_removal(removed).await;
        true
    }

    /// Resurrect the most recently deleted tab with its View configuration.
    pub async fn reopen_last_closed(&self) -> Option<TabId> {
        let record = {
            let mut state = self.lock();
            if state.shutting_down {
                return None;
            }
            state.closed.pop()
        };
        let Some(record) = record else {
            debug!("no closed tab to reopen");
            return None;
        };

        let id = if self.contains(&record.id) {
            TabId::new()
        } else {
            record.id.clone()
        };
        let view = self.inner.views.create(record.view.to_view_data(), false);
        let opts = TabOptions {
            active: true,
            pinned: record.pinned,
            index: Some(record.index),
            fresh: false,
        };
        self.insert_tab(id, view, opts, Some(record.created_at)).await
    }

    /// Take `id` out of the strip without touching its View.
    pub(super) fn take_tab(&self, id: &TabId) -> Option<Removed> {
        let mut state = self.lock();
        let was_active = state.strip.active() == Some(id);
        let index = state.strip.remove(id)?;
        let entry = state.tabs.remove(id)?;
        entry.release();

        let successor = if was_active {
            state.strip.successor(index).cloned()
        } else {
            None
        };
        let changed = reindex(&mut state);
        let records = records_for(&state, &changed);
        Some(Removed {
            tab: entry.tab,
            was_active,
            successor,
            records,
        })
    }

    /// Persist, publish and reselect after a removal. An empty strip gets a
    /// fresh default tab.
    pub(super) async fn finish_removal(&self, removed: Removed) {
        let id = removed.tab.id.clone();
        if let Err(e) = self.inner.store.delete(Table::Tabs, id.as_str()).await {
            warn!(tab_id = %id, error = %e, "failed to delete tab record");
        }
        self.write_records(removed.records).await;
        self.inner.bus.publish(ShellEvent::TabDeleted(id.clone()));
        debug!(tab_id = %id, was_active = removed.was_active, "tab removed");

        let (empty, shutting_down) = {
            let state = self.lock();
            (state.strip.is_empty(), state.shutting_down)
        };
        if shutting_down {
            return;
        }
        if empty {
            let url = self.inner.config.default_url.clone();
            self.create(&url, TabOptions::default()).await;
        } else if let Some(successor) = removed.successor {
            self.activate_tab(&successor).await;
        }
    }
}
