//! Record persistence and session restore.

use std::sync::Arc;

use serde_json::Value;
use tabshell_common::{Debouncer, Table, TabId};
use tabshell_webview::View;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::tab::TabRecord;

use super::{TabOptions, TabsService, TabsState, ACTIVE_TAB_KEY};

/// Current records of `ids`, skipping ids no longer present.
pub(super) fn records_for(state: &TabsState, ids: &[TabId]) -> Vec<TabRecord> {
    ids.iter()
        .filter_map(|id| state.tabs.get(id))
        .map(|entry| entry.tab.record())
        .collect()
}

impl TabsService {
    /// Write every tab record now, dropping pending debounced writes.
    pub async fn flush(&self) -> usize {
        let (records, active) = {
            let state = self.lock();
            for entry in state.tabs.values() {
                entry.persist.cancel();
            }
            let records: Vec<TabRecord> = state
                .strip
                .ids()
                .iter()
                .filter_map(|id| state.tabs.get(id))
                .map(|entry| entry.tab.record())
                .collect();
            (records, state.strip.active().cloned())
        };
        let count = records.len();
        self.write_records(records).await;
        self.persist_active(active.as_ref()).await;
        debug!(count, "tab records flushed");
        count
    }

    /// Recreate the tabs recorded in the store and reselect the recorded
    /// active tab. An empty store yields one default tab. Returns the
    /// number of tabs restored.
    pub async fn restore(&self) -> usize {
        let rows = match self.inner.store.list(Table::Tabs).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "failed to read tab records");
                Vec::new()
            }
        };
        let mut records: Vec<TabRecord> = rows
            .into_iter()
            .filter_map(|(key, value)| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(key = %key, error = %e, "skipping unreadable tab record");
                    None
                }
            })
            .collect();
        records.sort_by_key(|r: &TabRecord| r.index);

        let active = match self.inner.store.get(Table::Meta, ACTIVE_TAB_KEY).await {
            Ok(Some(value)) => serde_json::from_value::<TabId>(value).ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "failed to read active tab");
                None
            }
        };

        let mut restored = 0;
        for record in records {
            if self.contains(&record.id) {
                continue;
            }
            let view = self.inner.views.create(record.view.to_view_data(), false);
            let opts = TabOptions {
                active: false,
                pinned: record.pinned,
                index: None,
                fresh: false,
            };
            if self
                .insert_tab(record.id.clone(), view, opts, Some(record.created_at))
                .await
                .is_some()
            {
                restored += 1;
            }
        }

        let selected = active
            .filter(|id| self.contains(id))
            .or_else(|| self.ids().first().cloned());
        match selected {
            Some(id) => {
                self.activate_tab(&id).await;
            }
            None => {
                let url = self.inner.config.default_url.clone();
                self.create(&url, TabOptions::default()).await;
            }
        }
        info!(restored, "tabs restored");
        restored
    }

    /// Stop watching Views and write everything once. Later mutations are
    /// ignored.
    pub async fn shutdown(&self) {
        {
            let mut state = self.lock();
            if state.shutting_down {
                return;
            }
            state.shutting_down = true;
        }
        let count = self.flush().await;
        for entry in self.lock().tabs.values() {
            entry.release();
        }
        info!(tabs = count, "tabs service shut down");
    }

    /// Forward every change of `view` into a debounced write of the tab.
    pub(super) fn spawn_watcher(
        &self,
        id: &TabId,
        view: &Arc<View>,
        persist: &Arc<Debouncer>,
    ) -> Option<JoinHandle<()>> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!(tab_id = %id, "no runtime, tab changes will not be persisted");
            return None;
        };
        let mut changes = view.subscribe();
        let service = Arc::downgrade(&self.inner);
        let persist = Arc::clone(persist);
        let id = id.clone();

        Some(runtime.spawn(async move {
            while changes.changed().await.is_ok() {
                let Some(inner) = service.upgrade() else {
                    break;
                };
                let tabs = TabsService { inner };
                if !tabs.touch(&id) {
                    break;
                }
                let task_id = id.clone();
                persist.call(async move {
                    tabs.persist_tab(&task_id).await;
                });
            }
        }))
    }

    fn touch(&self, id: &TabId) -> bool {
        match self.lock().tabs.get_mut(id) {
            Some(entry) => {
                entry.tab.touch();
                true
            }
            None => false,
        }
    }

    async fn persist_tab(&self, id: &TabId) {
        let record = self.lock().tabs.get(id).map(|entry| entry.tab.record());
        if let Some(record) = record {
            self.write_records(vec![record]).await;
        }
    }

    pub(super) async fn write_records(&self, records: Vec<TabRecord>) {
        for record in records {
            let value = match serde_json::to_value(&record) {
                Ok(value) => value,
                Err(e) => {
                    warn!(tab_id = %record.id, error = %e, "failed to encode tab record");
                    continue;
                }
            };
            if let Err(e) = self
                .inner
                .store
                .put(Table::Tabs, record.id.as_str(), value)
                .await
            {
                warn!(tab_id = %record.id, error = %e, "failed to persist tab record");
            }
        }
    }

    pub(super) async fn persist_active(&self, id: Option<&TabId>) {
        let result = match id {
            Some(id) => self
                .inner
                .store
                .put(Table::Meta, ACTIVE_TAB_KEY, Value::String(id.to_string()))
                .await,
            None => self
                .inner
                .store
                .delete(Table::Meta, ACTIVE_TAB_KEY)
                .await
                .map(|_| ()),
        };
        if let Err(e) = result {
            warn!(error = %e, "failed to persist active tab");
        }
    }
}
