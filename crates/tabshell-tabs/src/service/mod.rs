//! The tab collection service.
//!
//! `TabsService` keeps the ordered strip of tabs, each wrapping one View
//! owned by the ViewManager. Every mutation follows the same order: update
//! memory, persist, then publish on the event bus. Persistence failures are
//! logged; in-memory state stays authoritative.

mod close;
mod create;
mod order;
mod persist;
mod sidebar;


use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tabshell_common::{Debouncer, EventBus, RecordStore, TabId, ViewId};
use tabshell_config::TabsConfig;
use tabshell_webview::ViewManager;
use tokio::task::JoinHandle;

use crate::closed_stack::ClosedStack;
use crate::strip::TabStrip;
use crate::tab::Tab;

use persist::records_for;

/// Meta-table key holding the selected tab id.
pub const ACTIVE_TAB_KEY: &str = "active_tab";

/// How a tab is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabOptions {
    /// Select the tab. Otherwise it is only marked for load.
    pub active: bool,
    pub pinned: bool,
    /// Explicit strip position; defaults to the insertion rule.
    pub index: Option<usize>,
    /// Skip the View pool.
    pub fresh: bool,
}

impl Default for TabOptions {
    fn default() -> Self {
        Self {
            active: true,
            pinned: false,
            index: None,
            fresh: false,
        }
    }
}

impl TabOptions {
    pub fn background() -> Self {
        Self {
            active: false,
            ..Default::default()
        }
    }
}

/// Cheap to clone; clones share the same collection.
#[derive(Clone)]
pub struct TabsService {
    inner: Arc<TabsInner>,
}

struct TabsInner {
    views: ViewManager,
    store: Arc<dyn RecordStore>,
    bus: EventBus,
    config: TabsConfig,
    state: Mutex<TabsState>,
}

struct TabsState {
    tabs: HashMap<TabId, TabEntry>,
    strip: TabStrip,
    closed: ClosedStack,
    shutting_down: bool,
}

struct TabEntry {
    tab: Tab,
    /// Forwards View changes into debounced record writes.
    watcher: Option<JoinHandle<()>>,
    persist: Arc<Debouncer>,
}

impl TabEntry {
    fn release(&self) {
        if let Some(watcher) = &self.watcher {
            watcher.abort();
        }
        self.persist.cancel();
    }
}

impl TabsService {
    pub fn new(views: ViewManager, store: Arc<dyn RecordStore>, config: TabsConfig) -> Self {
        let bus = views.bus().clone();
        let closed = ClosedStack::new(config.closed_stack_capacity as usize);
        Self {
            inner: Arc::new(TabsInner {
                views,
                store,
                bus,
                config,
                state: Mutex::new(TabsState {
                    tabs: HashMap::new(),
                    strip: TabStrip::new(),
                    closed,
                    shutting_down: false,
                }),
            }),
        }
    }

    pub fn views(&self) -> &ViewManager {
        &self.inner.views
    }

    pub fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    pub fn config(&self) -> &TabsConfig {
        &self.inner.config
    }

    pub fn len(&self) -> usize {
        self.lock().strip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().strip.is_empty()
    }

    pub fn contains(&self, id: &TabId) -> bool {
        self.lock().tabs.contains_key(id)
    }

    /// Tab ids in strip order.
    pub fn ids(&self) -> Vec<TabId> {
        self.lock().strip.ids().to_vec()
    }

    /// Snapshot of every tab in strip order.
    pub fn tabs(&self) -> Vec<Tab> {
        let state = self.lock();
        state
            .strip
            .ids()
            .iter()
            .filter_map(|id| state.tabs.get(id).map(|e| e.tab.clone()))
            .collect()
    }

    pub fn get(&self, id: &TabId) -> Option<Tab> {
        self.lock().tabs.get(id).map(|e| e.tab.clone())
    }

    pub fn active_id(&self) -> Option<TabId> {
        self.lock().strip.active().cloned()
    }

    pub fn active_tab(&self) -> Option<Tab> {
        let state = self.lock();
        state
            .strip
            .active()
            .and_then(|id| state.tabs.get(id))
            .map(|e| e.tab.clone())
    }

    pub fn tab_for_view(&self, view_id: &ViewId) -> Option<TabId> {
        self.lock()
            .tabs
            .values()
            .find(|e| e.tab.view_id() == view_id)
            .map(|e| e.tab.id.clone())
    }

    pub fn closed_len(&self) -> usize {
        self.lock().closed.len()
    }

    fn debounce_window(&self) -> Duration {
        Duration::from_millis(u64::from(self.inner.config.persist_debounce_ms))
    }

    fn lock(&self) -> MutexGuard<'_, TabsState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Realign every tab's `index` with its strip position. Returns the ids
/// whose index changed.
fn reindex(state: &mut TabsState) -> Vec<TabId> {
    let TabsState { tabs, strip, .. } = state;
    let mut changed = Vec::new();
    for (index, id) in strip.ids().iter().enumerate() {
        if let Some(entry) = tabs.get_mut(id) {
            if entry.tab.index != index {
                entry.tab.index = index;
                entry.tab.touch();
                changed.push(id.clone());
            }
        }
    }
    changed
}
