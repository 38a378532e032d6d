//! Mutating operations on TabStrip: insert, remove, move, select, cycle.

use tabshell_common::TabId;

use super::TabStrip;

impl TabStrip {
    /// Where a new tab goes: right after the selected tab, or at the end
    /// when nothing is selected or the selected tab is pinned.
    pub fn insertion_index(&self, active_pinned: bool) -> usize {
        match self.active_index {
            Some(i) if !active_pinned => i + 1,
            _ => self.tabs.len(),
        }
    }

    /// Insert at `index` (clamped). Returns the index used.
    pub fn insert(&mut self, index: usize, id: TabId) -> usize {
        let index = index.min(self.tabs.len());
        self.tabs.insert(index, id);
        if let Some(active) = self.active_index.as_mut() {
            if index <= *active {
                *active += 1;
            }
        }
        index
    }

    /// Remove by id, returning the index it held. Removing the selected tab
    /// clears the selection.
    pub fn remove(&mut self, id: &TabId) -> Option<usize> {
        let idx = self.position(id)?;
        self.tabs.remove(idx);
        self.active_index = match self.active_index {
            Some(active) if active == idx => None,
            Some(active) if idx < active => Some(active - 1),
            other => other,
        };
        Some(idx)
    }

    /// Move `id` to `new_index`, clamped to the strip. Selection follows
    /// the selected id. Returns the index used.
    pub fn move_to(&mut self, id: &TabId, new_index: usize) -> Option<usize> {
        let from = self.position(id)?;
        let selected = self.active().cloned();
        let to = new_index.min(self.tabs.len() - 1);
        let moved = self.tabs.remove(from);
        self.tabs.insert(to, moved);
        if let Some(selected) = selected {
            self.active_index = self.position(&selected);
        }
        Some(to)
    }

    /// Select by id. Returns `true` if found.
    pub fn set_active(&mut self, id: &TabId) -> bool {
        match self.position(id) {
            Some(idx) => {
                self.active_index = Some(idx);
                true
            }
            None => false,
        }
    }

    /// Tab to select after the one at `removed` went away: whatever slid
    /// into its place, else the new last tab.
    pub fn successor(&self, removed: usize) -> Option<&TabId> {
        self.tabs.get(removed).or_else(|| self.tabs.last())
    }

    /// Following tab, or the preceding one when `id` is last.
    pub fn neighbor(&self, id: &TabId) -> Option<&TabId> {
        let idx = self.position(id)?;
        self.tabs
            .get(idx + 1)
            .or_else(|| idx.checked_sub(1).and_then(|i| self.tabs.get(i)))
    }

    /// Next tab after the selection, wrapping around.
    pub fn cycle_next(&self) -> Option<&TabId> {
        let len = self.tabs.len();
        if len == 0 {
            return None;
        }
        let next = self.active_index.map(|i| (i + 1) % len).unwrap_or(0);
        self.tabs.get(next)
    }

    /// Previous tab before the selection, wrapping around.
    pub fn cycle_prev(&self) -> Option<&TabId> {
        let len = self.tabs.len();
        if len == 0 {
            return None;
        }
        let prev = self
            .active_index
            .map(|i| (i + len - 1) % len)
            .unwrap_or(len - 1);
        self.tabs.get(prev)
    }
}
