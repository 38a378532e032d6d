//! Core types for the tab strip.

use serde::{Deserialize, Serialize};
use tabshell_common::TabId;

/// Ordered tab ids plus the selected position. Position in `tabs` is the
/// tab's index; indices are contiguous by construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TabStrip {
    pub(super) tabs: Vec<TabId>,
    /// `None` until something is selected, and after the selected tab is
    /// removed.
    pub(super) active_index: Option<usize>,
}

impl TabStrip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn contains(&self, id: &TabId) -> bool {
        self.tabs.contains(id)
    }

    pub fn ids(&self) -> &[TabId] {
        &self.tabs
    }

    pub fn position(&self, id: &TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t == id)
    }

    pub fn get(&self, index: usize) -> Option<&TabId> {
        self.tabs.get(index)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn active(&self) -> Option<&TabId> {
        self.active_index.and_then(|i| self.tabs.get(i))
    }
}
