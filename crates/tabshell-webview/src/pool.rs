//! Pre-warmed inventory of cold-but-primed Views.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tabshell_common::{DestinationClass, ViewId};

use crate::view::View;

/// Per-class FIFO of preloaded Views. Shared by the view and overlay
/// orchestrators, each with its own instance.
pub struct ViewPool {
    capacity: usize,
    entries: HashMap<DestinationClass, VecDeque<Arc<View>>>,
    refills_scheduled: usize,
}

impl ViewPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            refills_scheduled: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest live entry of `class`. Destroyed entries are discarded.
    pub fn take(&mut self, class: DestinationClass) -> Option<Arc<View>> {
        let queue = self.entries.get_mut(&class)?;
        while let Some(view) = queue.pop_front() {
            if !view.is_destroyed() && view.is_hot() {
                return Some(view);
            }
        }
        None
    }

    /// Add an entry. A full pool hands the View back.
    pub fn put(&mut self, class: DestinationClass, view: Arc<View>) -> Result<(), Arc<View>> {
        let queue = self.entries.entry(class).or_default();
        if queue.len() >= self.capacity {
            return Err(view);
        }
        queue.push_back(view);
        Ok(())
    }

    pub fn len(&self, class: DestinationClass) -> usize {
        self.entries.get(&class).map(VecDeque::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(VecDeque::is_empty)
    }

    /// How many entries `class` is missing.
    pub fn deficit(&self, class: DestinationClass) -> usize {
        self.capacity.saturating_sub(self.len(class))
    }

    pub fn note_refill_scheduled(&mut self) {
        self.refills_scheduled += 1;
    }

    /// Refills scheduled since creation.
    pub fn refills_scheduled(&self) -> usize {
        self.refills_scheduled
    }

    pub fn get(&self, id: &ViewId) -> Option<Arc<View>> {
        self.entries
            .values()
            .flatten()
            .find(|entry| entry.id() == id)
            .cloned()
    }

    /// Remove every entry.
    pub fn drain(&mut self) -> Vec<Arc<View>> {
        self.entries
            .drain()
            .flat_map(|(_, queue)| queue)
            .collect()
    }
}
