//! Bounded undo stack of recently closed tabs.

use std::collections::VecDeque;

use crate::tab::TabRecord;

/// Most-recent-last ring of closed tab records. Pushing onto a full stack
/// evicts the oldest record.
#[derive(Debug, Clone)]
pub struct ClosedStack {
    records: VecDeque<TabRecord>,
    capacity: usize,
}

impl ClosedStack {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns the evicted record, if any.
    pub fn push(&mut self, record: TabRecord) -> Option<TabRecord> {
        let evicted = if self.records.len() >= self.capacity {
            self.records.pop_front()
        } else {
            None
        };
        self.records.push_back(record);
        evicted
    }

    pub fn pop(&mut self) -> Option<TabRecord> {
        self.records.pop_back()
    }

    pub fn peek(&self) -> Option<&TabRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
