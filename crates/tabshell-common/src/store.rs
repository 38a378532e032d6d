//! Persistence collaborator interface.
//!
//! The core treats the store as eventually consistent with in-memory state:
//! writes may lag and failures are logged by callers, never rolled back.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::StoreError;

/// Keyed tables the core writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    /// One record per tab, keyed by tab id.
    Tabs,
    /// Small shell-wide values such as the active tab id.
    Meta,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn put(&self, table: Table, key: &str, value: Value) -> Result<(), StoreError>;

    async fn get(&self, table: Table, key: &str) -> Result<Option<Value>, StoreError>;

    /// Returns whether a record was removed.
    async fn delete(&self, table: Table, key: &str) -> Result<bool, StoreError>;

    /// All records of a table, ordered by key.
    async fn list(&self, table: Table) -> Result<Vec<(String, Value)>, StoreError>;
}

/// In-process store. Used by tests and as a fallback when no file store
/// can be opened.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<Table, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a previously exported snapshot.
    pub fn from_snapshot(snapshot: HashMap<Table, BTreeMap<String, Value>>) -> Self {
        Self {
            tables: Mutex::new(snapshot),
        }
    }

    /// Copy of every table.
    pub fn snapshot(&self) -> HashMap<Table, BTreeMap<String, Value>> {
        self.lock().clone()
    }

    pub fn len(&self, table: Table) -> usize {
        self.lock().get(&table).map(BTreeMap::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.lock().values().all(BTreeMap::is_empty)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Table, BTreeMap<String, Value>>> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn put(&self, table: Table, key: &str, value: Value) -> Result<(), StoreError> {
        self.lock()
            .entry(table)
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, table: Table, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.lock().get(&table).and_then(|t| t.get(key)).cloned())
    }

    async fn delete(&self, table: Table, key: &str) -> Result<bool, StoreError> {
        Ok(self
            .lock()
            .get_mut(&table)
            .map(|t| t.remove(key).is_some())
            .unwrap_or(false))
    }

    async fn list(&self, table: Table) -> Result<Vec<(String, Value)>, StoreError> {
        Ok(self
            .lock()
            .get(&table)
            .map(|t| t.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }
}
