//! JSON file record store.
//!
//! The whole store lives in one file that is rewritten after every
//! mutation. Writes go to a sibling temp file first and are renamed into
//! place, so a crash leaves either the old or the new contents.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabshell_common::{RecordStore, StoreError, Table};
use tracing::{debug, info};

const FILE_VERSION: u32 = 1;

type Tables = BTreeMap<Table, BTreeMap<String, Value>>;

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    #[serde(default)]
    tables: Tables,
}

pub struct JsonFileStore {
    path: PathBuf,
    tables: Mutex<Tables>,
    /// Serialises snapshot-and-write so an older snapshot never lands last.
    write: tokio::sync::Mutex<()>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store; the file
    /// and its directory are created on the first write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let tables = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let file: StoreFile = serde_json::from_slice(&bytes)?;
                if file.version != FILE_VERSION {
                    return Err(StoreError::Unavailable(format!(
                        "{} has unsupported version {}",
                        path.display(),
                        file.version
                    )));
                }
                file.tables
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Tables::new(),
            Err(e) => return Err(e.into()),
        };

        info!(
            path = %path.display(),
            tabs = tables.get(&Table::Tabs).map(BTreeMap::len).unwrap_or(0),
            "record store opened"
        );
        Ok(Self {
            path,
            tables: Mutex::new(tables),
            write: tokio::sync::Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let _write = self.write.lock().await;
        let bytes = {
            let file = StoreFile {
                version: FILE_VERSION,
                tables: self.lock().clone(),
            };
            serde_json::to_vec_pretty(&file)?
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "record store written");
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn put(&self, table: Table, key: &str, value: Value) -> Result<(), StoreError> {
        self.lock()
            .entry(table)
            .or_default()
            .insert(key.to_string(), value);
        self.persist().await
    }

    async fn get(&self, table: Table, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.lock().get(&table).and_then(|t| t.get(key)).cloned())
    }

    async fn delete(&self, table: Table, key: &str) -> Result<bool, StoreError> {
        let removed = self
            .lock()
            .get_mut(&table)
            .map(|t| t.remove(key).is_some())
            .unwrap_or(false);
        if removed {
            self.persist().await?;
        }
        Ok(removed)
    }

    async fn list(&self, table: Table) -> Result<Vec<(String, Value)>, StoreError> {
        Ok(self
            .lock()
            .get(&table)
            .map(|t| t.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }
}
