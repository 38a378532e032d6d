//! Content-store collaborator.
//!
//! The content store owns saved resources. Views pointing at
//! `tabshell://resource/<id>` ask it for metadata, and the core tells it
//! which View currently represents which resource.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tabshell_common::{canonical_url, new_id, ShellError, ViewId};

/// What the core needs to know about a stored resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMeta {
    pub id: String,
    pub title: String,
    /// Original web address, if the resource was saved from a page.
    pub source_url: Option<String>,
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn resolve(&self, resource_id: &str) -> Result<Option<ContentMeta>, ShellError>;

    /// Save a page and return its resource id.
    async fn save_page(&self, url: &str, title: &str) -> Result<String, ShellError>;

    /// Record (or clear) which resource a View represents.
    async fn set_view_resource(
        &self,
        view_id: &ViewId,
        resource_id: Option<&str>,
    ) -> Result<(), ShellError>;
}

#[derive(Default)]
struct Inner {
    resources: HashMap<String, ContentMeta>,
    by_url: HashMap<String, String>,
    views: HashMap<ViewId, String>,
}

/// In-process content store keyed by canonical URL.
#[derive(Default)]
pub struct MemoryContentStore {
    inner: Mutex<Inner>,
    saves: AtomicUsize,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an existing resource.
    pub fn insert(&self, meta: ContentMeta) {
        let mut inner = self.lock();
        if let Some(url) = &meta.source_url {
            inner.by_url.insert(canonical_url(url), meta.id.clone());
        }
        inner.resources.insert(meta.id.clone(), meta);
    }

    pub fn resource_for_view(&self, view_id: &ViewId) -> Option<String> {
        self.lock().views.get(view_id).cloned()
    }

    /// Number of `save_page` calls that reached the store.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn resolve(&self, resource_id: &str) -> Result<Option<ContentMeta>, ShellError> {
        Ok(self.lock().resources.get(resource_id).cloned())
    }

    async fn save_page(&self, url: &str, title: &str) -> Result<String, ShellError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        let key = canonical_url(url);
        let mut inner = self.lock();
        if let Some(id) = inner.by_url.get(&key) {
            return Ok(id.clone());
        }
        let id = new_id();
        inner.by_url.insert(key, id.clone());
        inner.resources.insert(
            id.clone(),
            ContentMeta {
                id: id.clone(),
                title: title.to_string(),
                source_url: Some(url.to_string()),
            },
        );
        Ok(id)
    }

    async fn set_view_resource(
        &self,
        view_id: &ViewId,
        resource_id: Option<&str>,
    ) -> Result<(), ShellError> {
        let mut inner = self.lock();
        match resource_id {
            Some(id) if !inner.resources.contains_key(id) => {
                Err(ShellError::Content(format!("unknown resource {id}")))
            }
            Some(id) => {
                inner.views.insert(view_id.clone(), id.to_string());
                Ok(())
            }
            None => {
                inner.views.remove(view_id);
                Ok(())
            }
        }
    }
}
