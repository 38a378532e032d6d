//! De-duplication of in-flight operations.
//!
//! Operations keyed by URL (bookmarking a page, refreshing its content) can
//! be triggered twice before the first finishes. The second caller awaits
//! the first caller's result instead of re-issuing the work.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures_util::future::{BoxFuture, FutureExt, Shared};

type SharedResult<V> = Shared<BoxFuture<'static, V>>;

pub struct InflightMap<K, V>
where
    V: Clone,
{
    pending: Mutex<HashMap<K, SharedResult<V>>>,
}

impl<K, V> InflightMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Run `make()` unless an operation for `key` is already in flight, in
    /// which case its result is shared.
    pub async fn run<F, Fut>(&self, key: K, make: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + Send + 'static,
    {
        let (shared, leader) = {
            let mut pending = self.lock();
            match pending.get(&key) {
                // A completed entry left behind by a cancelled leader is stale.
                Some(existing) if existing.peek().is_none() => (existing.clone(), false),
                _ => {
                    let shared = make().boxed().shared();
                    pending.insert(key.clone(), shared.clone());
                    (shared, true)
                }
            }
        };

        let result = shared.await;
        if leader {
            self.lock().remove(&key);
        }
        result
    }

    pub fn is_in_flight(&self, key: &K) -> bool {
        self.lock()
            .get(key)
            .map(|shared| shared.peek().is_none())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, SharedResult<V>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K, V> Default for InflightMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
