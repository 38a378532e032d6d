//! Trailing-edge debounce with cancel-on-repeat.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::warn;

/// Runs only the most recently scheduled task, once no new task has been
/// scheduled for `window`.
///
/// Superseded tasks are not aborted; they wake up, see a newer generation
/// and return. A task that already started running is never interrupted.
pub struct Debouncer {
    window: Duration,
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Schedule `task`, replacing anything scheduled earlier.
    pub fn call<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("debounced task dropped: no async runtime");
            return;
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = Arc::clone(&self.generation);
        let window = self.window;

        let handle = runtime.spawn(async move {
            tokio::time::sleep(window).await;
            if current.load(Ordering::SeqCst) == generation {
                task.await;
            }
        });
        *self.lock() = Some(handle);
    }

    /// Drop whatever is scheduled. Returns whether a task was still waiting.
    pub fn cancel(&self) -> bool {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.lock()
            .take()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    pub fn is_pending(&self) -> bool {
        self.lock()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    fn lock(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter_task(counter: &Arc<AtomicUsize>, value: usize) -> impl Future<Output = ()> {
        let counter = Arc::clone(counter);
        async move {
            counter.store(value, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn runs_after_window() {
        let debouncer = Debouncer::new(Duration::from_millis(200));
        let hits = Arc::new(AtomicUsize::new(0));

        debouncer.call(counter_task(&hits, 1));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_calls_coalesce_to_last() {
        let debouncer = Debouncer::new(Duration::from_millis(200));
        let value = Arc::new(AtomicUsize::new(0));
        let runs = Arc::new(AtomicUsize::new(0));

        for i in 1..=5 {
            let runs = Arc::clone(&runs);
            let value = Arc::clone(&value);
            debouncer.call(async move {
                runs.fetch_add(1, Ordering::SeqCst);
                value.store(i, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(value.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_run() {
        let debouncer = Debouncer::new(Duration::from_millis(200));
        let hits = Arc::new(AtomicUsize::new(0));

        debouncer.call(counter_task(&hits, 1));
        assert!(debouncer.is_pending());
        assert!(debouncer.cancel());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_debouncer_cancels() {
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let debouncer = Debouncer::new(Duration::from_millis(200));
            debouncer.call(counter_task(&hits, 1));
        }
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn call_without_runtime_is_a_noop() {
        let debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.call(async {});
        assert!(!debouncer.is_pending());
    }
}
