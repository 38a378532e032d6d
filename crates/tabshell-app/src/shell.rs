//! Composition root.
//!
//! Owns one instance of every core service and wires the host event stream
//! into them. Nothing in the core is global; tests build as many shells as
//! they like.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tabshell_common::{EventBus, Point, Rect, RecordStore, ShellEvent, Table, ViewId};
use tabshell_config::ShellConfig;
use tabshell_tabs::{TabOptions, TabsService};
use tabshell_webview::{HostBridge, HostEvent, OverlayPool, ViewIntent, ViewManager};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, info, warn};

const EVENT_BUS_CAPACITY: usize = 256;

pub struct Shell {
    config: ShellConfig,
    bus: EventBus,
    views: ViewManager,
    overlays: OverlayPool,
    tabs: TabsService,
    store: Arc<dyn RecordStore>,
    events: Mutex<mpsc::UnboundedReceiver<HostEvent>>,
    shut_down: AtomicBool,
}

impl Shell {
    /// `events` is the host's event stream for the surfaces `host` creates.
    pub fn new(
        config: ShellConfig,
        host: Arc<dyn HostBridge>,
        events: mpsc::UnboundedReceiver<HostEvent>,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        let bus = EventBus::new(EVENT_BUS_CAPACITY);
        let views = ViewManager::new(host, bus.clone(), config.views.clone());
        let overlays = OverlayPool::new(views.clone(), config.overlay.clone());
        let tabs = TabsService::new(views.clone(), Arc::clone(&store), config.tabs.clone());
        Self {
            config,
            bus,
            views,
            overlays,
            tabs,
            store,
            events: Mutex::new(events),
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn views(&self) -> &ViewManager {
        &self.views
    }

    pub fn overlays(&self) -> &OverlayPool {
        &self.overlays
    }

    pub fn tabs(&self) -> &TabsService {
        &self.tabs
    }

    /// Warm the pools and bring back the previous session, or start a
    /// fresh one. Returns the number of open tabs.
    pub async fn start(&self) -> usize {
        let pooled = self.views.prewarm() + self.overlays.prewarm();
        self.pump().await;

        if self.config.tabs.restore_on_launch {
            self.tabs.restore().await;
        } else {
            self.discard_session().await;
            self.tabs
                .create(&self.config.tabs.default_url, TabOptions::default())
                .await;
        }
        self.pump().await;

        let open = self.tabs.len();
        info!(tabs = open, pooled, "shell started");
        open
    }

    /// Dispatch every host event queued so far, letting spawned tasks run
    /// between batches. Returns the number of events handled.
    pub async fn pump(&self) -> usize {
        let mut handled = 0;
        let mut yielded = false;
        loop {
            let next = self.lock_events().try_recv();
            match next {
                Ok(event) => {
                    self.dispatch(event).await;
                    handled += 1;
                    yielded = false;
                }
                Err(TryRecvError::Empty) if !yielded => {
                    tokio::task::yield_now().await;
                    yielded = true;
                }
                Err(_) => break,
            }
        }
        handled
    }

    /// Route one host event: overlays first, then the orchestrator, whose
    /// intents are fulfilled here.
    pub async fn dispatch(&self, event: HostEvent) {
        if self.overlays.handle_host_event(&event) {
            return;
        }
        match self.views.handle_host_event(&event) {
            Some(ViewIntent::OpenTab {
                source,
                url,
                active,
            }) => {
                debug!(source = %source, url = %url, active, "opening tab for new window");
                let opts = TabOptions {
                    active,
                    ..Default::default()
                };
                if self.tabs.create(&url, opts).await.is_none() {
                    warn!(url = %url, "new window request dropped");
                }
            }
            Some(ViewIntent::PageMessage { view_id, message }) => {
                debug!(view_id = %view_id, message = ?message, "unhandled page message");
            }
            None => {}
        }
    }

    /// Float `url` over the active tab, anchored at the window origin.
    pub fn open_overlay(&self, url: &str, width: f64, height: f64) -> Option<ViewId> {
        let parent = self.tabs.active_tab().map(|tab| tab.view_id().clone());
        let bounds = Rect::new(0.0, 0.0, width, height);
        self.overlays
            .open(url, bounds, parent.as_ref())
            .map(|view| view.id().clone())
    }

    /// Forward a window click to the overlay pool. Returns whether an
    /// overlay was dismissed.
    pub fn click(&self, x: f64, y: f64) -> bool {
        self.overlays.handle_window_click(Point::new(x, y))
    }

    /// Flush tab records and release every surface. Only the first call
    /// does anything.
    pub async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.bus.publish(ShellEvent::Shutdown);
        self.tabs.shutdown().await;
        self.overlays.shutdown();
        self.views.shutdown();
        info!("shell shut down");
    }

    async fn discard_session(&self) {
        let rows = match self.store.list(Table::Tabs).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "failed to read previous session");
                return;
            }
        };
        for (key, _) in rows {
            if let Err(e) = self.store.delete(Table::Tabs, &key).await {
                warn!(tab_id = %key, error = %e, "failed to discard tab record");
            }
        }
    }

    fn lock_events(&self) -> MutexGuard<'_, mpsc::UnboundedReceiver<HostEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
