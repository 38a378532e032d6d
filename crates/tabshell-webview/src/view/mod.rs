//! Views: one renderable surface's identity and observable state.
//!
//! A `View` exists independently of the engine surface. It is *cold* until
//! mounted and *hot* while a [`SurfaceBinding`] connects it to a live surface.
//! State is published through a `watch` channel so observers always see the
//! latest value.

mod binding;
mod detect;
mod state;
mod subscribers;

#[cfg(test)]
mod tests;

pub use binding::{
    is_fatal_load_error, BindingMode, BindingOutcome, BindingSignal, SurfaceBinding,
    NON_FATAL_LOAD_ERRORS,
};
pub use detect::detect_app;
pub use state::{
    AppKind, DetectedApp, FindResult, HistoryEntry, LoadError, NavigationHistory,
    ViewContainer, ViewState,
};
pub use subscribers::{Interception, SubscriberFn, SubscriberId};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use base64::Engine as _;
use serde_json::Value;
use tabshell_common::{HostError, Rect, ViewId};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::bridge::{HostAction, HostBridge, HostResponse, SurfaceOptions};
use crate::events::HostEventKind;
use crate::ipc::{PageMessage, SelectionData};

use subscribers::Subscribers;

/// What routing one host event through a View produced.
#[derive(Debug, Default)]
pub struct ViewUpdate {
    /// A subscriber vetoed default handling.
    pub consumed: bool,
    pub changed: bool,
    pub signals: Vec<BindingSignal>,
}

#[derive(Default)]
struct ViewInner {
    binding: Option<SurfaceBinding>,
    /// One-shot: the next unmount is skipped, the next mount re-attaches.
    relocation_guard: bool,
    destroyed: bool,
}

pub struct View {
    id: ViewId,
    host: Arc<dyn HostBridge>,
    readiness_timeout: Duration,
    state: watch::Sender<ViewState>,
    inner: Mutex<ViewInner>,
    subscribers: Mutex<Subscribers>,
}

impl View {
    pub fn new(host: Arc<dyn HostBridge>, readiness_timeout: Duration, initial: ViewState) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            id: ViewId::new(),
            host,
            readiness_timeout,
            state,
            inner: Mutex::new(ViewInner::default()),
            subscribers: Mutex::new(Subscribers::default()),
        }
    }

    pub fn id(&self) -> &ViewId {
        &self.id
    }

    /// Copy of the current state.
    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn url(&self) -> String {
        self.state.borrow().url.clone()
    }

    pub fn is_hot(&self) -> bool {
        self.lock_inner().binding.is_some()
    }

    pub fn is_destroyed(&self) -> bool {
        self.lock_inner().destroyed
    }

    pub fn is_shown(&self) -> bool {
        self.state.borrow().shown
    }

    pub fn is_permanently_active(&self) -> bool {
        self.state.borrow().permanently_active
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.lock_inner().binding.as_ref().and_then(SurfaceBinding::bounds)
    }

    pub fn binding_mode(&self) -> Option<BindingMode> {
        self.lock_inner().binding.as_ref().map(SurfaceBinding::mode)
    }

    pub fn has_relocation_guard(&self) -> bool {
        self.lock_inner().relocation_guard
    }

    pub fn readiness_timeout(&self) -> Duration {
        self.readiness_timeout
    }

    pub fn set_container(&self, container: ViewContainer) {
        self.state.send_if_modified(|s| replace(&mut s.container, container));
    }

    // -- Lifecycle --

    /// Bind to a new surface, replacing any live one.
    ///
    /// With the relocation guard set the live surface is kept and only
    /// re-attached; the guard is consumed either way.
    pub fn mount(&self, mut options: SurfaceOptions) -> Result<(), HostError> {
        if options.history.is_none() {
            let history = self.state.borrow().history.clone();
            if history.len() > 1 {
                options.history = Some(history);
            }
        }

        let mut guard = self.lock_inner();
        let inner = &mut *guard;
        if inner.destroyed {
            return Err(HostError::UnknownSurface(self.id.to_string()));
        }

        if let Some(binding) = inner.binding.as_mut() {
            if inner.relocation_guard {
                inner.relocation_guard = false;
                if let Some(bounds) = options.bounds {
                    binding.set_bounds(bounds);
                    self.send_raw(HostAction::SetBounds { bounds });
                }
                debug!(view_id = %self.id, "re-attached relocated view");
                return Ok(());
            }
            inner.binding = None;
            self.send_raw(HostAction::Destroy);
            debug!(view_id = %self.id, "replacing live surface");
        }

        let created = self.host.create_surface(&self.id, &options);
        if created.is_ok() {
            inner.binding = Some(SurfaceBinding::new(BindingMode::Created, options.bounds));
            inner.relocation_guard = false;
        }
        drop(guard);

        self.state.send_modify(|s| {
            s.reset_surface_flags();
            if created.is_ok() {
                s.failed = false;
                s.error = None;
                s.shown = options.activate;
                s.permanently_active |= options.permanently_active;
                if s.url.is_empty() {
                    s.url = options.url.clone();
                }
            }
        });

        match &created {
            Ok(()) => debug!(view_id = %self.id, url = %options.url, "mounted view"),
            Err(e) => warn!(view_id = %self.id, error = %e, "failed to create surface"),
        }
        created
    }

    /// Mount without showing. Used to warm pools.
    pub fn preload(&self, options: SurfaceOptions) -> Result<(), HostError> {
        self.mount(SurfaceOptions {
            activate: false,
            ..options
        })
    }

    /// Bind to a surface the host already created for this id.
    pub fn attach_mounted(&self, bounds: Option<Rect>) -> Result<(), HostError> {
        let mut inner = self.lock_inner();
        if inner.destroyed {
            return Err(HostError::UnknownSurface(self.id.to_string()));
        }
        inner.binding = Some(SurfaceBinding::new(BindingMode::Attached, bounds));
        inner.relocation_guard = false;
        debug!(view_id = %self.id, "attached to existing surface");
        Ok(())
    }

    /// Release the surface because the container is going away. The View
    /// stays registered and keeps its state. Returns whether a surface was
    /// released.
    pub fn unmount(&self) -> bool {
        {
            let mut inner = self.lock_inner();
            if inner.relocation_guard {
                debug!(view_id = %self.id, "unmount skipped, view is relocating");
                return false;
            }
            if inner.binding.take().is_none() {
                return false;
            }
            self.send_raw(HostAction::Destroy);
        }
        self.state.send_modify(ViewState::reset_surface_flags);
        debug!(view_id = %self.id, "unmounted view");
        true
    }

    /// Keep the live surface through the next unmount; cleared by the next
    /// successful mount.
    pub fn prevent_unmounting_until_next_mount(&self) {
        self.lock_inner().relocation_guard = true;
    }

    /// Drop a relocation guard no mount consumed. The live surface stays
    /// bound. Returns whether a guard was set.
    pub fn finish_relocation(&self) -> bool {
        std::mem::replace(&mut self.lock_inner().relocation_guard, false)
    }

    /// Idempotent teardown. Pending readiness waits resolve to `None`.
    pub fn destroy(&self) -> bool {
        {
            let mut inner = self.lock_inner();
            if inner.destroyed {
                return false;
            }
            inner.destroyed = true;
            inner.relocation_guard = false;
            if inner.binding.take().is_some() {
                self.send_raw(HostAction::Destroy);
            }
        }
        self.lock_subscribers().clear();
        self.state.send_modify(|s| {
            s.reset_surface_flags();
            s.snapshot = None;
            s.destroyed = true;
        });
        debug!(view_id = %self.id, "destroyed view");
        true
    }

    /// Wait until the bound page reports DOM ready. `None` on timeout or
    /// destruction.
    pub async fn wait_until_ready(&self, timeout: Duration) -> Option<()> {
        let mut rx = self.state.subscribe();
        let ready = tokio::time::timeout(timeout, rx.wait_for(|s| s.dom_ready || s.destroyed)).await;
        match ready {
            Ok(Ok(state)) if !state.destroyed => Some(()),
            _ => None,
        }
    }

    /// Detect the page's app, then ask it to highlight `selection`.
    /// Returns `false` when the page never became ready.
    pub async fn highlight_selection(&self, selection: &SelectionData) -> bool {
        if self.wait_until_ready(self.readiness_timeout).await.is_none() {
            debug!(view_id = %self.id, "highlight skipped, view not ready");
            return false;
        }
        let app = detect_app(&self.url());
        let detected = app.clone();
        self.state
            .send_if_modified(|s| replace(&mut s.detected_app, detected));
        self.send_page_message(PageMessage::highlight_selection(selection, app.as_ref()))
    }

    pub fn change_permanently_active(&self, value: bool) -> bool {
        let changed = self
            .state
            .send_if_modified(|s| replace(&mut s.permanently_active, value));
        if self.is_hot() {
            self.send_raw(PageMessage::permanently_active(value).into_action());
        }
        changed
    }

    // -- Subscribers --

    /// Register a handler that sees each host event before default handling.
    ///
    /// Handlers run without internal locks held.
    pub fn add_subscriber<F>(&self, handler: F, once: bool) -> SubscriberId
    where
        F: FnMut(&HostEventKind, &ViewState) -> Interception + Send + 'static,
    {
        self.lock_subscribers().add(Box::new(handler), once)
    }

    pub fn remove_subscriber(&self, id: SubscriberId) -> bool {
        self.lock_subscribers().remove(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock_subscribers().len()
    }

    /// Route one host event: subscribers first, then the binding.
    pub fn handle_event(&self, kind: &HostEventKind) -> ViewUpdate {
        if self.is_destroyed() {
            return ViewUpdate::default();
        }

        let snapshot = self.state();
        let taken = self.lock_subscribers().take();
        let (survivors, verdict) = subscribers::dispatch(taken, kind, &snapshot);
        if !self.is_destroyed() {
            self.lock_subscribers().restore(survivors);
        }
        if verdict == Interception::Consume {
            return ViewUpdate {
                consumed: true,
                ..Default::default()
            };
        }

        let mut guard = self.lock_inner();
        let Some(binding) = guard.binding.as_mut() else {
            debug!(view_id = %self.id, event = kind.name(), "event for cold view dropped");
            return ViewUpdate::default();
        };

        let mut outcome = BindingOutcome::default();
        self.state.send_if_modified(|state| {
            outcome = binding.apply(state, kind);
            outcome.changed
        });

        if outcome.signals.contains(&BindingSignal::SurfaceGone) {
            guard.binding = None;
            warn!(view_id = %self.id, "render process gone, view is cold");
        }
        drop(guard);

        for action in outcome.actions {
            self.send_raw(action);
        }

        ViewUpdate {
            consumed: false,
            changed: outcome.changed,
            signals: outcome.signals,
        }
    }

    // -- Actions --

    /// User-initiated navigation; the commit is added to history.
    pub fn navigate(&self, url: &str) -> bool {
        self.send_action(HostAction::LoadUrl {
            url: url.to_string(),
        })
    }

    /// Shell-initiated navigation; the commit replaces the current entry.
    pub fn load_programmatic(&self, url: &str) -> bool {
        {
            let mut inner = self.lock_inner();
            let Some(binding) = inner.binding.as_mut() else {
                warn!(view_id = %self.id, "programmatic load on cold view ignored");
                return false;
            };
            binding.mark_programmatic(url);
        }
        self.send_raw(HostAction::LoadUrl {
            url: url.to_string(),
        })
    }

    pub fn reload(&self) -> bool {
        self.send_action(HostAction::Reload {
            ignore_cache: false,
        })
    }

    pub fn go_back(&self) -> bool {
        self.step_history(true)
    }

    pub fn go_forward(&self) -> bool {
        self.step_history(false)
    }

    /// The cursor moves when the engine commits the step.
    fn step_history(&self, back: bool) -> bool {
        {
            let mut inner = self.lock_inner();
            let Some(binding) = inner.binding.as_mut() else {
                warn!(view_id = %self.id, "history step on cold view ignored");
                return false;
            };
            let target = self
                .state
                .borrow()
                .history
                .neighbor(back)
                .map(|entry| entry.url.clone());
            let Some(url) = target else {
                return false;
            };
            binding.mark_history_step(url, back);
        }

        let sent = self.send_raw(if back {
            HostAction::GoBack
        } else {
            HostAction::GoForward
        });
        if !sent {
            if let Some(binding) = self.lock_inner().binding.as_mut() {
                binding.clear_pending();
            }
        }
        sent
    }

    pub fn focus(&self) -> bool {
        self.send_action(HostAction::Focus)
    }

    pub fn set_bounds(&self, bounds: Rect) -> bool {
        {
            let mut inner = self.lock_inner();
            let Some(binding) = inner.binding.as_mut() else {
                warn!(view_id = %self.id, "bounds on cold view ignored");
                return false;
            };
            binding.set_bounds(bounds);
        }
        self.send_raw(HostAction::SetBounds { bounds })
    }

    pub fn set_audio_muted(&self, muted: bool) -> bool {
        self.send_action(HostAction::SetAudioMuted { muted })
    }

    pub fn set_zoom_factor(&self, factor: f64) -> bool {
        self.send_action(HostAction::SetZoomFactor { factor })
    }

    pub fn find_in_page(&self, text: &str, forward: bool, find_next: bool) -> bool {
        self.send_action(HostAction::FindInPage {
            text: text.to_string(),
            forward,
            find_next,
        })
    }

    pub fn send_page_message(&self, message: PageMessage) -> bool {
        self.send_action(message.into_action())
    }

    pub fn open_dev_tools(&self) -> bool {
        self.send_action(HostAction::OpenDevTools)
    }

    pub fn download_url(&self, url: &str) -> bool {
        self.send_action(HostAction::DownloadUrl {
            url: url.to_string(),
        })
    }

    /// PNG bytes of the current page.
    pub async fn capture_page(&self) -> Option<Vec<u8>> {
        self.request_action(HostAction::CapturePage)
            .await
            .and_then(HostResponse::into_image)
    }

    /// Capture the page as a `data:` URL suitable for a placeholder.
    pub async fn capture_snapshot(&self) -> Option<String> {
        let png = self.capture_page().await?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(png);
        Some(format!("data:image/png;base64,{encoded}"))
    }

    pub async fn execute_javascript(&self, code: &str) -> Option<Value> {
        self.request_action(HostAction::ExecuteJavascript {
            code: code.to_string(),
        })
        .await
        .and_then(HostResponse::into_value)
    }

    pub async fn is_currently_audible(&self) -> Option<bool> {
        self.request_action(HostAction::IsCurrentlyAudible)
            .await
            .and_then(HostResponse::into_bool)
    }

    /// URL as the engine sees it, which may lead the committed state.
    pub async fn fetch_url(&self) -> Option<String> {
        self.request_action(HostAction::GetUrl)
            .await
            .and_then(HostResponse::into_url)
    }

    pub async fn fetch_navigation_history(&self) -> Option<NavigationHistory> {
        self.request_action(HostAction::GetNavigationHistory)
            .await
            .and_then(HostResponse::into_history)
    }

    // -- Crate-internal controls used by the orchestrators --

    pub(crate) fn modify(&self, f: impl FnOnce(&mut ViewState)) {
        self.state.send_modify(f);
    }

    /// Show the surface. A failed surface stays hidden until its next load.
    pub(crate) fn show(&self) -> bool {
        if !self.is_hot() {
            return false;
        }
        let failed = self.state.borrow().failed;
        if !failed {
            self.send_raw(HostAction::Activate);
        }
        self.state.send_if_modified(|s| replace(&mut s.shown, true));
        true
    }

    pub(crate) fn hide(&self) -> bool {
        if !self.is_hot() || !self.is_shown() {
            return false;
        }
        self.send_raw(HostAction::Hide);
        self.state.send_if_modified(|s| replace(&mut s.shown, false));
        true
    }

    pub(crate) fn set_snapshot(&self, snapshot: Option<String>) {
        self.state.send_if_modified(|s| replace(&mut s.snapshot, snapshot));
    }

    fn send_action(&self, action: HostAction) -> bool {
        if !self.is_hot() {
            warn!(view_id = %self.id, action = action.name(), "action on cold view ignored");
            return false;
        }
        self.send_raw(action)
    }

    fn send_raw(&self, action: HostAction) -> bool {
        let name = action.name();
        match self.host.send(&self.id, action) {
            Ok(()) => true,
            Err(e) => {
                warn!(view_id = %self.id, action = name, error = %e, "host action failed");
                false
            }
        }
    }

    async fn request_action(&self, action: HostAction) -> Option<HostResponse> {
        let name = action.name();
        if !self.is_hot() {
            warn!(view_id = %self.id, action = name, "request on cold view ignored");
            return None;
        }
        match self.host.request(&self.id, action).await {
            Ok(response) => Some(response),
            Err(e) => {
                warn!(view_id = %self.id, action = name, error = %e, "host request failed");
                None
            }
        }
    }

    fn lock_inner(&self) -> MutexGuard<'_, ViewInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, Subscribers> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let url = self.url();
        f.debug_struct("View")
            .field("id", &self.id)
            .field("url", &url)
            .field("hot", &self.is_hot())
            .finish()
    }
}

/// Assign and report whether the value changed.
fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}
