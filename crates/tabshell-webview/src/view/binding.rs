//! Surface binding: host events in, View state writes out.

use tabshell_common::canonical::host_of;
use tabshell_common::{canonical_url, Rect};
use tracing::debug;

use crate::bridge::HostAction;
use crate::events::{HostEventKind, WindowDisposition};
use crate::ipc::PageMessage;

use super::state::{HistoryEntry, LoadError, ViewState};

/// Engine error codes that never surface as a failed View.
///
/// -3 aborted, -20 blocked by client, -27 blocked by response,
/// -300 invalid URL (about:blank prefetch).
pub const NON_FATAL_LOAD_ERRORS: &[i32] = &[-3, -20, -27, -300];

pub fn is_fatal_load_error(code: i32, is_main_frame: bool) -> bool {
    is_main_frame && !NON_FATAL_LOAD_ERRORS.contains(&code)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingMode {
    /// The core asked the host to create the surface.
    Created,
    /// The host created it out of band and the core attached afterwards.
    Attached,
}

/// Things the owner of the binding has to act on after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingSignal {
    /// Organic navigation committed.
    Visited(String),
    PageMessage(PageMessage),
    NewWindow {
        url: String,
        disposition: WindowDisposition,
    },
    /// The render process died; the surface is gone.
    SurfaceGone,
}

#[derive(Debug, Default)]
pub struct BindingOutcome {
    /// Actions to send to the surface once state is written.
    pub actions: Vec<HostAction>,
    pub signals: Vec<BindingSignal>,
    pub changed: bool,
}

/// A shell-initiated load waiting for its commit.
#[derive(Debug, Clone, PartialEq)]
enum PendingLoad {
    /// Overwrites the current history entry.
    Replace(String),
    /// Moves the history cursor one step.
    Step { url: String, back: bool },
}

impl PendingLoad {
    fn url(&self) -> &str {
        match self {
            Self::Replace(url) | Self::Step { url, .. } => url,
        }
    }
}

#[derive(Debug)]
pub struct SurfaceBinding {
    mode: BindingMode,
    bounds: Option<Rect>,
    pending: Option<PendingLoad>,
}

impl SurfaceBinding {
    pub fn new(mode: BindingMode, bounds: Option<Rect>) -> Self {
        Self {
            mode,
            bounds,
            pending: None,
        }
    }

    pub fn mode(&self) -> BindingMode {
        self.mode
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
    }

    /// The next commit of `url` replaces the current entry.
    pub fn mark_programmatic(&mut self, url: impl Into<String>) {
        self.pending = Some(PendingLoad::Replace(url.into()));
    }

    /// The next commit of `url` moves the history cursor instead of
    /// appending.
    pub fn mark_history_step(&mut self, url: impl Into<String>, back: bool) {
        self.pending = Some(PendingLoad::Step {
            url: url.into(),
            back,
        });
    }

    pub fn clear_pending(&mut self) {
        self.pending = None;
    }

    pub fn has_pending_programmatic(&self) -> bool {
        self.pending.is_some()
    }

    /// Translate one host event into state writes.
    pub fn apply(&mut self, state: &mut ViewState, kind: &HostEventKind) -> BindingOutcome {
        let mut out = BindingOutcome::default();

        match kind {
            HostEventKind::DidStartLoading => {
                state.is_loading = true;
                state.did_finish_load = false;
                state.dom_ready = false;
                if state.failed {
                    state.failed = false;
                    state.error = None;
                    if state.shown {
                        out.actions.push(HostAction::Activate);
                    }
                }
                out.changed = true;
            }
            HostEventKind::DidStopLoading => {
                out.changed = set(&mut state.is_loading, false);
            }
            HostEventKind::DidFinishLoad => {
                out.changed = set(&mut state.did_finish_load, true);
            }
            HostEventKind::DomReady => {
                out.changed = set(&mut state.dom_ready, true);
            }
            HostEventKind::DidFailLoad {
                code,
                description,
                url,
                is_main_frame,
            } => {
                if !is_fatal_load_error(*code, *is_main_frame) {
                    debug!(code, url = %url, "ignoring non-fatal load failure");
                    return out;
                }
                state.error = Some(LoadError {
                    code: *code,
                    description: description.clone(),
                    url: url.clone(),
                });
                state.failed = true;
                state.is_loading = false;
                out.actions.push(HostAction::Hide);
                out.changed = true;
            }
            HostEventKind::DidNavigate { url, in_page } => {
                self.apply_navigation(state, url, *in_page, &mut out);
            }
            HostEventKind::PageTitleUpdated { title } => {
                let entry_changed = state
                    .history
                    .current_mut()
                    .is_some_and(|entry| set(&mut entry.title, title.clone()));
                out.changed = set(&mut state.title, title.clone()) | entry_changed;
            }
            HostEventKind::PageFaviconUpdated { favicons } => {
                if let Some(first) = favicons.first() {
                    out.changed = set(&mut state.favicon, Some(first.clone()));
                }
            }
            HostEventKind::EnterFullscreen => out.changed = set(&mut state.is_fullscreen, true),
            HostEventKind::LeaveFullscreen => out.changed = set(&mut state.is_fullscreen, false),
            HostEventKind::Focus => out.changed = set(&mut state.is_focused, true),
            HostEventKind::Blur => out.changed = set(&mut state.is_focused, false),
            HostEventKind::MediaStartedPlaying => {
                out.changed = set(&mut state.is_media_playing, true)
            }
            HostEventKind::MediaPaused => out.changed = set(&mut state.is_media_playing, false),
            HostEventKind::FoundInPage { result } => {
                out.changed = set(&mut state.find_result, Some(*result));
            }
            HostEventKind::IpcMessage { channel, payload } => {
                out.signals.push(BindingSignal::PageMessage(PageMessage::new(
                    channel.clone(),
                    payload.clone(),
                )));
            }
            HostEventKind::NewWindow { url, disposition } => {
                out.signals.push(BindingSignal::NewWindow {
                    url: url.clone(),
                    disposition: *disposition,
                });
            }
            HostEventKind::RenderProcessGone { reason } => {
                state.reset_surface_flags();
                state.failed = true;
                state.error = Some(LoadError {
                    code: 0,
                    description: format!("render process gone: {reason}"),
                    url: state.url.clone(),
                });
                out.signals.push(BindingSignal::SurfaceGone);
                out.changed = true;
            }
        }

        out
    }

    fn apply_navigation(
        &mut self,
        state: &mut ViewState,
        url: &str,
        in_page: bool,
        out: &mut BindingOutcome,
    ) {
        let target = canonical_url(url);
        let same_url = !state.url.is_empty() && canonical_url(&state.url) == target;

        let pending = match self.pending.take() {
            Some(pending) if canonical_url(pending.url()) == target => Some(pending),
            // A repeated commit of the current page leaves other loads pending.
            Some(pending) if same_url => {
                self.pending = Some(pending);
                None
            }
            Some(pending) => {
                debug!(pending = pending.url(), url = %url, "dropping stale pending load");
                None
            }
            None => None,
        };

        let host_changed = host_of(&state.url) != host_of(url);
        match pending {
            Some(PendingLoad::Step { back, .. }) => {
                let stepped = if back {
                    state.history.step_back()
                } else {
                    state.history.step_forward()
                };
                match stepped.map(|entry| entry.title.clone()) {
                    Some(title) if !title.is_empty() => state.title = title,
                    Some(_) => {}
                    None => state.history.replace_current(HistoryEntry::new(url, "")),
                }
            }
            Some(PendingLoad::Replace(_)) | None if same_url => return,
            Some(PendingLoad::Replace(_)) => {
                let title = state
                    .history
                    .current()
                    .filter(|entry| canonical_url(&entry.url) == target)
                    .map(|entry| entry.title.clone())
                    .unwrap_or_default();
                state.history.replace_current(HistoryEntry::new(url, title));
            }
            None => {
                state.history.push(HistoryEntry::new(url, ""));
                if !in_page {
                    out.signals.push(BindingSignal::Visited(url.to_string()));
                }
            }
        }

        if host_changed {
            state.detected_app = None;
        }
        if !in_page && !same_url {
            state.dom_ready = false;
            state.did_finish_load = false;
        }
        state.url = url.to_string();
        state.find_result = None;
        out.changed = true;
    }
}

/// Assign and report whether the value changed.
fn set<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}
