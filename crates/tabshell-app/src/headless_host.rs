//! Host bridge without an engine.
//!
//! Every load completes immediately: the host answers with the event
//! sequence a real engine produces for a successful navigation, queued on
//! an unbounded channel the shell drains.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tabshell_common::{canonical::host_of, HostError, InternalRoute, ViewId};
use tabshell_webview::{
    HistoryEntry, HostAction, HostBridge, HostEvent, HostEventKind, HostResponse,
    NavigationHistory, SurfaceOptions,
};
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// 1x1 transparent PNG returned for page captures.
const BLANK_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

#[derive(Debug)]
struct Surface {
    history: NavigationHistory,
    visible: bool,
}

impl Surface {
    fn current_url(&self) -> String {
        self.history
            .current()
            .map(|entry| entry.url.clone())
            .unwrap_or_default()
    }
}

pub struct HeadlessHost {
    events: mpsc::UnboundedSender<HostEvent>,
    surfaces: Mutex<HashMap<ViewId, Surface>>,
}

impl HeadlessHost {
    /// Create the host and the receiving end of its event stream.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<HostEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (
            Self {
                events,
                surfaces: Mutex::new(HashMap::new()),
            },
            rx,
        )
    }

    pub fn surface_count(&self) -> usize {
        self.lock().len()
    }

    #[cfg(test)]
    pub fn is_visible(&self, view_id: &ViewId) -> bool {
        self.lock().get(view_id).map(|s| s.visible).unwrap_or(false)
    }

    fn emit(&self, view_id: &ViewId, kind: HostEventKind) {
        trace!(view_id = %view_id, event = kind.name(), "host event");
        // The shell dropping its receiver just means nobody is listening.
        let _ = self.events.send(HostEvent::new(view_id.clone(), kind));
    }

    /// Queue the events of one successful main-frame load.
    fn emit_load(&self, view_id: &ViewId, url: &str) {
        self.emit(view_id, HostEventKind::DidStartLoading);
        self.emit(
            view_id,
            HostEventKind::DidNavigate {
                url: url.to_string(),
                in_page: false,
            },
        );
        self.emit(
            view_id,
            HostEventKind::PageTitleUpdated {
                title: title_for(url),
            },
        );
        self.emit(view_id, HostEventKind::DomReady);
        self.emit(view_id, HostEventKind::DidFinishLoad);
        self.emit(view_id, HostEventKind::DidStopLoading);
    }

    fn step(&self, view_id: &ViewId, back: bool) -> Result<(), HostError> {
        let target = self.with_surface(view_id, |s| {
            let entry = if back {
                s.history.step_back()
            } else {
                s.history.step_forward()
            };
            entry.map(|e| e.url.clone())
        })?;
        if let Some(url) = target {
            self.emit_load(view_id, &url);
        }
        Ok(())
    }

    fn with_surface<T>(
        &self,
        view_id: &ViewId,
        f: impl FnOnce(&mut Surface) -> T,
    ) -> Result<T, HostError> {
        let mut surfaces = self.lock();
        let surface = surfaces
            .get_mut(view_id)
            .ok_or_else(|| HostError::UnknownSurface(view_id.to_string()))?;
        Ok(f(surface))
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ViewId, Surface>> {
        self.surfaces.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl HostBridge for HeadlessHost {
    fn create_surface(&self, view_id: &ViewId, options: &SurfaceOptions) -> Result<(), HostError> {
        let history = options.history.clone().unwrap_or_else(|| {
            NavigationHistory::single(HistoryEntry::new(
                options.url.clone(),
                title_for(&options.url),
            ))
        });
        let surface = Surface {
            history,
            visible: options.activate,
        };
        self.lock().insert(view_id.clone(), surface);
        debug!(view_id = %view_id, url = %options.url, "surface created");
        self.emit_load(view_id, &options.url);
        Ok(())
    }

    fn send(&self, view_id: &ViewId, action: HostAction) -> Result<(), HostError> {
        match action {
            HostAction::Destroy => {
                self.lock().remove(view_id);
                debug!(view_id = %view_id, "surface destroyed");
            }
            HostAction::Activate => self.with_surface(view_id, |s| s.visible = true)?,
            HostAction::Hide => self.with_surface(view_id, |s| s.visible = false)?,
            HostAction::LoadUrl { url } => {
                self.with_surface(view_id, |s| {
                    s.history.push(HistoryEntry::new(url.clone(), title_for(&url)))
                })?;
                self.emit_load(view_id, &url);
            }
            HostAction::Reload { .. } => {
                let url = self.with_surface(view_id, |s| s.current_url())?;
                self.emit_load(view_id, &url);
            }
            HostAction::GoBack => self.step(view_id, true)?,
            HostAction::GoForward => self.step(view_id, false)?,
            other => {
                self.with_surface(view_id, |_| ())?;
                trace!(view_id = %view_id, action = other.name(), "action ignored");
            }
        }
        Ok(())
    }

    async fn request(
        &self,
        view_id: &ViewId,
        action: HostAction,
    ) -> Result<HostResponse, HostError> {
        let response = match action {
            HostAction::GetUrl => HostResponse::Url(self.with_surface(view_id, |s| s.current_url())?),
            HostAction::GetNavigationHistory => {
                HostResponse::History(self.with_surface(view_id, |s| s.history.clone())?)
            }
            HostAction::CapturePage => {
                self.with_surface(view_id, |_| ())?;
                HostResponse::Image(BLANK_PNG.to_vec())
            }
            HostAction::IsCurrentlyAudible => {
                self.with_surface(view_id, |_| ())?;
                HostResponse::Bool(false)
            }
            other => {
                self.send(view_id, other)?;
                HostResponse::Ack
            }
        };
        Ok(response)
    }
}

/// Title a page would report: the page name for internal routes, the host
/// for web pages.
fn title_for(url: &str) -> String {
    match InternalRoute::parse(url) {
        Some(InternalRoute::Core(page)) => page,
        Some(InternalRoute::Resource(id)) => format!("Resource {id}"),
        Some(InternalRoute::Notebook(id)) => format!("Notebook {id}"),
        None => host_of(url).unwrap_or_else(|| url.to_string()),
    }
}
