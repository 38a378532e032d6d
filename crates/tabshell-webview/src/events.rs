//! Host-process event stream.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabshell_common::ViewId;

use crate::view::FindResult;

/// One event pushed by the host process for one surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostEvent {
    pub view_id: ViewId,
    pub kind: HostEventKind,
}

impl HostEvent {
    pub fn new(view_id: ViewId, kind: HostEventKind) -> Self {
        Self { view_id, kind }
    }
}

/// How the page asked for a new window to be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowDisposition {
    ForegroundTab,
    BackgroundTab,
    NewWindow,
    Other,
}

impl WindowDisposition {
    /// Whether the opened tab should take focus.
    pub fn is_foreground(self) -> bool {
        !matches!(self, Self::BackgroundTab)
    }
}

/// Event payloads, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HostEventKind {
    DidStartLoading,
    DidStopLoading,
    DidFinishLoad,
    DomReady,
    DidFailLoad {
        code: i32,
        description: String,
        url: String,
        is_main_frame: bool,
    },
    /// Navigation committed.
    DidNavigate {
        url: String,
        #[serde(default)]
        in_page: bool,
    },
    PageTitleUpdated { title: String },
    PageFaviconUpdated { favicons: Vec<String> },
    EnterFullscreen,
    LeaveFullscreen,
    Focus,
    Blur,
    MediaStartedPlaying,
    MediaPaused,
    FoundInPage { result: FindResult },
    /// Opaque page-originated message.
    IpcMessage {
        channel: String,
        #[serde(default)]
        payload: Value,
    },
    NewWindow {
        url: String,
        disposition: WindowDisposition,
    },
    RenderProcessGone { reason: String },
}

impl HostEventKind {
    /// Wire name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DidStartLoading => "did-start-loading",
            Self::DidStopLoading => "did-stop-loading",
            Self::DidFinishLoad => "did-finish-load",
            Self::DomReady => "dom-ready",
            Self::DidFailLoad { .. } => "did-fail-load",
            Self::DidNavigate { .. } => "did-navigate",
            Self::PageTitleUpdated { .. } => "page-title-updated",
            Self::PageFaviconUpdated { .. } => "page-favicon-updated",
            Self::EnterFullscreen => "enter-fullscreen",
            Self::LeaveFullscreen => "leave-fullscreen",
            Self::Focus => "focus",
            Self::Blur => "blur",
            Self::MediaStartedPlaying => "media-started-playing",
            Self::MediaPaused => "media-paused",
            Self::FoundInPage { .. } => "found-in-page",
            Self::IpcMessage { .. } => "ipc-message",
            Self::NewWindow { .. } => "new-window",
            Self::RenderProcessGone { .. } => "render-process-gone",
        }
    }
}
