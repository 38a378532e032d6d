//! Host-process action channel.
//!
//! The host process owns the engine surfaces. The core addresses them by
//! [`ViewId`] and drives them with [`HostAction`]s; lifecycle events come
//! back asynchronously as [`HostEvent`](crate::events::HostEvent)s.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabshell_common::{HostError, Rect, ViewId};

use crate::view::NavigationHistory;

/// Everything the core can ask a live surface to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostAction {
    Activate,
    Focus,
    Hide,
    LoadUrl { url: String },
    Reload { ignore_cache: bool },
    GoBack,
    GoForward,
    SetBounds { bounds: Rect },
    SetAudioMuted { muted: bool },
    SetZoomFactor { factor: f64 },
    GetUrl,
    GetNavigationHistory,
    CapturePage,
    FindInPage {
        text: String,
        forward: bool,
        find_next: bool,
    },
    ExecuteJavascript { code: String },
    DownloadUrl { url: String },
    Destroy,
    OpenDevTools,
    /// Page message on a named channel.
    Send { channel: String, payload: Value },
    IsCurrentlyAudible,
}

impl HostAction {
    /// Wire name, used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Activate => "ACTIVATE",
            Self::Focus => "FOCUS",
            Self::Hide => "HIDE",
            Self::LoadUrl { .. } => "LOAD_URL",
            Self::Reload { .. } => "RELOAD",
            Self::GoBack => "GO_BACK",
            Self::GoForward => "GO_FORWARD",
            Self::SetBounds { .. } => "SET_BOUNDS",
            Self::SetAudioMuted { .. } => "SET_AUDIO_MUTED",
            Self::SetZoomFactor { .. } => "SET_ZOOM_FACTOR",
            Self::GetUrl => "GET_URL",
            Self::GetNavigationHistory => "GET_NAVIGATION_HISTORY",
            Self::CapturePage => "CAPTURE_PAGE",
            Self::FindInPage { .. } => "FIND_IN_PAGE",
            Self::ExecuteJavascript { .. } => "EXECUTE_JAVASCRIPT",
            Self::DownloadUrl { .. } => "DOWNLOAD_URL",
            Self::Destroy => "DESTROY",
            Self::OpenDevTools => "OPEN_DEV_TOOLS",
            Self::Send { .. } => "SEND",
            Self::IsCurrentlyAudible => "IS_CURRENTLY_AUDIBLE",
        }
    }
}

/// Typed reply to a [`HostBridge::request`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum HostResponse {
    Ack,
    Url(String),
    History(NavigationHistory),
    /// PNG bytes of a captured page.
    Image(Vec<u8>),
    Bool(bool),
    Value(Value),
}

impl HostResponse {
    pub fn into_url(self) -> Option<String> {
        match self {
            Self::Url(url) => Some(url),
            _ => None,
        }
    }

    pub fn into_history(self) -> Option<NavigationHistory> {
        match self {
            Self::History(history) => Some(history),
            _ => None,
        }
    }

    pub fn into_image(self) -> Option<Vec<u8>> {
        match self {
            Self::Image(png) => Some(png),
            _ => None,
        }
    }

    pub fn into_bool(self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Ack => Some(Value::Null),
            _ => None,
        }
    }
}

/// Parameters for creating an engine surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceOptions {
    /// Initial URL to load.
    pub url: String,
    /// Session partition shared by every surface.
    pub partition: String,
    pub user_agent: Option<String>,
    pub bounds: Option<Rect>,
    /// Show the surface as soon as it is created.
    pub activate: bool,
    pub permanently_active: bool,
    /// Back/forward list the surface starts with. Its current entry is
    /// `url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<NavigationHistory>,
}

impl SurfaceOptions {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            url: "about:blank".to_string(),
            partition: "persist:tabshell".to_string(),
            user_agent: None,
            bounds: None,
            activate: false,
            permanently_active: false,
            history: None,
        }
    }
}

/// The thin bridge to the process that actually renders pages.
#[async_trait]
pub trait HostBridge: Send + Sync {
    /// Create a surface for `view_id`. Must not call back into the View.
    fn create_surface(&self, view_id: &ViewId, options: &SurfaceOptions) -> Result<(), HostError>;

    /// Fire-and-forget action.
    fn send(&self, view_id: &ViewId, action: HostAction) -> Result<(), HostError>;

    /// Action with a typed reply.
    async fn request(&self, view_id: &ViewId, action: HostAction)
        -> Result<HostResponse, HostError>;
}
