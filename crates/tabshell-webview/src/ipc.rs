//! Page messages exchanged with the code running inside a surface.
//!
//! Messages flow in both directions:
//! - **page -> core**: the host delivers them as `ipc-message` events.
//! - **core -> page**: sent with the `SEND` host action.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::bridge::HostAction;
use crate::view::DetectedApp;

/// Well-known channels.
pub mod channels {
    pub const HIGHLIGHT_SELECTION: &str = "highlight-selection";
    pub const PERMANENTLY_ACTIVE: &str = "permanently-active";
}

/// A message on a named channel with a JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMessage {
    pub channel: String,
    #[serde(default)]
    pub payload: Value,
}

/// Text the page should highlight and scroll to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionData {
    pub text: String,
    #[serde(default)]
    pub context: Option<String>,
}

impl SelectionData {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            context: None,
        }
    }
}

impl PageMessage {
    pub fn new(channel: impl Into<String>, payload: Value) -> Self {
        Self {
            channel: channel.into(),
            payload,
        }
    }

    /// Parse a raw JSON message as posted by a page.
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    pub fn highlight_selection(selection: &SelectionData, app: Option<&DetectedApp>) -> Self {
        Self::new(
            channels::HIGHLIGHT_SELECTION,
            json!({ "selection": selection, "app": app }),
        )
    }

    pub fn permanently_active(value: bool) -> Self {
        Self::new(channels::PERMANENTLY_ACTIVE, json!({ "value": value }))
    }

    pub fn into_action(self) -> HostAction {
        HostAction::Send {
            channel: self.channel,
            payload: self.payload,
        }
    }
}
