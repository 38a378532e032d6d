use serde::{Deserialize, Serialize};
use tabshell_common::ViewId;

use crate::ipc::PageMessage;
use crate::view::{HistoryEntry, NavigationHistory, ViewState};

/// Destination data for [`ViewManager::create`](super::ViewManager::create).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewData {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub favicon: Option<String>,
    /// History to replay. Non-empty history always gets a fresh View.
    #[serde(default)]
    pub history: NavigationHistory,
    #[serde(default)]
    pub resource_id: Option<String>,
}

impl ViewData {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub(crate) fn into_state(self) -> ViewState {
        let title = self.title.unwrap_or_default();
        let history = if self.history.is_empty() {
            NavigationHistory::single(HistoryEntry::new(self.url.clone(), title.clone()))
        } else {
            self.history
        };
        ViewState {
            url: self.url,
            title,
            favicon: self.favicon,
            history,
            resource_id: self.resource_id,
            ..Default::default()
        }
    }
}

/// Requests the orchestrator cannot fulfil itself and hands upwards.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewIntent {
    /// A page asked for a new window; the tab layer should open it.
    OpenTab {
        source: ViewId,
        url: String,
        active: bool,
    },
    /// A page posted a message nobody in the core handles.
    PageMessage {
        view_id: ViewId,
        message: PageMessage,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_becomes_single_entry() {
        let mut data = ViewData::with_url("https://a.test");
        data.title = Some("A".into());
        let state = data.into_state();
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history.current().unwrap().title, "A");
        assert_eq!(state.title, "A");
    }

    #[test]
    fn explicit_history_is_kept() {
        let mut data = ViewData::with_url("https://b.test");
        data.history = NavigationHistory {
            entries: vec![
                HistoryEntry::new("https://a.test", ""),
                HistoryEntry::new("https://b.test", ""),
            ],
            index: 1,
        };
        let state = data.into_state();
        assert_eq!(state.history.len(), 2);
        assert_eq!(state.history.index, 1);
    }
}
