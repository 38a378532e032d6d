//! The tab model and its persisted form.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabshell_common::{TabId, ViewId};
use tabshell_webview::{NavigationHistory, View, ViewData, ViewState};

/// Where a tab is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TabLifecycle {
    Created,
    /// Inserted in the background; its View mounts on first activation.
    MarkedForLoad,
    Active,
    Inactive,
    Closed,
}

/// An ordered slot in the tab strip, wrapping exactly one View.
#[derive(Debug, Clone)]
pub struct Tab {
    pub id: TabId,
    pub view: Arc<View>,
    pub index: usize,
    pub pinned: bool,
    pub lifecycle: TabLifecycle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tab {
    pub fn new(id: TabId, view: Arc<View>) -> Self {
        let now = Utc::now();
        Self {
            id,
            view,
            index: 0,
            pinned: false,
            lifecycle: TabLifecycle::Created,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn view_id(&self) -> &ViewId {
        self.view.id()
    }

    pub fn url(&self) -> String {
        self.view.url()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn record(&self) -> TabRecord {
        TabRecord {
            id: self.id.clone(),
            index: self.index,
            pinned: self.pinned,
            created_at: self.created_at,
            updated_at: self.updated_at,
            view: ViewRecord::from_state(&self.view.state()),
        }
    }
}

/// What is written to the `tabs` table, one per tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabRecord {
    pub id: TabId,
    pub index: usize,
    #[serde(default)]
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub view: ViewRecord,
}

/// The persisted part of a View.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRecord {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub favicon: Option<String>,
    #[serde(default)]
    pub history: NavigationHistory,
    #[serde(default)]
    pub resource_id: Option<String>,
}

impl ViewRecord {
    pub fn from_state(state: &ViewState) -> Self {
        Self {
            url: state.url.clone(),
            title: state.title.clone(),
            favicon: state.favicon.clone(),
            history: state.history.clone(),
            resource_id: state.resource_id.clone(),
        }
    }

    /// Creation data that replays this record. A record with more than one
    /// history entry yields a fresh View.
    pub fn to_view_data(&self) -> ViewData {
        let history = if self.history.len() > 1 {
            self.history.clone()
        } else {
            NavigationHistory::default()
        };
        ViewData {
            url: self.url.clone(),
            title: (!self.title.is_empty()).then(|| self.title.clone()),
            favicon: self.favicon.clone(),
            history,
            resource_id: self.resource_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabshell_webview::HistoryEntry;

    fn two_entry_history() -> NavigationHistory {
        NavigationHistory {
            entries: vec![
                HistoryEntry::new("https://a.test", "A"),
                HistoryEntry::new("https://b.test", "B"),
            ],
            index: 1,
        }
    }

    #[test]
    fn view_record_copies_persisted_fields() {
        let mut state = ViewState::with_url("https://b.test");
        state.title = "B".into();
        state.history = two_entry_history();
        state.is_loading = true;

        let record = ViewRecord::from_state(&state);
        assert_eq!(record.url, "https://b.test");
        assert_eq!(record.title, "B");
        assert_eq!(record.history.len(), 2);
    }

    #[test]
    fn single_entry_history_is_not_replayed() {
        let record = ViewRecord {
            url: "https://a.test".into(),
            title: "A".into(),
            history: NavigationHistory::single(HistoryEntry::new("https://a.test", "A")),
            ..Default::default()
        };
        let data = record.to_view_data();
        assert!(data.history.is_empty());
        assert_eq!(data.title.as_deref(), Some("A"));
    }

    #[test]
    fn multi_entry_history_is_replayed() {
        let record = ViewRecord {
            url: "https://b.test".into(),
            history: two_entry_history(),
            ..Default::default()
        };
        let data = record.to_view_data();
        assert_eq!(data.history.len(), 2);
        assert_eq!(data.title, None);
    }

    #[test]
    fn tab_record_tolerates_missing_optional_fields() {
        let json = r#"{
            "id": "t1",
            "index": 3,
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-02T00:00:00Z",
            "view": { "url": "https://a.test" }
        }"#;
        let record: TabRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, TabId::from("t1"));
        assert_eq!(record.index, 3);
        assert!(!record.pinned);
        assert!(record.view.history.is_empty());
    }

    #[test]
    fn lifecycle_serializes_kebab_case() {
        let json = serde_json::to_string(&TabLifecycle::MarkedForLoad).unwrap();
        assert_eq!(json, "\"marked-for-load\"");
    }
}
