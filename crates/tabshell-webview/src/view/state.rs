//! Observable View state.

use serde::{Deserialize, Serialize};

/// A committed load failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadError {
    pub code: i32,
    pub description: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub url: String,
    #[serde(default)]
    pub title: String,
}

impl HistoryEntry {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

/// Ordered back/forward list plus the current position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationHistory {
    pub entries: Vec<HistoryEntry>,
    pub index: usize,
}

impl NavigationHistory {
    pub fn single(entry: HistoryEntry) -> Self {
        Self {
            entries: vec![entry],
            index: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.index)
    }

    pub fn current_mut(&mut self) -> Option<&mut HistoryEntry> {
        self.entries.get_mut(self.index)
    }

    /// Drop forward entries and append `entry` as the new current one.
    pub fn push(&mut self, entry: HistoryEntry) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push(entry);
        self.index = self.entries.len() - 1;
    }

    /// Overwrite the current entry, or start the list if it is empty.
    pub fn replace_current(&mut self, entry: HistoryEntry) {
        match self.current_mut() {
            Some(current) => *current = entry,
            None => self.push(entry),
        }
    }

    pub fn can_go_back(&self) -> bool {
        !self.entries.is_empty() && self.index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Entry one step back (or forward) without moving the cursor.
    pub fn neighbor(&self, back: bool) -> Option<&HistoryEntry> {
        if back {
            self.index.checked_sub(1).and_then(|i| self.entries.get(i))
        } else {
            self.entries.get(self.index + 1)
        }
    }

    /// Move the cursor back and return the entry it now points at.
    pub fn step_back(&mut self) -> Option<&HistoryEntry> {
        if !self.can_go_back() {
            return None;
        }
        self.index -= 1;
        self.current()
    }

    pub fn step_forward(&mut self) -> Option<&HistoryEntry> {
        if !self.can_go_forward() {
            return None;
        }
        self.index += 1;
        self.current()
    }
}

/// Remote service or page type recognised from the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppKind {
    Youtube,
    Github,
    Notion,
    Figma,
    Twitter,
    GoogleDocs,
    Wikipedia,
    Pdf,
    Resource,
    Notebook,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedApp {
    pub kind: AppKind,
    /// Service-specific identifier (video id, repository slug, ...).
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindResult {
    pub active_match: u32,
    pub matches: u32,
}

/// Which container currently holds the View.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewContainer {
    #[default]
    None,
    Tab,
    Sidebar,
    Overlay,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub url: String,
    pub title: String,
    pub favicon: Option<String>,
    pub is_loading: bool,
    pub did_finish_load: bool,
    pub is_media_playing: bool,
    pub is_fullscreen: bool,
    pub is_focused: bool,
    pub dom_ready: bool,
    pub error: Option<LoadError>,
    pub failed: bool,
    pub history: NavigationHistory,
    pub detected_app: Option<DetectedApp>,
    pub resource_id: Option<String>,
    pub permanently_active: bool,
    /// Logically visible in its container. Stays set while a failed
    /// surface is hidden so it can come back on the next load.
    pub shown: bool,
    pub container: ViewContainer,
    pub find_result: Option<FindResult>,
    /// `data:image/png;base64,...` placeholder while surfaces are hidden.
    pub snapshot: Option<String>,
    pub destroyed: bool,
}

impl ViewState {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Clear everything that only describes the live surface.
    pub(crate) fn reset_surface_flags(&mut self) {
        self.is_loading = false;
        self.did_finish_load = false;
        self.dom_ready = false;
        self.is_media_playing = false;
        self.is_fullscreen = false;
        self.is_focused = false;
        self.shown = false;
        self.find_result = None;
    }
}
