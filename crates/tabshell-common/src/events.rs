use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::id::{TabId, ViewId};

/// Events published to UI observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ShellEvent {
    TabCreated(TabId),
    TabDeleted(TabId),
    TabActivated(TabId),
    TabsReordered,
    ViewCreated(ViewId),
    ViewDeleted(ViewId),
    ViewActivated(ViewId),
    ViewDataChanged(ViewId),
    SidebarChanged { open: bool },
    NewWindowRequest { source: ViewId, url: String, active: bool },
    Shutdown,
    #[serde(other)]
    Unknown,
}

/// Fan-out channel for [`ShellEvent`]s. Cloning shares the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ShellEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ShellEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ShellEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
