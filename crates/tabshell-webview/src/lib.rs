//! Render-surface lifecycle for the shell.
//!
//! Provides:
//! - The host-process protocol (actions, events, bridge trait)
//! - `View` and its Surface Binding
//! - `ViewManager`: pooling, activation and exclusivity
//! - `OverlayPool` for floating surfaces
//! - The content-store collaborator interface

pub mod bridge;
pub mod content;
pub mod events;
pub mod ipc;
pub mod manager;
pub mod overlay;
pub mod pool;
pub mod view;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use bridge::{HostAction, HostBridge, HostResponse, SurfaceOptions};
pub use content::{ContentMeta, ContentStore, MemoryContentStore};
pub use events::{HostEvent, HostEventKind, WindowDisposition};
pub use ipc::{PageMessage, SelectionData};
pub use manager::{ViewData, ViewIntent, ViewManager};
pub use overlay::OverlayPool;
pub use pool::ViewPool;
pub use view::{
    BindingSignal, DetectedApp, HistoryEntry, Interception, NavigationHistory, View,
    ViewContainer, ViewState,
};
