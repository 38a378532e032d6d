//! Ordered tab collection over ViewManager Views.

pub mod closed_stack;
pub mod service;
pub mod strip;
pub mod tab;

pub use closed_stack::ClosedStack;
pub use service::{TabOptions, TabsService, ACTIVE_TAB_KEY};
pub use strip::TabStrip;
pub use tab::{Tab, TabLifecycle, TabRecord, ViewRecord};
