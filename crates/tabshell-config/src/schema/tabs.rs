//! Tab strip configuration types.

use serde::{Deserialize, Serialize};

/// Tab collection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TabsConfig {
    /// URL of the tab opened when the strip would otherwise be empty.
    pub default_url: String,
    /// Recently closed tabs kept for reopening (valid range: 1-1024).
    pub closed_stack_capacity: u32,
    /// Coalescing window for tab record writes, in milliseconds (0-5000).
    pub persist_debounce_ms: u32,
    /// Recreate the previous session's tabs on launch.
    pub restore_on_launch: bool,
}

impl Default for TabsConfig {
    fn default() -> Self {
        Self {
            default_url: "tabshell://core/new-tab".to_string(),
            closed_stack_capacity: 96,
            persist_debounce_ms: 200,
            restore_on_launch: true,
        }
    }
}
