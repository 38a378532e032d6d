//! Floating overlay configuration types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Pre-warmed overlay surfaces (valid range: 0-2).
    pub pool_size: u32,
    /// Page the pooled overlay surface is primed with.
    pub url: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            pool_size: 1,
            url: "tabshell://core/command-palette".to_string(),
        }
    }
}
