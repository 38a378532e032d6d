//! View pool and surface configuration types.

use serde::{Deserialize, Serialize};

/// View pool / surface settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewsConfig {
    /// Pre-warmed surfaces kept per destination class (valid range: 0-4).
    /// Zero disables pooling; every view is then created fresh.
    pub pool_size: u32,
    /// Readiness wait bound in milliseconds (valid range: 100-60000).
    pub readiness_timeout_ms: u32,
    /// Session partition surfaces are created in.
    pub partition: String,
    /// Custom user agent string.
    pub user_agent: Option<String>,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            pool_size: 1,
            readiness_timeout_ms: 5000,
            partition: "persist:tabshell".to_string(),
            user_agent: None,
        }
    }
}
