//! Configuration schema types for tabshell.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with the defaults the shell ships with.

mod overlay;
mod system;
mod tabs;
mod views;

pub use overlay::*;
pub use system::*;
pub use tabs::*;
pub use views::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct ShellConfig {
    pub views: ViewsConfig,
    pub tabs: TabsConfig,
    pub overlay: OverlayConfig,
    pub persistence: PersistenceConfig,
    pub logging: LoggingConfig,
}

// =============================================================================
// Tests
// =============================================================================
