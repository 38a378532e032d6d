//! System configuration types: persistence and logging.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where tab records are kept between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PersistenceConfig {
    /// Record store file. Defaults to the platform data directory.
    pub path: Option<PathBuf>,
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// `tracing_subscriber::EnvFilter` directive for the workspace crates.
    pub fn directive(self) -> &'static str {
        match self {
            Self::Trace => "tabshell=trace",
            Self::Debug => "tabshell=debug",
            Self::Info => "tabshell=info",
            Self::Warn => "tabshell=warn",
            Self::Error => "tabshell=error",
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}
