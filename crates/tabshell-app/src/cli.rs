use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// tabshell: a headless browser shell with persistent tabs.
#[derive(Parser, Debug)]
#[command(name = "tabshell", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Tab record file override.
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Operations on the tab strip. A tab is addressed by its id or by its
/// position in the strip.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the tab strip.
    List,
    /// Open a tab.
    Open {
        url: String,
        /// Keep the current selection.
        #[arg(long)]
        background: bool,
        #[arg(long)]
        pin: bool,
        /// Select an existing tab showing the same page instead of opening one.
        #[arg(long)]
        reuse: bool,
    },
    /// Select a tab.
    Activate { tab: String },
    /// Select the tab after the active one, wrapping around.
    Next,
    /// Select the tab before the active one, wrapping around.
    Prev,
    /// Close a tab. Pinned tabs only give up the selection.
    Close { tab: String },
    /// Reopen the most recently closed tab.
    Reopen,
    /// Move a tab to a new position.
    Move { tab: String, index: usize },
    Pin { tab: String },
    Unpin { tab: String },
    /// Navigate a tab.
    Navigate { tab: String, url: String },
    Back { tab: String },
    Forward { tab: String },
    /// Move a tab into the side panel.
    Sidebar { tab: String },
    /// Move the side panel's page back into the tab strip.
    Unsidebar,
    /// Float a page over the active tab.
    Overlay {
        url: String,
        #[arg(long, default_value_t = 360.0)]
        width: f64,
        #[arg(long, default_value_t = 480.0)]
        height: f64,
    },
    /// Simulate a window click at (x, y).
    Click { x: f64, y: f64 },
    /// Print the effective configuration as JSON.
    Config,
    /// Read commands from stdin, one per line, against a single session.
    Repl,
}

/// One line typed into the REPL.
#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
pub struct ReplLine {
    #[command(subcommand)]
    pub command: Command,
}

impl ReplLine {
    pub fn parse_line(line: &str) -> Result<Command, clap::Error> {
        Self::try_parse_from(line.split_whitespace()).map(|parsed| parsed.command)
    }
}

pub fn parse() -> Args {
    Args::parse()
}
