//! Command execution against a running [`Shell`].

use tabshell_common::{ShellError, TabId};
use tabshell_config::config_to_json;
use tabshell_tabs::{Tab, TabOptions};

use crate::cli::Command;
use crate::shell::Shell;

/// Run one command and return the lines to print.
pub async fn execute(shell: &Shell, command: Command) -> Result<Vec<String>, ShellError> {
    let lines = match command {
        Command::List => list(shell),
        Command::Config => vec![config_to_json(shell.config())],
        Command::Open {
            url,
            background,
            pin,
            reuse,
        } => {
            let opts = TabOptions {
                active: !background,
                pinned: pin,
                ..Default::default()
            };
            let opened = if reuse {
                shell.tabs().open_or_create(&url, opts).await
            } else {
                shell.tabs().create(&url, opts).await
            };
            let id = opened.ok_or_else(|| ShellError::Other(format!("could not open {url}")))?;
            vec![id.to_string()]
        }
        Command::Activate { tab } => {
            let id = resolve_tab(shell, &tab)?;
            ensure(shell.tabs().activate_tab(&id).await, "activate", &tab)?;
            Vec::new()
        }
        Command::Next => selected(shell.tabs().select_next().await),
        Command::Prev => selected(shell.tabs().select_prev().await),
        Command::Close { tab } => {
            let id = resolve_tab(shell, &tab)?;
            ensure(shell.tabs().close_tab(&id).await, "close", &tab)?;
            Vec::new()
        }
        Command::Reopen => match shell.tabs().reopen_last_closed().await {
            Some(id) => vec![id.to_string()],
            None => return Err(ShellError::Other("no recently closed tab".into())),
        },
        Command::Move { tab, index } => {
            let id = resolve_tab(shell, &tab)?;
            ensure(shell.tabs().reorder_tab(&id, index).await, "move", &tab)?;
            Vec::new()
        }
        Command::Pin { tab } => {
            let id = resolve_tab(shell, &tab)?;
            ensure(shell.tabs().set_pinned(&id, true).await, "pin", &tab)?;
            Vec::new()
        }
        Command::Unpin { tab } => {
            let id = resolve_tab(shell, &tab)?;
            ensure(shell.tabs().set_pinned(&id, false).await, "unpin", &tab)?;
            Vec::new()
        }
        Command::Navigate { tab, url } => {
            let tab_ref = loaded_tab(shell, &tab)?;
            ensure(tab_ref.view.navigate(&url), "navigate", &tab)?;
            Vec::new()
        }
        Command::Back { tab } => {
            let tab_ref = loaded_tab(shell, &tab)?;
            ensure(tab_ref.view.go_back(), "go back in", &tab)?;
            Vec::new()
        }
        Command::Forward { tab } => {
            let tab_ref = loaded_tab(shell, &tab)?;
            ensure(tab_ref.view.go_forward(), "go forward in", &tab)?;
            Vec::new()
        }
        Command::Sidebar { tab } => {
            let id = resolve_tab(shell, &tab)?;
            ensure(shell.tabs().move_to_sidebar(&id).await, "move to side panel", &tab)?;
            Vec::new()
        }
        Command::Unsidebar => match shell
            .tabs()
            .move_sidebar_to_tabs(TabOptions::default())
            .await
        {
            Some(id) => vec![id.to_string()],
            None => return Err(ShellError::Other("side panel is empty".into())),
        },
        Command::Overlay { url, width, height } => match shell.open_overlay(&url, width, height) {
            Some(id) => vec![id.to_string()],
            None => return Err(ShellError::Other(format!("could not open overlay {url}"))),
        },
        Command::Click { x, y } => {
            let dismissed = shell.click(x, y);
            vec![if dismissed { "overlay dismissed" } else { "no change" }.to_string()]
        }
        Command::Repl => {
            return Err(ShellError::Other("already in a session".into()));
        }
    };
    shell.pump().await;
    Ok(lines)
}

/// A tab addressed by strip position or by id.
pub fn resolve_tab(shell: &Shell, tab: &str) -> Result<TabId, ShellError> {
    let ids = shell.tabs().ids();
    if let Ok(index) = tab.parse::<usize>() {
        if let Some(id) = ids.get(index) {
            return Ok(id.clone());
        }
    }
    let id = TabId::from(tab);
    if ids.contains(&id) {
        Ok(id)
    } else {
        Err(ShellError::Other(format!("no tab {tab}")))
    }
}

fn loaded_tab(shell: &Shell, tab: &str) -> Result<Tab, ShellError> {
    let id = resolve_tab(shell, tab)?;
    let tab_ref = shell
        .tabs()
        .get(&id)
        .ok_or_else(|| ShellError::Other(format!("no tab {tab}")))?;
    if !tab_ref.view.is_hot() {
        return Err(ShellError::Other(format!("tab {tab} is not loaded yet")));
    }
    Ok(tab_ref)
}

fn ensure(ok: bool, verb: &str, tab: &str) -> Result<(), ShellError> {
    if ok {
        Ok(())
    } else {
        Err(ShellError::Other(format!("could not {verb} tab {tab}")))
    }
}

fn selected(id: Option<TabId>) -> Vec<String> {
    id.map(|id| vec![id.to_string()]).unwrap_or_default()
}

fn list(shell: &Shell) -> Vec<String> {
    let active = shell.tabs().active_id();
    let mut lines: Vec<String> = shell
        .tabs()
        .tabs()
        .iter()
        .map(|tab| format_tab(tab, active.as_ref() == Some(&tab.id)))
        .collect();
    if let Some(view) = shell.views().sidebar_view() {
        lines.push(format!("  side panel  {}  {}", view.state().title, view.url()));
    }
    lines
}

fn format_tab(tab: &Tab, active: bool) -> String {
    let state = tab.view.state();
    format!(
        "{}{:>3} {} {}  {}  {}",
        if active { '*' } else { ' ' },
        tab.index,
        if tab.pinned { 'P' } else { ' ' },
        tab.id,
        if state.title.is_empty() { "-" } else { state.title.as_str() },
        state.url,
    )
}
