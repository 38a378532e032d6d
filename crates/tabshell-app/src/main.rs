mod cli;
mod commands;
mod file_store;
mod headless_host;
mod shell;

use std::path::PathBuf;
use std::sync::Arc;

use tabshell_common::{MemoryStore, RecordStore, ShellError};
use tabshell_config::ShellConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::cli::{Args, Command, ReplLine};
use crate::file_store::JsonFileStore;
use crate::headless_host::HeadlessHost;
use crate::shell::Shell;

fn main() {
    let args = cli::parse();

    // Config comes first so its log level can seed the filter; failures are
    // reported once logging is up.
    let loaded = match &args.config {
        Some(path) => tabshell_config::load_config_from(path),
        None => tabshell_config::load_config(),
    };
    let default_directive = match &loaded {
        Ok(config) => config.logging.level.directive(),
        Err(_) => "tabshell=info",
    };

    let log_directive = args.log_level.as_deref().unwrap_or(default_directive);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| "tabshell=info".parse().unwrap()),
            ),
        )
        .init();

    tracing::info!("tabshell v{} starting", env!("CARGO_PKG_VERSION"));

    if let Some(ref path) = args.config {
        tracing::info!("Using config override: {}", path.display());
    }
    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        ShellConfig::default()
    });

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {e}");
            std::process::exit(1);
        }
    };

    let code = match runtime.block_on(run(args, config)) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("tabshell: {e}");
            1
        }
    };
    tracing::info!("Shutdown complete");
    std::process::exit(code);
}

async fn run(args: Args, config: ShellConfig) -> Result<(), ShellError> {
    let command = args.command.unwrap_or(Command::List);
    let store = open_store(args.store, &config).await;

    let (host, events) = HeadlessHost::new();
    let host = Arc::new(host);
    let shell = Shell::new(config, host.clone(), events, store);
    shell.start().await;

    let result = match command {
        Command::Repl => repl(&shell).await,
        command => commands::execute(&shell, command).await.map(print_lines),
    };

    shell.shutdown().await;
    tracing::debug!(surfaces = host.surface_count(), "host surfaces left after shutdown");
    result
}

/// Read commands from stdin until EOF. Bad lines are reported and skipped.
async fn repl(shell: &Shell) -> Result<(), ShellError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if matches!(line, "quit" | "exit") {
            break;
        }
        match ReplLine::parse_line(line) {
            Ok(command) => match commands::execute(shell, command).await {
                Ok(output) => print_lines(output),
                Err(e) => eprintln!("error: {e}"),
            },
            Err(e) => eprintln!("{e}"),
        }
    }
    Ok(())
}

async fn open_store(path: Option<PathBuf>, config: &ShellConfig) -> Arc<dyn RecordStore> {
    let path = match path.or_else(|| config.persistence.path.clone()) {
        Some(path) => Ok(path),
        None => tabshell_config::default_store_path(),
    };
    let opened = match path {
        Ok(path) => JsonFileStore::open(path).await.map_err(ShellError::from),
        Err(e) => Err(ShellError::from(e)),
    };
    match opened {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!("Record store unavailable, tabs will not be saved: {e}");
            Arc::new(MemoryStore::new())
        }
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}
