//! Ferry: a terminal client for a remote file-transfer backend.
//!
//! This binary loads the configuration, wires the HTTP transport and the
//! line-oriented frontend into the core orchestrator, and runs a
//! read-dispatch loop until `quit` or end of input.

mod input;
mod settings;
mod terminal;

use std::sync::{Arc, Mutex};

use anyhow::Context;
use ferry_core::{
    ActionRegistry, Command, Frontend, HttpTransport, Orchestrator, RemoteClient, StatusKind,
    UploadFile,
};
use tracing_subscriber::EnvFilter;

use crate::input::{parse_line, Input};
use crate::terminal::TerminalFrontend;

const LOG_ENV: &str = "FERRY_LOG";
const DEFAULT_LOG_FILTER: &str = "ferry_core=info,ferry_cli=info";

/// Logs go to a file so they never interleave with the prompt.
fn init_tracing() -> anyhow::Result<()> {
    let path = std::env::temp_dir().join("ferry.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let config = settings::load()?;
    tracing::info!(base_url = %config.server.base_url, "starting ferry");

    let transport = HttpTransport::new(&config.server.base_url, config.server.request_timeout());
    let frontend = Arc::new(TerminalFrontend::stdio(config.ui.download_dir.clone()));
    let orchestrator = Orchestrator::new(RemoteClient::new(Arc::new(transport)), frontend.clone())
        .with_loading_timeout(config.ui.loading_timeout());

    frontend.print(&format!(
        "Ferry: backend {}. Type `help` for commands.",
        config.server.base_url
    ));
    run(&orchestrator, &frontend, &ActionRegistry::new()).await;

    if orchestrator.is_connected() {
        orchestrator.dispatch(Command::Disconnect).await;
    }
    Ok(())
}

async fn run(orchestrator: &Orchestrator, frontend: &TerminalFrontend, registry: &ActionRegistry) {
    while let Some(line) = frontend.read_command() {
        match parse_line(registry, &line, &orchestrator.current_path()) {
            Input::Empty => {}
            Input::Quit => break,
            Input::Help => frontend.print_help(registry),
            Input::Usage { id, usage } => {
                frontend.show_status(&format!("usage: {id} {usage}"), StatusKind::Error);
            }
            Input::Unknown { word, suggestions } => {
                let hint = if suggestions.is_empty() {
                    String::new()
                } else {
                    format!(" Did you mean: {}?", suggestions.join(", "))
                };
                frontend.show_status(&format!("Unknown command `{word}`.{hint}"), StatusKind::Error);
            }
            Input::Connect {
                host,
                username,
                password,
            } => {
                frontend.fill_form(host, username, password);
                orchestrator.dispatch(Command::Connect).await;
            }
            Input::Upload(path) => {
                if let Some(path) = path {
                    match UploadFile::from_path(&path) {
                        Ok(file) => frontend.select_upload(file),
                        Err(e) => {
                            frontend.show_status(&format!("Error: {e}"), StatusKind::Error);
                            continue;
                        }
                    }
                }
                orchestrator.dispatch(Command::Upload).await;
            }
            Input::Dispatch { command, answer } => {
                frontend.queue_answer(answer);
                orchestrator.dispatch(command).await;
            }
        }
    }
}
