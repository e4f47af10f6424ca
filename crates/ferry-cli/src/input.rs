//! Turns a typed line into something the main loop can act on.

use std::path::PathBuf;

use ferry_core::action::{Action, ActionRegistry};
use ferry_core::event::Command;
use ferry_core::remote::path;

/// Result of parsing one input line.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    /// Dispatch a core command. `answer` pre-fills the next text prompt.
    Dispatch {
        command: Command,
        answer: Option<String>,
    },
    /// Fill the connection form and connect.
    Connect {
        host: String,
        username: String,
        password: String,
    },
    /// Select a local file, then upload it.
    Upload(Option<PathBuf>),
    Help,
    Quit,
    Empty,
    /// A required argument is missing.
    Usage {
        id: &'static str,
        usage: &'static str,
    },
    Unknown {
        word: String,
        suggestions: Vec<&'static str>,
    },
}

impl Input {
    fn dispatch(command: Command) -> Self {
        Self::Dispatch {
            command,
            answer: None,
        }
    }
}

/// Parses `line`. Relative remote paths are resolved against `cwd`.
pub fn parse_line(registry: &ActionRegistry, line: &str, cwd: &str) -> Input {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Input::Empty;
    };
    let args: Vec<&str> = words.collect();

    let Some(action) = registry.find_by_id(word) else {
        let suggestions = registry
            .fuzzy_search(word)
            .into_iter()
            .take(3)
            .map(|d| d.id)
            .collect();
        return Input::Unknown {
            word: word.to_string(),
            suggestions,
        };
    };

    let usage = || match registry.descriptor_for(action) {
        Some(d) => Input::Usage {
            id: d.id,
            usage: d.usage,
        },
        None => Input::Empty,
    };
    let first = args.first().copied();

    match action {
        Action::Connect => {
            let arg = |i: usize| args.get(i).map(|s| s.to_string()).unwrap_or_default();
            Input::Connect {
                host: arg(0),
                username: arg(1),
                password: arg(2),
            }
        }
        Action::Disconnect => Input::dispatch(Command::Disconnect),
        Action::Refresh => Input::dispatch(Command::Refresh),
        Action::Open => match first {
            None => usage(),
            Some("..") => Input::dispatch(Command::NavigateUp),
            Some(target) => Input::dispatch(Command::NavigateTo(resolve(cwd, target))),
        },
        Action::GoParent => Input::dispatch(Command::NavigateUp),
        Action::NewFolder => Input::Dispatch {
            command: Command::NewFolder,
            answer: first.map(str::to_string),
        },
        Action::Download => match first {
            Some(target) => Input::dispatch(Command::Download(resolve(cwd, target))),
            None => usage(),
        },
        Action::Upload => Input::Upload(first.map(PathBuf::from)),
        Action::Delete => match first {
            Some(target) => Input::dispatch(Command::Delete(resolve(cwd, target))),
            None => usage(),
        },
        Action::Rename => match first {
            Some(target) => Input::Dispatch {
                command: Command::Rename(resolve(cwd, target)),
                answer: args.get(1).map(|s| s.to_string()),
            },
            None => usage(),
        },
        Action::DiskUsage => Input::dispatch(Command::DiskUsage),
        Action::History => Input::dispatch(Command::History),
        Action::ServerStatus => Input::dispatch(Command::ServerStatus),
        Action::Help => Input::Help,
        Action::Quit => Input::Quit,
    }
}

/// Resolves `target` against the remote directory `cwd` and normalizes it.
fn resolve(cwd: &str, target: &str) -> String {
    if target.starts_with('/') {
        path::normalize(target)
    } else {
        path::normalize(&path::join(cwd, target))
    }
}
