//! Unified action system for Ferry.
//!
//! Every user-triggerable action is represented by the [`Action`] enum.
//! [`ActionRegistry`] provides metadata (id, name, usage, category) and
//! fuzzy-search capabilities so frontends can offer help and suggestions.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// Every user-triggerable action in Ferry.
///
/// Variants carry no parameters. Arguments are attached when the frontend
/// turns an action into a [`Command`](crate::event::Command).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Session
    Connect,
    Disconnect,
    // Navigation
    Refresh,
    Open,
    GoParent,
    // File Operations
    NewFolder,
    Download,
    Upload,
    Delete,
    Rename,
    // Info
    DiskUsage,
    History,
    ServerStatus,
    // System
    Help,
    Quit,
}

/// Broad category for grouping actions in help output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCategory {
    Session,
    Navigation,
    FileOps,
    Info,
    System,
}

impl ActionCategory {
    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Session => "Session",
            Self::Navigation => "Navigation",
            Self::FileOps => "File",
            Self::Info => "Info",
            Self::System => "System",
        }
    }
}

/// Metadata for a single action.
#[derive(Debug, Clone)]
pub struct ActionDescriptor {
    pub action: Action,
    /// Word typed to trigger the action (e.g. `"cd"`).
    pub id: &'static str,
    /// Human-readable name (e.g. `"Open Directory"`).
    pub name: &'static str,
    /// Argument synopsis, empty when the action takes none.
    pub usage: &'static str,
    pub description: &'static str,
    pub category: ActionCategory,
}

/// Registry of all available actions with fuzzy-search support.
#[derive(Debug, Clone)]
pub struct ActionRegistry {
    descriptors: Vec<ActionDescriptor>,
}

impl ActionRegistry {
    /// Builds the registry containing every known action.
    pub fn new() -> Self {
        let descriptors = vec![
            // Session
            ActionDescriptor {
                action: Action::Connect,
                id: "connect",
                name: "Connect",
                usage: "<host[:port]> <username> <password>",
                description: "Log in to a remote host",
                category: ActionCategory::Session,
            },
            ActionDescriptor {
                action: Action::Disconnect,
                id: "disconnect",
                name: "Disconnect",
                usage: "",
                description: "Log out of the current host",
                category: ActionCategory::Session,
            },
            // Navigation
            ActionDescriptor {
                action: Action::Refresh,
                id: "ls",
                name: "Refresh",
                usage: "",
                description: "List the current directory again",
                category: ActionCategory::Navigation,
            },
            ActionDescriptor {
                action: Action::Open,
                id: "cd",
                name: "Open Directory",
                usage: "<path>",
                description: "Navigate into a directory",
                category: ActionCategory::Navigation,
            },
            ActionDescriptor {
                action: Action::GoParent,
                id: "up",
                name: "Go Parent",
                usage: "",
                description: "Navigate to parent directory",
                category: ActionCategory::Navigation,
            },
            // File Operations
            ActionDescriptor {
                action: Action::NewFolder,
                id: "mkdir",
                name: "New Folder",
                usage: "",
                description: "Create a folder in the current directory",
                category: ActionCategory::FileOps,
            },
            ActionDescriptor {
                action: Action::Download,
                id: "get",
                name: "Download",
                usage: "<path>",
                description: "Download a remote file",
                category: ActionCategory::FileOps,
            },
            ActionDescriptor {
                action: Action::Upload,
                id: "put",
                name: "Upload",
                usage: "<local file>",
                description: "Upload a local file into the current directory",
                category: ActionCategory::FileOps,
            },
            ActionDescriptor {
                action: Action::Delete,
                id: "rm",
                name: "Delete",
                usage: "<path>",
                description: "Delete a remote file or directory",
                category: ActionCategory::FileOps,
            },
            ActionDescriptor {
                action: Action::Rename,
                id: "mv",
                name: "Rename",
                usage: "<path>",
                description: "Rename a remote file or directory",
                category: ActionCategory::FileOps,
            },
            // Info
            ActionDescriptor {
                action: Action::DiskUsage,
                id: "df",
                name: "Disk Usage",
                usage: "",
                description: "Show disk usage on the remote host",
                category: ActionCategory::Info,
            },
            ActionDescriptor {
                action: Action::History,
                id: "history",
                name: "History",
                usage: "",
                description: "Show the remote shell history",
                category: ActionCategory::Info,
            },
            ActionDescriptor {
                action: Action::ServerStatus,
                id: "status",
                name: "Server Status",
                usage: "",
                description: "Show backend status and active connections",
                category: ActionCategory::Info,
            },
            // System
            ActionDescriptor {
                action: Action::Help,
                id: "help",
                name: "Help",
                usage: "",
                description: "Show available commands",
                category: ActionCategory::System,
            },
            ActionDescriptor {
                action: Action::Quit,
                id: "quit",
                name: "Quit",
                usage: "",
                description: "Exit Ferry",
                category: ActionCategory::System,
            },
        ];

        Self { descriptors }
    }

    /// Returns all registered action descriptors.
    pub fn all(&self) -> &[ActionDescriptor] {
        &self.descriptors
    }

    /// Fuzzy-searches descriptors by matching against name, description, and id.
    /// Returns results sorted by match score (best first).
    pub fn fuzzy_search(&self, query: &str) -> Vec<&ActionDescriptor> {
        if query.is_empty() {
            return self.descriptors.iter().collect();
        }
        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, &ActionDescriptor)> = self
            .descriptors
            .iter()
            .filter_map(|d| {
                let name_score = matcher.fuzzy_match(d.name, query).unwrap_or(0);
                let desc_score = matcher.fuzzy_match(d.description, query).unwrap_or(0);
                let id_score = matcher.fuzzy_match(d.id, query).unwrap_or(0);
                let best = name_score.max(desc_score).max(id_score);
                if best > 0 {
                    Some((best, d))
                } else {
                    None
                }
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, d)| d).collect()
    }

    /// Finds an action by the word that triggers it.
    pub fn find_by_id(&self, id: &str) -> Option<Action> {
        self.descriptors
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.action)
    }

    /// Returns the descriptor for a given action.
    pub fn descriptor_for(&self, action: Action) -> Option<&ActionDescriptor> {
        self.descriptors.iter().find(|d| d.action == action)
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
