//! Commands sent from a frontend to the [`Orchestrator`](crate::Orchestrator).
//!
//! The frontend translates user input (a typed line, a click on an entry)
//! into a [`Command`]; [`Orchestrator::dispatch`](crate::Orchestrator::dispatch)
//! runs it. Results flow back through the [`Frontend`](crate::Frontend) trait.

/// An action the frontend requests the core to perform.
///
/// Commands flow **frontend → core**. The core never creates commands itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Log in using the host, username and password form fields.
    Connect,
    /// Log out of the active session.
    Disconnect,
    /// Re-list the current directory.
    Refresh,
    /// Navigate into the directory at the given remote path.
    NavigateTo(String),
    /// Move to the parent directory.
    NavigateUp,
    /// Ask for a folder name and create it in the current directory.
    NewFolder,
    /// Download the remote file at the given path.
    Download(String),
    /// Delete the remote file or directory (after user confirmation).
    Delete(String),
    /// Ask for a new name and rename the entry at the given path.
    Rename(String),
    /// Upload the file currently selected in the frontend.
    Upload,
    /// Show remote disk usage.
    DiskUsage,
    /// Show the remote shell history.
    History,
    /// Show backend status (works while disconnected).
    ServerStatus,
}
