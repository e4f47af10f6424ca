//! The display contract the orchestrator drives.
//!
//! A [`Frontend`] renders state and answers the few questions the core has
//! to ask the user (confirmation, a folder name, form contents). The core
//! never inspects how it does so.

use crate::error::CoreResult;
use crate::remote::entry::{DirectoryStats, RemoteEntry};
use crate::remote::transport::{RawPayload, UploadFile};

/// Severity of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// Identifies one busy indicator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LoadingKey {
    Connect,
    Disconnect,
    Refresh,
    /// The file listing area itself.
    FileList,
    UpDir,
    NewFolder,
    Upload,
    /// Per-entry download button.
    Download(String),
    /// Per-entry delete button.
    Delete(String),
    /// Per-entry rename button.
    Rename(String),
    Report,
}

/// Connection form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Host,
    Username,
    Password,
}

/// Everything the core needs from a user interface.
///
/// Methods take `&self`: the orchestrator and the loading backstop timer
/// may call in from different tasks.
pub trait Frontend: Send + Sync {
    fn show_status(&self, message: &str, kind: StatusKind);

    fn set_loading(&self, key: &LoadingKey, loading: bool);

    /// Renders a listing. Entries arrive already in display order.
    fn render_entries(&self, entries: &[RemoteEntry]);

    /// Replaces the listing with a single message line.
    fn render_placeholder(&self, message: &str);

    fn update_path_label(&self, path: &str);

    fn update_stats(&self, stats: DirectoryStats);

    /// `Some(host)` when connected, `None` after disconnect.
    fn update_connection(&self, host: Option<&str>);

    /// Blocks until the user answers.
    fn confirm(&self, prompt: &str) -> bool;

    /// Asks for a line of text. `None` means the user cancelled.
    fn prompt_text(&self, label: &str) -> Option<String>;

    fn form_field(&self, field: FormField) -> String;

    fn clear_password(&self);

    fn selected_upload(&self) -> Option<UploadFile>;

    fn clear_upload_selection(&self);

    /// Hands a downloaded file to the user.
    fn save_download(&self, file_name: &str, payload: RawPayload) -> CoreResult<()>;

    fn render_report(&self, title: &str, lines: &[String]);
}
