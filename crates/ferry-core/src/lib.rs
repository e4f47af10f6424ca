//! Ferry core library: UI-agnostic client logic for a remote file-transfer
//! backend.
//!
//! `ferry-core` owns the single logical connection to a remote host and
//! sequences navigation and file operations against it. Rendering is left
//! to a [`Frontend`] implementation so that any UI (the `ferry` CLI, a GUI)
//! can drive the same logic.
//!
//! # Modules
//!
//! - [`remote`]: HTTP transport, session state and the typed remote operations.
//! - [`orchestrator`]: runs [`Command`]s and reflects their outcome through a [`Frontend`].
//! - [`loading`]: busy indicators that are guaranteed to clear.
//! - [`frontend`]: the display contract consumed by the orchestrator.
//! - [`action`]: the registry of user-triggerable actions with fuzzy search.
//! - [`config`]: TOML-based settings.
//! - [`event`]: commands for UI → Core communication.
//! - [`error`]: unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod action;
pub mod config;
pub mod error;
pub mod event;
pub mod frontend;
pub mod loading;
pub mod orchestrator;
pub mod remote;

#[cfg(test)]
pub(crate) mod test_support;

pub use action::{Action, ActionCategory, ActionDescriptor, ActionRegistry};
pub use config::settings::Config;
pub use error::{CoreError, CoreResult};
pub use event::Command;
pub use frontend::{FormField, Frontend, LoadingKey, StatusKind};
pub use loading::{LoadingGuard, LOADING_TIMEOUT_MESSAGE};
pub use orchestrator::Orchestrator;
pub use remote::client::{ConnectionSummary, Credentials, RemoteClient, ServerStatus};
pub use remote::entry::{DirectoryStats, EntryKind, RemoteEntry};
pub use remote::envelope::Envelope;
pub use remote::session::{Session, SessionDescriptor};
pub use remote::transport::{HttpTransport, RawPayload, Reply, Request, Transport, UploadFile};

/// Normalises a string to NFC (composed) form.
///
/// Backends running on macOS report filenames in NFD (decomposed), which
/// makes Korean Hangul appear as individual Jamo. This helper re-composes them.
pub fn nfc_string(s: &str) -> String {
    use unicode_normalization::UnicodeNormalization;
    s.nfc().collect()
}
