//! Sequences user actions against the remote session.
//!
//! The [`Orchestrator`] owns the current navigation path, runs one remote
//! operation per [`Command`] and reflects the outcome through the
//! [`Frontend`]. Every operation runs under a [`LoadingGuard`], so busy
//! indicators are lowered on success, on failure, on error and when the
//! backstop fires.
//!
//! The path is advanced before a listing is requested and is not rolled
//! back if the listing fails. Listings carry the navigation generation they
//! were issued under; a response that resolves after a newer navigation is
//! dropped.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::error::{CoreError, CoreResult};
use crate::event::Command;
use crate::frontend::{FormField, Frontend, LoadingKey, StatusKind};
use crate::loading::{LoadingGuard, DEFAULT_LOADING_TIMEOUT};
use crate::remote::client::{Credentials, RemoteClient};
use crate::remote::entry::{sort_for_display, DirectoryStats};
use crate::remote::path::{self, ROOT};
use crate::remote::session::Session;
use crate::remote::transport::Reply;

const NOT_CONNECTED: &str = "Not connected to any server";

#[derive(Debug)]
struct Navigation {
    path: String,
    generation: u64,
}

/// Drives a [`Frontend`] from remote operation results.
pub struct Orchestrator {
    client: RemoteClient,
    session: Arc<Session>,
    frontend: Arc<dyn Frontend>,
    nav: Mutex<Navigation>,
    loading_timeout: Duration,
}

impl Orchestrator {
    pub fn new(client: RemoteClient, frontend: Arc<dyn Frontend>) -> Self {
        Self {
            client,
            session: Arc::new(Session::new()),
            frontend,
            nav: Mutex::new(Navigation {
                path: ROOT.to_string(),
                generation: 0,
            }),
            loading_timeout: DEFAULT_LOADING_TIMEOUT,
        }
    }

    /// Overrides the loading backstop.
    pub fn with_loading_timeout(mut self, timeout: Duration) -> Self {
        self.loading_timeout = timeout;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_path(&self) -> String {
        self.nav().path.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_active()
    }

    /// Runs a command. Local errors are reported as an `"Error: ..."` status.
    pub async fn dispatch(&self, command: Command) {
        tracing::debug!(?command, "dispatching command");
        let result = match command {
            Command::Connect => self.connect_from_form().await,
            Command::Disconnect => self.disconnect().await,
            Command::Refresh => self.refresh().await,
            Command::NavigateTo(path) => self.navigate_to(&path).await,
            Command::NavigateUp => self.navigate_up().await,
            Command::NewFolder => self.new_folder().await,
            Command::Download(path) => self.download(&path).await,
            Command::Delete(path) => self.delete(&path).await,
            Command::Rename(path) => self.rename_prompt(&path).await,
            Command::Upload => self.upload().await,
            Command::DiskUsage => self.show_disk_usage().await,
            Command::History => self.show_history().await,
            Command::ServerStatus => self.show_server_status().await,
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "command failed");
            self.status(format!("Error: {e}"), StatusKind::Error);
        }
    }

    /// Reads the connection form and logs in.
    pub async fn connect_from_form(&self) -> CoreResult<()> {
        let credentials = Credentials::new(
            self.frontend.form_field(FormField::Host),
            self.frontend.form_field(FormField::Username),
            self.frontend.form_field(FormField::Password),
        );
        self.connect(credentials).await
    }

    /// Logs in, resets navigation to `/` and lists it.
    ///
    /// Connecting while connected replaces the session.
    pub async fn connect(&self, credentials: Credentials) -> CoreResult<()> {
        if !credentials.is_complete() {
            self.status("Please fill in all connection fields", StatusKind::Error);
            return Ok(());
        }
        let host = credentials.host_ip.as_str();
        let user = credentials.username.as_str();
        self.status(
            format!("Attempting to connect to {host} as {user}..."),
            StatusKind::Info,
        );

        let envelope = {
            let _loading = self.engage([LoadingKey::Connect]);
            self.client.login(&self.session, &credentials).await?
        };

        if !envelope.ok {
            self.status(
                format!("Connection failed: {}", envelope.message),
                StatusKind::Error,
            );
            return Ok(());
        }

        self.frontend.update_connection(Some(host));
        self.status(
            format!("Connected successfully to {host} as {user}"),
            StatusKind::Success,
        );
        self.frontend.clear_password();
        self.set_path(ROOT.to_string());
        self.refresh().await?;
        self.spawn_usage_probe();
        Ok(())
    }

    /// Logs out. On success the listing and path are reset.
    pub async fn disconnect(&self) -> CoreResult<()> {
        if !self.require_connection() {
            return Ok(());
        }
        let envelope = {
            let _loading = self.engage([LoadingKey::Disconnect]);
            self.client.logout(&self.session).await?
        };

        if !envelope.ok {
            self.status(
                format!("Logout failed: {}", envelope.message),
                StatusKind::Error,
            );
            return Ok(());
        }

        self.set_path(ROOT.to_string());
        self.frontend.update_connection(None);
        self.frontend.render_entries(&[]);
        self.frontend.update_path_label(ROOT);
        self.frontend.update_stats(DirectoryStats::default());
        self.status("Disconnected", StatusKind::Success);
        Ok(())
    }

    /// Lists the current directory.
    pub async fn refresh(&self) -> CoreResult<()> {
        self.list_current(None).await
    }

    /// Lists the current directory, raising `extra` alongside the listing
    /// indicators so they share one backstop.
    async fn list_current(&self, extra: Option<LoadingKey>) -> CoreResult<()> {
        if !self.require_connection() {
            return Ok(());
        }
        let (location, generation) = {
            let nav = self.nav();
            (nav.path.clone(), nav.generation)
        };
        self.status(format!("Loading files from {location}..."), StatusKind::Info);

        let result = {
            let keys = [LoadingKey::Refresh, LoadingKey::FileList];
            let _loading = self.engage(keys.into_iter().chain(extra));
            self.client.list(&self.session, &location).await
        };

        if self.nav().generation != generation {
            tracing::debug!(location = %location, "dropping stale listing");
            return Ok(());
        }

        let envelope = match result {
            Ok(envelope) => envelope,
            Err(e) => {
                self.frontend
                    .render_placeholder(&format!("An error occurred: {e}"));
                self.frontend.update_stats(DirectoryStats::default());
                return Err(e);
            }
        };

        self.frontend.update_path_label(&location);
        if envelope.ok {
            let entries = sort_for_display(&envelope.payload);
            self.frontend.render_entries(&entries);
            self.frontend
                .update_stats(DirectoryStats::from_entries(&entries));
            self.status(
                format!("Loaded {} items from {location}", entries.len()),
                StatusKind::Success,
            );
        } else {
            self.status(
                format!("Failed to list files: {}", envelope.message),
                StatusKind::Error,
            );
            let placeholder = if envelope.message.is_empty() {
                "Error accessing directory"
            } else {
                envelope.message.as_str()
            };
            self.frontend.render_placeholder(placeholder);
            self.frontend.update_stats(DirectoryStats::default());
        }
        Ok(())
    }

    /// Moves to `path` and lists it. The path is normalized first.
    pub async fn navigate_to(&self, path: &str) -> CoreResult<()> {
        self.set_path(path::normalize(path));
        self.refresh().await
    }

    /// Moves to the parent directory. Does nothing at `/`.
    pub async fn navigate_up(&self) -> CoreResult<()> {
        let Some(parent) = path::parent(&self.current_path()) else {
            return Ok(());
        };
        self.set_path(parent);
        self.list_current(Some(LoadingKey::UpDir)).await
    }

    /// Asks for a folder name, then creates it.
    pub async fn new_folder(&self) -> CoreResult<()> {
        if !self.require_connection() {
            return Ok(());
        }
        match self.frontend.prompt_text("Enter folder name:") {
            Some(name) => self.create_directory(&name).await,
            None => Ok(()),
        }
    }

    /// Creates `name` inside the current directory and re-lists it.
    pub async fn create_directory(&self, name: &str) -> CoreResult<()> {
        if name.is_empty() {
            return Ok(());
        }
        let target = path::join(&self.current_path(), name);
        self.status(format!("Creating folder \"{name}\"..."), StatusKind::Info);

        let envelope = {
            let _loading = self.engage([LoadingKey::NewFolder]);
            self.client.mkdir(&self.session, &target).await?
        };

        if envelope.ok {
            self.status(
                format!("Folder \"{name}\" created successfully"),
                StatusKind::Success,
            );
            self.refresh().await
        } else {
            self.status(
                format!("Failed to create folder: {}", envelope.message),
                StatusKind::Error,
            );
            Ok(())
        }
    }

    /// Downloads the file at `remote_path` and hands it to the frontend.
    pub async fn download(&self, remote_path: &str) -> CoreResult<()> {
        if !self.require_connection() {
            return Ok(());
        }
        let file_name = path::file_name(remote_path);
        self.status(format!("Downloading {file_name}..."), StatusKind::Info);

        let reply = {
            let _loading = self.engage([LoadingKey::Download(remote_path.to_string())]);
            self.client.fetch_file(&self.session, remote_path).await?
        };

        match reply {
            Reply::Raw(payload) => {
                let saved_as = payload
                    .file_name
                    .as_deref()
                    .map(path::file_name)
                    .filter(|name| !name.is_empty())
                    .unwrap_or(file_name)
                    .to_string();
                self.frontend.save_download(&saved_as, payload)?;
                self.status(
                    format!("Downloaded {saved_as} successfully"),
                    StatusKind::Success,
                );
            }
            Reply::Structured(envelope) => {
                self.status(
                    format!("Download failed: {}", envelope.message),
                    StatusKind::Error,
                );
            }
        }
        Ok(())
    }

    /// Deletes `remote_path` once the user confirms.
    pub async fn delete(&self, remote_path: &str) -> CoreResult<()> {
        if !self.require_connection() {
            return Ok(());
        }
        if !self
            .frontend
            .confirm(&format!("Are you sure you want to delete \"{remote_path}\"?"))
        {
            return Ok(());
        }
        self.status(format!("Deleting {remote_path}..."), StatusKind::Info);

        let envelope = {
            let _loading = self.engage([LoadingKey::Delete(remote_path.to_string())]);
            self.client.remove(&self.session, remote_path).await?
        };

        if envelope.ok {
            self.status(
                format!("Deleted {remote_path} successfully"),
                StatusKind::Success,
            );
            self.refresh().await
        } else {
            self.status(
                format!("Failed to delete: {}", envelope.message),
                StatusKind::Error,
            );
            Ok(())
        }
    }

    /// Asks for a new name, then renames `remote_path`.
    pub async fn rename_prompt(&self, remote_path: &str) -> CoreResult<()> {
        if !self.require_connection() {
            return Ok(());
        }
        match self.frontend.prompt_text("Enter new name:") {
            Some(name) => self.rename(remote_path, &name).await,
            None => Ok(()),
        }
    }

    /// Renames `remote_path` within its directory.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidName`] if `new_name` contains a path separator.
    pub async fn rename(&self, remote_path: &str, new_name: &str) -> CoreResult<()> {
        if new_name.is_empty() || new_name == path::file_name(remote_path) {
            return Ok(());
        }
        if new_name.contains('/') {
            return Err(CoreError::InvalidName(new_name.to_string()));
        }
        let target = path::sibling(remote_path, new_name);
        self.status(
            format!("Renaming {remote_path} to {target}..."),
            StatusKind::Info,
        );

        let envelope = {
            let _loading = self.engage([LoadingKey::Rename(remote_path.to_string())]);
            self.client
                .rename(&self.session, remote_path, &target)
                .await?
        };

        if envelope.ok {
            self.status(
                format!("Renamed {remote_path} to {target}"),
                StatusKind::Success,
            );
            self.refresh().await
        } else {
            self.status(
                format!("Failed to rename: {}", envelope.message),
                StatusKind::Error,
            );
            Ok(())
        }
    }

    /// Uploads the frontend's selected file into the current directory.
    pub async fn upload(&self) -> CoreResult<()> {
        if !self.require_connection() {
            return Ok(());
        }
        let Some(file) = self.frontend.selected_upload() else {
            self.status("Please select a file to upload", StatusKind::Error);
            return Ok(());
        };
        let location = self.current_path();
        let name = file.name.clone();
        self.status(
            format!("Uploading {name} to {location}..."),
            StatusKind::Info,
        );

        let envelope = {
            let _loading = self.engage([LoadingKey::Upload]);
            self.client
                .upload_file(&self.session, file, &location)
                .await?
        };

        if envelope.ok {
            self.status(format!("Uploaded {name} successfully"), StatusKind::Success);
            self.frontend.clear_upload_selection();
            self.refresh().await
        } else {
            self.status(
                format!("Upload failed: {}", envelope.message),
                StatusKind::Error,
            );
            Ok(())
        }
    }

    pub async fn show_disk_usage(&self) -> CoreResult<()> {
        if !self.require_connection() {
            return Ok(());
        }
        let envelope = {
            let _loading = self.engage([LoadingKey::Report]);
            self.client.disk_usage(&self.session).await?
        };
        self.report("Disk usage", envelope.ok, &envelope.message, &envelope.payload);
        Ok(())
    }

    pub async fn show_history(&self) -> CoreResult<()> {
        if !self.require_connection() {
            return Ok(());
        }
        let envelope = {
            let _loading = self.engage([LoadingKey::Report]);
            self.client.history(&self.session).await?
        };
        self.report(
            "Command history",
            envelope.ok,
            &envelope.message,
            &envelope.payload,
        );
        Ok(())
    }

    /// Shows backend health. Works while disconnected.
    pub async fn show_server_status(&self) -> CoreResult<()> {
        let envelope = {
            let _loading = self.engage([LoadingKey::Report]);
            self.client.server_status().await?
        };
        let status = envelope.payload;
        let mut lines = vec![format!("Active connections: {}", status.active_connections)];
        lines.extend(status.connections.iter().map(|c| {
            format!(
                "{}@{} (connected since {})",
                c.username, c.host, c.connected_since
            )
        }));
        self.report("Server status", envelope.ok, &envelope.message, &lines);
        Ok(())
    }

    fn report(&self, title: &str, ok: bool, message: &str, lines: &[String]) {
        if ok {
            self.frontend.render_report(title, lines);
        } else {
            self.status(format!("{title} unavailable: {message}"), StatusKind::Error);
        }
    }

    /// Logs remote disk usage in the background after a login.
    fn spawn_usage_probe(&self) {
        let client = self.client.clone();
        let session = Arc::clone(&self.session);
        tokio::spawn(async move {
            match client.disk_usage(&session).await {
                Ok(envelope) if envelope.ok => {
                    tracing::debug!(lines = ?envelope.payload, "remote disk usage");
                }
                Ok(envelope) => {
                    tracing::debug!(message = %envelope.message, "disk usage probe failed");
                }
                Err(e) => tracing::debug!(error = %e, "disk usage probe failed"),
            }
        });
    }

    fn require_connection(&self) -> bool {
        if self.session.is_active() {
            return true;
        }
        self.status(NOT_CONNECTED, StatusKind::Error);
        false
    }

    fn set_path(&self, path: String) {
        let mut nav = self.nav();
        nav.path = path;
        nav.generation += 1;
    }

    fn nav(&self) -> std::sync::MutexGuard<'_, Navigation> {
        self.nav.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn engage(&self, keys: impl IntoIterator<Item = LoadingKey>) -> LoadingGuard {
        LoadingGuard::engage(Arc::clone(&self.frontend), keys, self.loading_timeout)
    }

    fn status(&self, message: impl AsRef<str>, kind: StatusKind) {
        self.frontend.show_status(message.as_ref(), kind);
    }
}
