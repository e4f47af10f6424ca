//! Line-oriented [`Frontend`] that prints to a writer and reads answers
//! from a reader (stdout/stdin in the binary).

use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use ferry_core::action::ActionRegistry;
use ferry_core::error::{CoreError, CoreResult};
use ferry_core::frontend::{FormField, Frontend, LoadingKey, StatusKind};
use ferry_core::remote::entry::{DirectoryStats, RemoteEntry};
use ferry_core::remote::transport::{RawPayload, UploadFile};

#[derive(Debug, Default)]
struct ViewState {
    host: String,
    username: String,
    password: String,
    connected_to: Option<String>,
    path_label: String,
    upload: Option<UploadFile>,
    /// Answer for the next text prompt, given on the command line.
    queued_answer: Option<String>,
    busy: HashSet<LoadingKey>,
}

/// Renders core output as plain text lines.
pub struct TerminalFrontend {
    input: Mutex<Box<dyn BufRead + Send>>,
    output: Mutex<Box<dyn Write + Send>>,
    state: Mutex<ViewState>,
    download_dir: PathBuf,
}

impl TerminalFrontend {
    pub fn new(
        input: Box<dyn BufRead + Send>,
        output: Box<dyn Write + Send>,
        download_dir: PathBuf,
    ) -> Self {
        Self {
            input: Mutex::new(input),
            output: Mutex::new(output),
            state: Mutex::new(ViewState {
                path_label: "/".to_string(),
                ..ViewState::default()
            }),
            download_dir,
        }
    }

    /// A frontend on the process's stdin and stdout.
    pub fn stdio(download_dir: PathBuf) -> Self {
        Self::new(
            Box::new(io::BufReader::new(io::stdin())),
            Box::new(io::stdout()),
            download_dir,
        )
    }

    /// Prints the command prompt and reads one line. `None` on end of input.
    pub fn read_command(&self) -> Option<String> {
        let prompt = {
            let state = self.state();
            match &state.connected_to {
                Some(host) => format!("ferry {}:{}> ", host, state.path_label),
                None => "ferry> ".to_string(),
            }
        };
        self.ask(&prompt)
    }

    /// Stores the connection form fields.
    pub fn fill_form(&self, host: String, username: String, password: String) {
        let mut state = self.state();
        state.host = host;
        state.username = username;
        state.password = password;
    }

    pub fn select_upload(&self, file: UploadFile) {
        self.state().upload = Some(file);
    }

    /// Answers the next [`Frontend::prompt_text`] without reading input.
    /// `None` discards an answer left over from a previous command.
    pub fn queue_answer(&self, answer: Option<String>) {
        self.state().queued_answer = answer;
    }

    pub fn print_help(&self, registry: &ActionRegistry) {
        let mut lines = Vec::new();
        let mut category = None;
        for d in registry.all() {
            if category != Some(d.category) {
                category = Some(d.category);
                lines.push(format!("{}:", d.category.label()));
            }
            let synopsis = if d.usage.is_empty() {
                d.id.to_string()
            } else {
                format!("{} {}", d.id, d.usage)
            };
            lines.push(format!("  {synopsis:<44} {}", d.description));
        }
        self.write_lines(&lines);
    }

    pub fn print(&self, line: &str) {
        self.write_lines(&[line.to_string()]);
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lines(&self, lines: &[String]) {
        let mut out = self.output.lock().unwrap_or_else(PoisonError::into_inner);
        for line in lines {
            if let Err(e) = writeln!(out, "{line}") {
                tracing::warn!(error = %e, "failed to write to terminal");
                return;
            }
        }
        let _ = out.flush();
    }

    fn ask(&self, prompt: &str) -> Option<String> {
        {
            let mut out = self.output.lock().unwrap_or_else(PoisonError::into_inner);
            let _ = write!(out, "{prompt}");
            let _ = out.flush();
        }
        let mut line = String::new();
        let mut input = self.input.lock().unwrap_or_else(PoisonError::into_inner);
        match input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read from terminal");
                None
            }
        }
    }
}

impl Frontend for TerminalFrontend {
    fn show_status(&self, message: &str, kind: StatusKind) {
        let tag = match kind {
            StatusKind::Info => "..",
            StatusKind::Success => "ok",
            StatusKind::Error => "!!",
        };
        self.print(&format!("[{tag}] {message}"));
    }

    fn set_loading(&self, key: &LoadingKey, loading: bool) {
        tracing::trace!(?key, loading, "loading indicator");
        let mut state = self.state();
        if loading {
            state.busy.insert(key.clone());
        } else {
            state.busy.remove(key);
        }
    }

    fn render_entries(&self, entries: &[RemoteEntry]) {
        let lines: Vec<String> = entries.iter().map(entry_line).collect();
        if lines.is_empty() {
            self.print("  (empty)");
        } else {
            self.write_lines(&lines);
        }
    }

    fn render_placeholder(&self, message: &str) {
        self.print(&format!("  ({message})"));
    }

    fn update_path_label(&self, path: &str) {
        self.state().path_label = path.to_string();
    }

    fn update_stats(&self, stats: DirectoryStats) {
        self.print(&format!("  {stats}"));
    }

    fn update_connection(&self, host: Option<&str>) {
        self.state().connected_to = host.map(str::to_string);
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.ask(&format!("{prompt} [y/N] "))
            .map(|answer| matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false)
    }

    fn prompt_text(&self, label: &str) -> Option<String> {
        if let Some(answer) = self.state().queued_answer.take() {
            return Some(answer);
        }
        self.ask(&format!("{label} "))
            .map(|answer| answer.trim().to_string())
    }

    fn form_field(&self, field: FormField) -> String {
        let state = self.state();
        match field {
            FormField::Host => state.host.clone(),
            FormField::Username => state.username.clone(),
            FormField::Password => state.password.clone(),
        }
    }

    fn clear_password(&self) {
        self.state().password.clear();
    }

    fn selected_upload(&self) -> Option<UploadFile> {
        self.state().upload.clone()
    }

    fn clear_upload_selection(&self) {
        self.state().upload = None;
    }

    fn save_download(&self, file_name: &str, payload: RawPayload) -> CoreResult<()> {
        let target = download_target(&self.download_dir, file_name)?;
        std::fs::write(&target, &payload.bytes).map_err(|e| match e.kind() {
            io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(target.clone()),
            io::ErrorKind::NotFound => CoreError::NotFound(self.download_dir.clone()),
            _ => CoreError::Io(e),
        })?;
        tracing::info!(path = %target.display(), bytes = payload.bytes.len(), "saved download");
        Ok(())
    }

    fn render_report(&self, title: &str, lines: &[String]) {
        let mut out = vec![format!("{title}:")];
        out.extend(lines.iter().map(|l| format!("  {l}")));
        self.write_lines(&out);
    }
}

/// Local path for a downloaded file. Only the final component of the
/// announced name is used.
fn download_target(dir: &Path, file_name: &str) -> CoreResult<PathBuf> {
    Path::new(file_name)
        .file_name()
        .map(|name| dir.join(name))
        .ok_or_else(|| CoreError::InvalidName(file_name.to_string()))
}

fn entry_line(entry: &RemoteEntry) -> String {
    if entry.is_dir() {
        return format!("  d  {:>10}  {}/", "", entry.name());
    }
    let size = entry.size().map(format_size).unwrap_or_default();
    match entry.modified_at() {
        Some(modified) => format!("  -  {size:>10}  {}  {modified}", entry.name()),
        None => format!("  -  {size:>10}  {}", entry.name()),
    }
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_core::remote::entry::EntryKind;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Output sink the test can read back.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn frontend(input: &str, dir: &Path) -> (TerminalFrontend, Captured) {
        let out = Captured::default();
        let frontend = TerminalFrontend::new(
            Box::new(io::Cursor::new(input.as_bytes().to_vec())),
            Box::new(out.clone()),
            dir.to_path_buf(),
        );
        (frontend, out)
    }

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_size(2 * 1024 * 1024 * 1024), "2.0 GB");
    }

    #[test]
    fn confirm_accepts_yes() {
        let tmp = TempDir::new().unwrap();
        let (frontend, out) = frontend("yes\nn\n", tmp.path());

        assert!(frontend.confirm("Delete?"));
        assert!(!frontend.confirm("Delete?"));
        assert!(out.text().contains("Delete? [y/N] "));
    }

    #[test]
    fn confirm_at_end_of_input_is_no() {
        let tmp = TempDir::new().unwrap();
        let (frontend, _) = frontend("", tmp.path());
        assert!(!frontend.confirm("Delete?"));
    }

    #[test]
    fn queued_answer_skips_reading() {
        let tmp = TempDir::new().unwrap();
        let (frontend, out) = frontend("typed\n", tmp.path());

        frontend.queue_answer(Some("queued".to_string()));
        assert_eq!(frontend.prompt_text("Enter folder name:"), Some("queued".to_string()));
        assert!(out.text().is_empty());
        assert_eq!(frontend.prompt_text("Enter folder name:"), Some("typed".to_string()));
    }

    #[test]
    fn form_fields_and_password_clearing() {
        let tmp = TempDir::new().unwrap();
        let (frontend, _) = frontend("", tmp.path());

        frontend.fill_form("h".to_string(), "u".to_string(), "p".to_string());
        assert_eq!(frontend.form_field(FormField::Password), "p");
        frontend.clear_password();
        assert_eq!(frontend.form_field(FormField::Password), "");
        assert_eq!(frontend.form_field(FormField::Host), "h");
    }

    #[test]
    fn prompt_reflects_connection_and_path() {
        let tmp = TempDir::new().unwrap();
        let (frontend, out) = frontend("ls\n", tmp.path());

        frontend.update_connection(Some("10.0.0.5:22"));
        frontend.update_path_label("/docs");

        assert_eq!(frontend.read_command(), Some("ls".to_string()));
        assert!(out.text().starts_with("ferry 10.0.0.5:22:/docs> "));
        assert_eq!(frontend.read_command(), None);
    }

    #[test]
    fn render_entries_marks_directories() {
        let tmp = TempDir::new().unwrap();
        let (frontend, out) = frontend("", tmp.path());

        frontend.render_entries(&[
            RemoteEntry::new("docs", EntryKind::Dir, "/docs", None, None),
            RemoteEntry::new("a.txt", EntryKind::File, "/a.txt", Some(2048), None),
        ]);

        let text = out.text();
        assert!(text.contains("docs/"));
        assert!(text.contains("2.0 KB"));
    }

    #[test]
    fn save_download_writes_into_download_dir() {
        let tmp = TempDir::new().unwrap();
        let (frontend, _) = frontend("", tmp.path());

        frontend
            .save_download(
                "../escape.txt",
                RawPayload {
                    content_type: None,
                    file_name: None,
                    bytes: b"data".to_vec(),
                },
            )
            .unwrap();

        assert_eq!(std::fs::read(tmp.path().join("escape.txt")).unwrap(), b"data");
    }

    #[test]
    fn save_download_into_missing_dir_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let (frontend, _) = frontend("", &tmp.path().join("missing"));

        let err = frontend
            .save_download(
                "a.txt",
                RawPayload {
                    content_type: None,
                    file_name: None,
                    bytes: Vec::new(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn loading_keys_tracked() {
        let tmp = TempDir::new().unwrap();
        let (frontend, _) = frontend("", tmp.path());

        frontend.set_loading(&LoadingKey::Upload, true);
        assert!(frontend.state().busy.contains(&LoadingKey::Upload));
        frontend.set_loading(&LoadingKey::Upload, false);
        assert!(frontend.state().busy.is_empty());
    }

    #[test]
    fn help_groups_by_category() {
        let tmp = TempDir::new().unwrap();
        let (frontend, out) = frontend("", tmp.path());

        frontend.print_help(&ActionRegistry::new());

        let text = out.text();
        assert!(text.contains("Session:"));
        assert!(text.contains("connect <host[:port]> <username> <password>"));
    }
}
