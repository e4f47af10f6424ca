//! Remote directory entries as produced by the list operation.

use std::fmt;

use serde::Deserialize;

/// Whether an entry is a regular file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum EntryKind {
    #[serde(rename = "file")]
    File,
    #[serde(rename = "dir")]
    Dir,
}

/// A single file or directory on the remote host.
///
/// `RemoteEntry` is immutable and only ever built by decoding a listing.
/// Size and modification time exist for files only; they are dropped for
/// directories during decoding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "WireEntry")]
pub struct RemoteEntry {
    name: String,
    kind: EntryKind,
    path: String,
    size: Option<u64>,
    modified_at: Option<String>,
}

#[derive(Deserialize)]
struct WireEntry {
    name: String,
    #[serde(rename = "type")]
    kind: EntryKind,
    path: String,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default, rename = "mTime")]
    modified_at: Option<String>,
}

impl From<WireEntry> for RemoteEntry {
    fn from(wire: WireEntry) -> Self {
        Self::new(wire.name, wire.kind, wire.path, wire.size, wire.modified_at)
    }
}

impl RemoteEntry {
    /// Creates an entry, normalising the name to NFC and clearing file-only
    /// attributes on directories.
    pub fn new(
        name: impl Into<String>,
        kind: EntryKind,
        path: impl Into<String>,
        size: Option<u64>,
        modified_at: Option<String>,
    ) -> Self {
        let name = crate::nfc_string(&name.into());
        let (size, modified_at) = match kind {
            EntryKind::File => (size, modified_at),
            EntryKind::Dir => (None, None),
        };
        Self {
            name,
            kind,
            path: path.into(),
            size,
            modified_at,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Returns the absolute remote path of this entry.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Size in bytes. Always `None` for directories.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Backend-formatted modification time. Always `None` for directories.
    pub fn modified_at(&self) -> Option<&str> {
        self.modified_at.as_deref()
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Orders entries for display: directories first, then files, each group
/// sorted by name in case-sensitive ascending order.
///
/// Returns a **new** `Vec`; the input is left untouched.
pub fn sort_for_display(entries: &[RemoteEntry]) -> Vec<RemoteEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| {
        b.is_dir()
            .cmp(&a.is_dir())
            .then_with(|| a.name().cmp(b.name()))
    });
    sorted
}

/// Directory and file counts for the status line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectoryStats {
    pub directories: usize,
    pub files: usize,
}

impl DirectoryStats {
    pub fn from_entries(entries: &[RemoteEntry]) -> Self {
        let directories = entries.iter().filter(|e| e.is_dir()).count();
        Self {
            directories,
            files: entries.len() - directories,
        }
    }
}

impl fmt::Display for DirectoryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir_word = if self.directories == 1 {
            "directory"
        } else {
            "directories"
        };
        let file_word = if self.files == 1 { "file" } else { "files" };
        write!(
            f,
            "{} {dir_word}, {} {file_word}",
            self.directories, self.files
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> RemoteEntry {
        RemoteEntry::new(name, EntryKind::File, format!("/{name}"), Some(1), None)
    }

    fn dir(name: &str) -> RemoteEntry {
        RemoteEntry::new(name, EntryKind::Dir, format!("/{name}"), None, None)
    }

    #[test]
    fn decode_file_entry() {
        let entry: RemoteEntry = serde_json::from_str(
            r#"{"name":"a.txt","path":"/a.txt","size":120,"mTime":"2024-01-02 03:04:05","type":"file"}"#,
        )
        .unwrap();
        assert_eq!(entry.name(), "a.txt");
        assert_eq!(entry.path(), "/a.txt");
        assert_eq!(entry.kind(), EntryKind::File);
        assert_eq!(entry.size(), Some(120));
        assert_eq!(entry.modified_at(), Some("2024-01-02 03:04:05"));
    }

    #[test]
    fn decode_dir_drops_size_and_time() {
        let entry: RemoteEntry = serde_json::from_str(
            r#"{"name":"docs","path":"/docs","size":4096,"mTime":"2024-01-02 03:04:05","type":"dir"}"#,
        )
        .unwrap();
        assert!(entry.is_dir());
        assert_eq!(entry.size(), None, "directory size should always be absent");
        assert_eq!(entry.modified_at(), None);
    }

    #[test]
    fn decode_rejects_unknown_kind() {
        let result = serde_json::from_str::<RemoteEntry>(
            r#"{"name":"x","path":"/x","type":"socket"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn name_is_nfc_normalised() {
        // "한" written as decomposed Jamo
        let decomposed = "\u{1112}\u{1161}\u{11AB}.txt";
        let entry = file(decomposed);
        assert_eq!(entry.name(), "한.txt");
    }

    #[test]
    fn sort_puts_dirs_first_case_sensitive() {
        let input = vec![file("b"), dir("A"), file("a")];
        let sorted = sort_for_display(&input);
        let names: Vec<&str> = sorted.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["A", "a", "b"]);
        assert!(sorted[0].is_dir());
    }

    #[test]
    fn sort_orders_dirs_among_themselves() {
        let input = vec![dir("zeta"), file("alpha"), dir("Beta"), dir("beta")];
        let sorted = sort_for_display(&input);
        let names: Vec<&str> = sorted.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["Beta", "beta", "zeta", "alpha"]);
    }

    #[test]
    fn sort_does_not_mutate_input() {
        let input = vec![file("b"), dir("a")];
        let _ = sort_for_display(&input);
        assert_eq!(input[0].name(), "b");
    }

    #[test]
    fn stats_counts_and_pluralises() {
        let stats = DirectoryStats::from_entries(&[dir("a"), file("b"), file("c")]);
        assert_eq!(stats, DirectoryStats { directories: 1, files: 2 });
        assert_eq!(stats.to_string(), "1 directory, 2 files");
    }

    #[test]
    fn empty_stats() {
        let stats = DirectoryStats::from_entries(&[]);
        assert_eq!(stats.to_string(), "0 directories, 0 files");
    }
}
