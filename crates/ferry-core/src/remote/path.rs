//! Helpers for slash-separated remote paths.
//!
//! Remote paths are plain strings: the remote host may not share the local
//! platform's separator, so `std::path` is deliberately not used here.

/// The remote root directory.
pub const ROOT: &str = "/";

/// Returns the parent of `path`, or `None` when `path` is already the root.
///
/// Empty segments are ignored, so `"/a//b/"` has parent `"/a"`.
pub fn parent(path: &str) -> Option<String> {
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    segments.pop()?;
    Some(format!("/{}", segments.join("/")))
}

/// Returns the absolute form of `path`.
///
/// Empty and `.` segments are dropped, `..` removes the previous segment
/// (never climbing above the root) and trailing slashes are removed.
/// A relative `path` is taken from the root.
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Appends `name` to the directory `dir` without doubling a slash.
pub fn join(dir: &str, name: &str) -> String {
    format!("{}/{name}", dir.trim_end_matches('/'))
}

/// Returns the last component of `path`.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Returns the path `name` would have next to `path` in the same directory.
pub fn sibling(path: &str, name: &str) -> String {
    let dir = parent(path).unwrap_or_else(|| ROOT.to_string());
    join(&dir, name)
}
