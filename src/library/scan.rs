//! Recursive filesystem enumeration for discovery passes.

use std::path::{Component, Path, PathBuf};

use super::catalog::LibraryError;

/// A regular file found under a scan root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the scan root
    pub relative: PathBuf,

    /// Path as enumerated (root joined with `relative`)
    pub path: PathBuf,
}

impl FileEntry {
    /// Relative path as a string, the form clips are keyed by
    pub fn relative_str(&self) -> String {
        self.relative.to_string_lossy().into_owned()
    }

    /// Base name of the file
    pub fn file_name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }
}

/// Make sure the root can be scanned at all.
///
/// This is the only fatal condition of discovery.
pub fn check_root(root: &Path) -> Result<(), LibraryError> {
    let metadata = std::fs::metadata(root).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LibraryError::RootNotFound(root.to_path_buf()),
        _ => LibraryError::Io {
            path: root.to_path_buf(),
            source: e,
        },
    })?;

    if !metadata.is_dir() {
        return Err(LibraryError::NotADirectory(root.to_path_buf()));
    }

    std::fs::read_dir(root).map_err(|e| LibraryError::Io {
        path: root.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// List every regular file under `root`, recursively.
///
/// Results are alphabetical within each directory. Entries that cannot be
/// read are logged and skipped; a missing root yields an empty list.
pub fn list_files(root: &Path) -> Vec<FileEntry> {
    // glob yields paths without `.` components, so match on the same form
    let base = strip_cur_dir(root);
    let pattern = if base.as_os_str().is_empty() {
        PathBuf::from("**").join("*")
    } else {
        let escaped = glob::Pattern::escape(&base.to_string_lossy());
        Path::new(&escaped).join("**").join("*")
    };
    let pattern = pattern.to_string_lossy();

    let paths = match glob::glob(&pattern) {
        Ok(paths) => paths,
        Err(e) => {
            tracing::warn!("Invalid scan pattern {}: {}", pattern, e);
            return Vec::new();
        }
    };

    let mut files = Vec::new();
    for entry in paths {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Error accessing entry: {}", e);
                continue;
            }
        };

        if !path.is_file() {
            continue;
        }

        match strip_cur_dir(&path).strip_prefix(&base) {
            Ok(relative) => files.push(FileEntry {
                relative: relative.to_path_buf(),
                path: path.clone(),
            }),
            Err(_) => tracing::warn!("Skipping {} outside {}", path.display(), root.display()),
        }
    }

    files
}

/// `root` without `.` components; `.` alone becomes the empty path
fn strip_cur_dir(root: &Path) -> PathBuf {
    root.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Case-insensitive extension test
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
