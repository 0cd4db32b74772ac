use std::path::{Path, PathBuf};

use crate::error::DiscoverError;

/// Which files under a book root count as chapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverOptions {
    /// File extensions without the leading dot, compared case-insensitively.
    pub extensions: Vec<String>,
    /// Directory names never descended into.
    pub skip_dirs: Vec<String>,
    /// File names or root-relative paths (forward slashes) to leave out.
    pub exclude: Vec<String>,
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["md".to_string()],
            skip_dirs: vec!["target".to_string(), "node_modules".to_string()],
            exclude: vec!["README.md".to_string(), "SUMMARY.md".to_string()],
        }
    }
}

/// Walk `root` and return every chapter file, sorted by path.
///
/// Hidden entries (leading `.`) are skipped. A subdirectory that cannot be
/// read is logged and skipped; only an unreadable root is an error.
pub fn discover_chapters(
    root: &Path,
    options: &DiscoverOptions,
) -> Result<Vec<PathBuf>, DiscoverError> {
    if !root.is_dir() {
        return Err(DiscoverError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let mut out: Vec<PathBuf> = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(source) if dir == root => {
                return Err(DiscoverError::ReadDir { path: dir, source });
            }
            Err(err) => {
                tracing::warn!(dir = %dir.display(), error = %err, "skipping unreadable directory");
                continue;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    tracing::warn!(dir = %dir.display(), error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with('.') {
                continue;
            }
            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(t) => t,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping entry of unknown type");
                    continue;
                }
            };

            if file_type.is_dir() {
                if !options.skip_dirs.iter().any(|skip| skip.as_str() == &*name) {
                    stack.push(path);
                }
                continue;
            }

            if !has_chapter_extension(&path, &options.extensions) {
                continue;
            }
            if is_excluded(root, &path, &options.exclude) {
                tracing::debug!(path = %path.display(), "excluded from chapter set");
                continue;
            }
            out.push(path);
        }
    }

    out.sort();
    tracing::debug!(root = %root.display(), files = out.len(), "discovered chapter files");
    Ok(out)
}

fn has_chapter_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
}

fn is_excluded(root: &Path, path: &Path, exclude: &[String]) -> bool {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let rel = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/");
    exclude
        .iter()
        .any(|pattern| pattern == &file_name || pattern == &rel)
}
