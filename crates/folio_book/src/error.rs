use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// A single chapter file could not be turned into a [`crate::ChapterDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {kind}", .path.display())]
pub struct ParseError {
    pub path: PathBuf,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("read failed: {0}")]
    Io(String),
    #[error("no front matter block (must open and close with a `---` line)")]
    MissingFrontMatter,
    #[error("front matter block is empty")]
    EmptyFrontMatter,
    #[error("malformed front matter: {0}")]
    Malformed(String),
    #[error("missing required key `{0}`")]
    MissingKey(&'static str),
    #[error("invalid value for `{key}`: {message}")]
    InvalidField { key: &'static str, message: String },
}

impl ParseError {
    pub fn new(path: impl Into<PathBuf>, kind: ParseErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Every way a set of chapters can fail to form a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(
        "{}: part {part} chapter {chapter} is already claimed by {}",
        .duplicate.display(),
        .first.display()
    )]
    DuplicateChapter {
        part: u32,
        chapter: u32,
        first: PathBuf,
        duplicate: PathBuf,
    },

    #[error("{}: status `{value}` is not one of: draft, complete", .path.display())]
    InvalidStatus { path: PathBuf, value: String },

    #[error(
        "{}: estimatedReadTime `{value}` is not a non-negative integer",
        .path.display()
    )]
    InvalidReadTime { path: PathBuf, value: String },

    #[error("{}: `{field}` still holds placeholder `{value}`", .path.display())]
    Placeholder {
        path: PathBuf,
        field: &'static str,
        value: String,
    },
}

/// Broad error category, used for structured output and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ParseError,
    DuplicateChapter,
    InvalidStatus,
    InvalidReadTime,
    Placeholder,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ParseError => "parse_error",
            ErrorKind::DuplicateChapter => "duplicate_chapter",
            ErrorKind::InvalidStatus => "invalid_status",
            ErrorKind::InvalidReadTime => "invalid_read_time",
            ErrorKind::Placeholder => "placeholder",
        }
    }
}

/// Machine-readable projection of a [`ValidationError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::Parse(_) => ErrorKind::ParseError,
            ValidationError::DuplicateChapter { .. } => ErrorKind::DuplicateChapter,
            ValidationError::InvalidStatus { .. } => ErrorKind::InvalidStatus,
            ValidationError::InvalidReadTime { .. } => ErrorKind::InvalidReadTime,
            ValidationError::Placeholder { .. } => ErrorKind::Placeholder,
        }
    }

    /// The offending file. For duplicates this is the later claimant.
    pub fn path(&self) -> &Path {
        match self {
            ValidationError::Parse(err) => &err.path,
            ValidationError::DuplicateChapter { duplicate, .. } => duplicate,
            ValidationError::InvalidStatus { path, .. }
            | ValidationError::InvalidReadTime { path, .. }
            | ValidationError::Placeholder { path, .. } => path,
        }
    }

    /// Rewrite every path this error mentions relative to `root`.
    pub fn relativize(&mut self, root: &Path) {
        match self {
            ValidationError::Parse(err) => relativize_path(&mut err.path, root),
            ValidationError::DuplicateChapter {
                first, duplicate, ..
            } => {
                relativize_path(first, root);
                relativize_path(duplicate, root);
            }
            ValidationError::InvalidStatus { path, .. }
            | ValidationError::InvalidReadTime { path, .. }
            | ValidationError::Placeholder { path, .. } => relativize_path(path, root),
        }
    }

    pub fn to_record(&self) -> ErrorRecord {
        ErrorRecord {
            kind: self.kind(),
            path: display_path(self.path()),
            message: self.to_string(),
        }
    }
}

/// Failure to enumerate the chapter files of a book root.
#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error("book root {} is not a directory", .path.display())]
    NotADirectory { path: PathBuf },
    #[error("read directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn relativize_path(path: &mut PathBuf, root: &Path) {
    if let Ok(rel) = path.strip_prefix(root) {
        *path = rel.to_path_buf();
    }
}

pub(crate) fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
