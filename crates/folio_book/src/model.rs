use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{display_path, relativize_path};

/// Editorial status of a chapter. Only `draft` and `complete` are legal;
/// anything else is kept verbatim so the manifest builder can reject it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Draft,
    Complete,
    Unrecognized(String),
}

impl Status {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "draft" => Status::Draft,
            "complete" => Status::Complete,
            _ => Status::Unrecognized(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Draft => "draft",
            Status::Complete => "complete",
            Status::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Status::Unrecognized(_))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// `estimatedReadTime` as written. `Invalid` keeps the source text of a value
/// that is not a non-negative integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReadTime {
    Minutes(u64),
    Invalid(String),
}

impl ReadTime {
    pub fn minutes(&self) -> Option<u64> {
        match self {
            ReadTime::Minutes(m) => Some(*m),
            ReadTime::Invalid(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDocument {
    #[serde(serialize_with = "serialize_path")]
    pub path: PathBuf,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<NaiveDate>,
    /// Resolved grouping key: `part`, falling back to `partNumber`.
    pub part: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_name: Option<String>,
    pub chapter: u32,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_read_time: Option<ReadTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartEntry {
    pub number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub chapters: Vec<ChapterDocument>,
    /// Minutes, summed over chapters that declare a read time.
    pub read_time: u64,
}

/// Validated, ordered view of the whole book. Only ever produced by
/// [`crate::build_manifest`] when no errors were found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookManifest {
    pub parts: Vec<PartEntry>,
    pub chapter_count: usize,
    pub total_read_time: u64,
    pub warnings: Vec<ManifestWarning>,
    /// sha256 over the canonical JSON of every chapter's metadata, paths excluded.
    pub fingerprint: String,
}

impl BookManifest {
    pub fn chapters(&self) -> impl Iterator<Item = &ChapterDocument> {
        self.parts.iter().flat_map(|part| part.chapters.iter())
    }

    pub fn part(&self, number: u32) -> Option<&PartEntry> {
        self.parts.iter().find(|part| part.number == number)
    }

    /// Rewrite chapter and warning paths relative to the book root.
    pub fn relativize(&mut self, root: &Path) {
        for part in &mut self.parts {
            for chapter in &mut part.chapters {
                relativize_path(&mut chapter.path, root);
            }
        }
        for warning in &mut self.warnings {
            warning.relativize(root);
        }
    }
}

/// Soft findings: reported alongside a manifest, never blocking it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ManifestWarning {
    MissingReadTime {
        #[serde(serialize_with = "serialize_path")]
        path: PathBuf,
    },
    PlaceholderField {
        #[serde(serialize_with = "serialize_path")]
        path: PathBuf,
        field: String,
        value: String,
    },
    ChapterGap {
        part: u32,
        after: u32,
        next: u32,
    },
    PartNumberMismatch {
        #[serde(serialize_with = "serialize_path")]
        path: PathBuf,
        part: u32,
        part_number: u32,
    },
    LastUpdatedBeforeDate {
        #[serde(serialize_with = "serialize_path")]
        path: PathBuf,
        date: NaiveDate,
        last_updated: NaiveDate,
    },
    PartNameConflict {
        part: u32,
        names: Vec<String>,
    },
}

impl ManifestWarning {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ManifestWarning::MissingReadTime { path }
            | ManifestWarning::PlaceholderField { path, .. }
            | ManifestWarning::PartNumberMismatch { path, .. }
            | ManifestWarning::LastUpdatedBeforeDate { path, .. } => Some(path),
            ManifestWarning::ChapterGap { .. } | ManifestWarning::PartNameConflict { .. } => None,
        }
    }

    fn relativize(&mut self, root: &Path) {
        match self {
            ManifestWarning::MissingReadTime { path }
            | ManifestWarning::PlaceholderField { path, .. }
            | ManifestWarning::PartNumberMismatch { path, .. }
            | ManifestWarning::LastUpdatedBeforeDate { path, .. } => relativize_path(path, root),
            ManifestWarning::ChapterGap { .. } | ManifestWarning::PartNameConflict { .. } => {}
        }
    }
}

impl fmt::Display for ManifestWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestWarning::MissingReadTime { path } => write!(
                f,
                "{}: no estimatedReadTime, counted as 0 minutes",
                path.display()
            ),
            ManifestWarning::PlaceholderField { path, field, value } => write!(
                f,
                "{}: `{}` still holds placeholder `{}`",
                path.display(),
                field,
                value
            ),
            ManifestWarning::ChapterGap { part, after, next } => write!(
                f,
                "part {}: chapter numbering jumps from {} to {}",
                part, after, next
            ),
            ManifestWarning::PartNumberMismatch {
                path,
                part,
                part_number,
            } => write!(
                f,
                "{}: part {} disagrees with partNumber {}; using part",
                path.display(),
                part,
                part_number
            ),
            ManifestWarning::LastUpdatedBeforeDate {
                path,
                date,
                last_updated,
            } => write!(
                f,
                "{}: lastUpdated {} is earlier than date {}",
                path.display(),
                last_updated,
                date
            ),
            ManifestWarning::PartNameConflict { part, names } => write!(
                f,
                "part {}: chapters disagree on partName ({})",
                part,
                names.join(", ")
            ),
        }
    }
}

fn serialize_path<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&display_path(path))
}
