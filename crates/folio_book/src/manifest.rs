use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::canonical_fingerprint;
use crate::error::ValidationError;
use crate::load::{default_jobs, load_chapters};
use crate::model::{BookManifest, ChapterDocument, ManifestWarning, PartEntry, ReadTime, Status};
use crate::read_time::sum_parts;

/// What to do with `reviewer`/`translator` values that are placeholders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderPolicy {
    Ignore,
    #[default]
    Warn,
    Error,
}

impl PlaceholderPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            PlaceholderPolicy::Ignore => "ignore",
            PlaceholderPolicy::Warn => "warn",
            PlaceholderPolicy::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub jobs: usize,
    pub placeholder_policy: PlaceholderPolicy,
    /// Values of `reviewer`/`translator` that mean "not assigned yet".
    /// Compared case-insensitively after trimming.
    pub placeholders: Vec<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            placeholder_policy: PlaceholderPolicy::Warn,
            placeholders: vec!["TBD".to_string()],
        }
    }
}

/// Load every chapter and assemble the book manifest.
///
/// Parse failures never stop the run: every file is loaded, every
/// cross-file check runs, and either a manifest (zero errors) or the
/// complete error list comes back.
pub fn build_manifest(paths: &[PathBuf]) -> Result<BookManifest, Vec<ValidationError>> {
    build_manifest_with_options(paths, &BuildOptions::default())
}

pub fn build_manifest_with_options(
    paths: &[PathBuf],
    options: &BuildOptions,
) -> Result<BookManifest, Vec<ValidationError>> {
    let mut errors: Vec<ValidationError> = Vec::new();
    let mut docs: Vec<ChapterDocument> = Vec::new();
    for loaded in load_chapters(paths, options.jobs) {
        match loaded {
            Ok(doc) => docs.push(doc),
            Err(err) => errors.push(err.into()),
        }
    }
    // Input order must not leak into duplicate attribution or warning order.
    docs.sort_by(|a, b| a.path.cmp(&b.path));

    let mut warnings: Vec<ManifestWarning> = Vec::new();
    for doc in &docs {
        check_document(doc, options, &mut errors, &mut warnings);
    }
    check_duplicates(&docs, &mut errors);

    if !errors.is_empty() {
        errors.sort_by(|a, b| {
            a.path()
                .cmp(b.path())
                .then(a.kind().cmp(&b.kind()))
                .then_with(|| a.to_string().cmp(&b.to_string()))
        });
        tracing::info!(
            files = paths.len(),
            errors = errors.len(),
            "manifest rejected"
        );
        return Err(errors);
    }

    let mut parts = assemble_parts(docs, &mut warnings);
    let report = sum_parts(&parts);
    for part in &mut parts {
        part.read_time = report.per_part.get(&part.number).copied().unwrap_or(0);
    }
    warnings.extend(report.warnings);

    let chapter_count = parts.iter().map(|p| p.chapters.len()).sum();
    let fingerprint = fingerprint_parts(&parts);
    tracing::info!(
        parts = parts.len(),
        chapters = chapter_count,
        warnings = warnings.len(),
        total_read_time = report.total,
        "manifest built"
    );

    Ok(BookManifest {
        parts,
        chapter_count,
        total_read_time: report.total,
        warnings,
        fingerprint,
    })
}

fn check_document(
    doc: &ChapterDocument,
    options: &BuildOptions,
    errors: &mut Vec<ValidationError>,
    warnings: &mut Vec<ManifestWarning>,
) {
    if let Status::Unrecognized(value) = &doc.status {
        errors.push(ValidationError::InvalidStatus {
            path: doc.path.clone(),
            value: value.clone(),
        });
    }

    if let Some(ReadTime::Invalid(value)) = &doc.estimated_read_time {
        errors.push(ValidationError::InvalidReadTime {
            path: doc.path.clone(),
            value: value.clone(),
        });
    }

    for (field, value) in [("reviewer", &doc.reviewer), ("translator", &doc.translator)] {
        let Some(value) = value else {
            continue;
        };
        if !is_placeholder(value, &options.placeholders) {
            continue;
        }
        match options.placeholder_policy {
            PlaceholderPolicy::Ignore => {}
            PlaceholderPolicy::Warn => warnings.push(ManifestWarning::PlaceholderField {
                path: doc.path.clone(),
                field: field.to_string(),
                value: value.clone(),
            }),
            PlaceholderPolicy::Error => errors.push(ValidationError::Placeholder {
                path: doc.path.clone(),
                field,
                value: value.clone(),
            }),
        }
    }

    if let Some(part_number) = doc.part_number {
        if part_number != doc.part {
            warnings.push(ManifestWarning::PartNumberMismatch {
                path: doc.path.clone(),
                part: doc.part,
                part_number,
            });
        }
    }

    if let (Some(date), Some(last_updated)) = (doc.date, doc.last_updated) {
        if last_updated < date {
            warnings.push(ManifestWarning::LastUpdatedBeforeDate {
                path: doc.path.clone(),
                date,
                last_updated,
            });
        }
    }
}

fn is_placeholder(value: &str, placeholders: &[String]) -> bool {
    let value = value.trim();
    placeholders
        .iter()
        .any(|p| p.trim().eq_ignore_ascii_case(value))
}

/// `docs` must be sorted by path: the first path claiming a slot owns it and
/// every later claimant gets one error naming both files.
fn check_duplicates(docs: &[ChapterDocument], errors: &mut Vec<ValidationError>) {
    let mut owners: BTreeMap<(u32, u32), &Path> = BTreeMap::new();
    for doc in docs {
        match owners.get(&(doc.part, doc.chapter)) {
            Some(first) => errors.push(ValidationError::DuplicateChapter {
                part: doc.part,
                chapter: doc.chapter,
                first: first.to_path_buf(),
                duplicate: doc.path.clone(),
            }),
            None => {
                owners.insert((doc.part, doc.chapter), &doc.path);
            }
        }
    }
}

fn assemble_parts(
    docs: Vec<ChapterDocument>,
    warnings: &mut Vec<ManifestWarning>,
) -> Vec<PartEntry> {
    let mut by_part: BTreeMap<u32, Vec<ChapterDocument>> = BTreeMap::new();
    for doc in docs {
        by_part.entry(doc.part).or_default().push(doc);
    }

    let mut parts = Vec::with_capacity(by_part.len());
    for (number, mut chapters) in by_part {
        chapters.sort_by_key(|c| c.chapter);

        for pair in chapters.windows(2) {
            let (after, next) = (pair[0].chapter, pair[1].chapter);
            if next - after > 1 {
                warnings.push(ManifestWarning::ChapterGap {
                    part: number,
                    after,
                    next,
                });
            }
        }

        let names: BTreeSet<&str> = chapters
            .iter()
            .filter_map(|c| c.part_name.as_deref())
            .collect();
        if names.len() > 1 {
            warnings.push(ManifestWarning::PartNameConflict {
                part: number,
                names: names.iter().map(|n| n.to_string()).collect(),
            });
        }
        let name = chapters.iter().find_map(|c| c.part_name.clone());

        parts.push(PartEntry {
            number,
            name,
            chapters,
            read_time: 0,
        });
    }
    parts
}

fn fingerprint_parts(parts: &[PartEntry]) -> String {
    let chapters: Vec<serde_json::Value> = parts
        .iter()
        .flat_map(|part| part.chapters.iter())
        .map(|chapter| {
            let mut value = serde_json::to_value(chapter).unwrap_or(serde_json::Value::Null);
            if let Some(object) = value.as_object_mut() {
                object.remove("path");
            }
            value
        })
        .collect();
    canonical_fingerprint(&serde_json::Value::Array(chapters))
}
