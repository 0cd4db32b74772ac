use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::{BookManifest, ChapterDocument, ManifestWarning, PartEntry, ReadTime};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadTimeReport {
    /// Minutes per part number. Every part in the manifest has an entry.
    pub per_part: BTreeMap<u32, u64>,
    pub total: u64,
    /// One `MissingReadTime` per chapter that declares no read time.
    pub warnings: Vec<ManifestWarning>,
}

/// Sum `estimatedReadTime` per part. Chapters without one count as zero
/// and are flagged, never failed.
pub fn compute_read_time(manifest: &BookManifest) -> ReadTimeReport {
    sum_parts(&manifest.parts)
}

pub(crate) fn sum_parts(parts: &[PartEntry]) -> ReadTimeReport {
    let mut report = ReadTimeReport::default();
    for part in parts {
        let minutes = part
            .chapters
            .iter()
            .map(|chapter| chapter_minutes(chapter, &mut report.warnings))
            .fold(0u64, u64::saturating_add);
        let entry = report.per_part.entry(part.number).or_default();
        *entry = entry.saturating_add(minutes);
        report.total = report.total.saturating_add(minutes);
    }
    report
}

fn chapter_minutes(chapter: &ChapterDocument, warnings: &mut Vec<ManifestWarning>) -> u64 {
    match &chapter.estimated_read_time {
        Some(ReadTime::Minutes(m)) => *m,
        // Rejected by the manifest builder; never present in a built manifest.
        Some(ReadTime::Invalid(_)) => 0,
        None => {
            warnings.push(ManifestWarning::MissingReadTime {
                path: chapter.path.clone(),
            });
            0
        }
    }
}

/// `600` -> `10h 00m`, `45` -> `45m`.
pub fn format_minutes(minutes: u64) -> String {
    let (hours, rest) = (minutes / 60, minutes % 60);
    if hours == 0 {
        format!("{rest}m")
    } else {
        format!("{hours}h {rest:02}m")
    }
}
