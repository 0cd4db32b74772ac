use crate::model::{BookManifest, ChapterDocument};
use crate::read_time::format_minutes;

/// Render the manifest as a Markdown table of contents.
pub fn render_toc(manifest: &BookManifest) -> String {
    let mut out = String::new();
    out.push_str("# Contents\n\n");

    for part in &manifest.parts {
        match &part.name {
            Some(name) => out.push_str(&format!(
                "## Part {}: {} ({})\n\n",
                part.number,
                table_escape(name),
                format_minutes(part.read_time)
            )),
            None => out.push_str(&format!(
                "## Part {} ({})\n\n",
                part.number,
                format_minutes(part.read_time)
            )),
        }
        out.push_str("| Chapter | Title | Status | Read time |\n");
        out.push_str("| ---: | --- | --- | ---: |\n");
        for chapter in &part.chapters {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                chapter.chapter,
                table_escape(&chapter.title),
                chapter.status,
                chapter_read_time(chapter)
            ));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "Total estimated read time: {} across {} chapter(s).\n",
        format_minutes(manifest.total_read_time),
        manifest.chapter_count
    ));
    out
}

fn chapter_read_time(chapter: &ChapterDocument) -> String {
    chapter
        .estimated_read_time
        .as_ref()
        .and_then(|rt| rt.minutes())
        .map(format_minutes)
        .unwrap_or_else(|| "-".to_string())
}

fn table_escape(input: &str) -> String {
    input.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PartEntry, ReadTime, Status};
    use std::path::PathBuf;

    fn chapter(number: u32, title: &str, minutes: Option<u64>) -> ChapterDocument {
        ChapterDocument {
            path: PathBuf::from(format!("chapter-{number:02}.md")),
            title: title.to_string(),
            description: None,
            author: None,
            reviewer: None,
            translator: None,
            date: None,
            last_updated: None,
            part: 1,
            part_number: None,
            part_name: None,
            chapter: number,
            status: Status::Complete,
            estimated_read_time: minutes.map(ReadTime::Minutes),
        }
    }

    #[test]
    fn renders_parts_and_totals() {
        let manifest = BookManifest {
            parts: vec![PartEntry {
                number: 1,
                name: Some("Foundations".to_string()),
                chapters: vec![
                    chapter(3, "A First Look at C", Some(120)),
                    chapter(4, "Pointers | Memory", None),
                ],
                read_time: 120,
            }],
            chapter_count: 2,
            total_read_time: 120,
            warnings: Vec::new(),
            fingerprint: String::new(),
        };
        let out = render_toc(&manifest);
        assert!(out.starts_with("# Contents\n\n## Part 1: Foundations (2h 00m)\n"));
        assert!(out.contains("| 3 | A First Look at C | complete | 2h 00m |\n"));
        assert!(out.contains("| 4 | Pointers \\| Memory | complete | - |\n"));
        assert!(out.ends_with("Total estimated read time: 2h 00m across 2 chapter(s).\n"));
    }

    #[test]
    fn unnamed_part_heading() {
        let manifest = BookManifest {
            parts: vec![PartEntry {
                number: 2,
                name: None,
                chapters: vec![chapter(5, "Five", Some(45))],
                read_time: 45,
            }],
            chapter_count: 1,
            total_read_time: 45,
            warnings: Vec::new(),
            fingerprint: String::new(),
        };
        assert!(render_toc(&manifest).contains("## Part 2 (45m)\n"));
    }
}
