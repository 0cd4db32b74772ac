use std::path::PathBuf;

use crate::chapter::load_chapter;
use crate::error::ParseError;
use crate::model::ChapterDocument;

/// Worker count used when none is configured.
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Load every path, fanning out over up to `jobs` scoped threads.
///
/// Each worker owns a contiguous chunk and its own result vector; the chunks
/// are joined back in order, so `result[i]` always belongs to `paths[i]`.
pub fn load_chapters(
    paths: &[PathBuf],
    jobs: usize,
) -> Vec<Result<ChapterDocument, ParseError>> {
    if paths.is_empty() {
        return Vec::new();
    }
    let workers = jobs.clamp(1, paths.len());
    if workers == 1 {
        return paths.iter().map(|path| load_chapter(path)).collect();
    }

    let chunk_size = paths.len().div_ceil(workers);
    tracing::debug!(files = paths.len(), workers, chunk_size, "loading chapters");
    std::thread::scope(|scope| {
        let handles: Vec<_> = paths
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|path| load_chapter(path))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;

    fn write_chapter(dir: &std::path::Path, chapter: u32) -> PathBuf {
        let path = dir.join(format!("chapter-{chapter:02}.md"));
        std::fs::write(
            &path,
            format!("---\ntitle: Chapter {chapter}\npart: 1\nchapter: {chapter}\nstatus: draft\n---\n"),
        )
        .expect("write chapter");
        path
    }

    #[test]
    fn results_follow_input_order_for_any_worker_count() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut paths: Vec<PathBuf> = (1..=9).map(|n| write_chapter(temp.path(), n)).collect();
        paths.insert(4, temp.path().join("missing.md"));

        let sequential = load_chapters(&paths, 1);
        for jobs in [2, 3, 4, 16] {
            assert_eq!(load_chapters(&paths, jobs), sequential, "jobs={jobs}");
        }

        assert_eq!(sequential.len(), 10);
        let err = sequential[4].as_ref().unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::Io(_)));
        assert_eq!(sequential[5].as_ref().expect("chapter 5").chapter, 5);
    }

    #[test]
    fn zero_jobs_still_loads() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = vec![write_chapter(temp.path(), 1)];
        let loaded = load_chapters(&paths, 0);
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].is_ok());
    }

    #[test]
    fn empty_input() {
        assert!(load_chapters(&[], 4).is_empty());
        assert!(default_jobs() >= 1);
    }
}
