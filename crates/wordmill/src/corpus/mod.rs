//! # Corpus Ingestion
//!
//! Streaming corpus reading: a bounded work queue fed by file producers,
//! consumers tallying thread-local word counts, a tree-reduce merger, and
//! an event-driven progress record.
//!
//! The word-frequency map is never mutated by more than one thread:
//! consumers build local maps, and merging into a single owner happens only
//! after every consumer has finished.

mod chunk_queue;
pub mod map_merge;
mod progress;
mod reader;

use std::path::{Path, PathBuf};

use crate::errors::{WMResult, WordmillError};

#[doc(inline)]
pub use chunk_queue::ChunkQueue;
#[doc(inline)]
pub use progress::{ProgressSnapshot, ProgressTracker};
#[doc(inline)]
pub use reader::{CorpusReader, CorpusReaderOptions, LineChunk};

/// Collect the regular files of `dir`, sorted for a deterministic order.
///
/// ## Errors
/// A missing or non-directory path is a configuration error.
pub fn collect_corpus_files(dir: &Path) -> WMResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(WordmillError::Config(format!(
            "input directory {} does not exist",
            dir.display(),
        )));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use super::*;

    #[test]
    fn test_collect_corpus_files_sorted() {
        let dir = tempdir::TempDir::new("corpus_files").unwrap();
        File::create(dir.path().join("b.txt")).unwrap();
        File::create(dir.path().join("a.txt")).unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let files = collect_corpus_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_collect_corpus_files_missing_dir() {
        let err = collect_corpus_files(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, WordmillError::Config(_)));
    }
}
