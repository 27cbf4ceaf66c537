//! # Streaming Corpus Reader
//!
//! Producer/consumer pipeline from file paths to a word-frequency map.
//! Producers read files sequentially and push line chunks onto the bounded
//! work queue; consumers tally words and atomic tokens into thread-local
//! maps, merged once at the end.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::thread;

use crate::corpus::chunk_queue::ChunkQueue;
use crate::corpus::map_merge;
use crate::corpus::progress::{ProgressSnapshot, ProgressTracker};
use crate::presplit::pre_split;
use crate::types::{CountType, StringChunkType, WMHashMap};

/// One unit of queued work: a batch of input lines.
pub type LineChunk = Vec<String>;

/// Options for [`CorpusReader`].
#[derive(Debug, Clone)]
pub struct CorpusReaderOptions {
    /// Lines per queued chunk.
    pub chunk_size: usize,

    /// Maximum chunks buffered in the work queue.
    pub queue_capacity: usize,

    /// Worker budget; `None` uses the hardware parallelism.
    pub threads: Option<usize>,
}

impl Default for CorpusReaderOptions {
    fn default() -> Self {
        Self {
            chunk_size: 10_000,
            queue_capacity: 16,
            threads: None,
        }
    }
}

impl CorpusReaderOptions {
    /// Set the lines-per-chunk batch size.
    pub fn with_chunk_size(
        self,
        chunk_size: usize,
    ) -> Self {
        Self { chunk_size, ..self }
    }

    /// Set the work queue capacity, in chunks.
    pub fn with_queue_capacity(
        self,
        queue_capacity: usize,
    ) -> Self {
        Self {
            queue_capacity,
            ..self
        }
    }

    /// Set the worker budget.
    pub fn with_threads(
        self,
        threads: usize,
    ) -> Self {
        Self {
            threads: Some(threads),
            ..self
        }
    }
}

/// Producer/consumer corpus reader.
pub struct CorpusReader {
    /// Reader options.
    pub options: CorpusReaderOptions,
}

impl Default for CorpusReader {
    fn default() -> Self {
        Self::new(CorpusReaderOptions::default())
    }
}

impl CorpusReader {
    /// Create a reader from options.
    pub fn new(options: CorpusReaderOptions) -> Self {
        assert!(options.chunk_size > 0, "chunk size must be positive");
        Self { options }
    }

    /// Build the word-frequency map of `paths`, logging one progress line
    /// per completed file.
    pub fn read_files<K, C, P>(
        &self,
        paths: &[P],
    ) -> WMHashMap<K, C>
    where
        K: StringChunkType,
        C: CountType,
        P: AsRef<Path>,
    {
        let total_files = paths.len();
        self.read_files_with_observer(paths, &mut |snap: &ProgressSnapshot| {
            log::info!(
                "progress [{:.2}%] completed {}/{} files (finished {:?})",
                snap.percent(),
                snap.files_completed,
                total_files,
                snap.last_file_completed.as_deref().unwrap_or("?"),
            );
        })
    }

    /// Build the word-frequency map of `paths`.
    ///
    /// The observer is invoked on the driver thread exactly once per
    /// completed file, in completion order; it receives a snapshot taken
    /// at or after that completion.
    pub fn read_files_with_observer<K, C, P>(
        &self,
        paths: &[P],
        observer: &mut dyn FnMut(&ProgressSnapshot),
    ) -> WMHashMap<K, C>
    where
        K: StringChunkType,
        C: CountType,
        P: AsRef<Path>,
    {
        let paths: Vec<PathBuf> = paths.iter().map(|p| p.as_ref().to_path_buf()).collect();
        if paths.is_empty() {
            return WMHashMap::new();
        }

        let threads = self.options.threads.unwrap_or_else(|| {
            thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        });
        let (producer_count, consumer_count) = split_workers(threads);

        let total_bytes: u64 = paths
            .iter()
            .filter_map(|path| std::fs::metadata(path).ok())
            .map(|meta| meta.len())
            .sum();

        let progress = ProgressTracker::new(total_bytes);
        let queue: ChunkQueue<LineChunk> = ChunkQueue::with_capacity(self.options.queue_capacity);

        let total_files = paths.len();
        let partitions = partition_paths(paths, producer_count);
        let chunk_size = self.options.chunk_size;

        log::debug!(
            "corpus read: {} producers, {} consumers, {} files, {} bytes",
            partitions.len(),
            consumer_count,
            total_files,
            total_bytes,
        );

        thread::scope(|scope| {
            let producers: Vec<_> = partitions
                .into_iter()
                .map(|part| {
                    let queue = &queue;
                    let progress = &progress;
                    scope.spawn(move || produce_files(part, chunk_size, queue, progress))
                })
                .collect();

            let consumers: Vec<_> = (0..consumer_count)
                .map(|_| {
                    let queue = &queue;
                    scope.spawn(move || consume_chunks::<K, C>(queue))
                })
                .collect();

            // One observer call per completed file, never coalesced.
            for seen in 0..total_files {
                let snap = progress.wait_newer(seen);
                observer(&snap);
            }

            for producer in producers {
                producer.join().expect("corpus producer panicked");
            }
            queue.close();

            let locals: Vec<WMHashMap<K, C>> = consumers
                .into_iter()
                .map(|consumer| consumer.join().expect("corpus consumer panicked"))
                .collect();

            map_merge::merge_counts(locals)
        })
    }
}

/// Worker split for a thread budget: one producer on small machines, two
/// past four cores; consumers take the rest.
fn split_workers(threads: usize) -> (usize, usize) {
    let producers = if threads <= 4 { 1 } else { 2 };
    let consumers = threads.saturating_sub(producers).max(1);
    (producers, consumers)
}

/// Partition paths across producers by count; the remainder goes to the
/// earlier producers. Empty partitions are dropped.
fn partition_paths(
    paths: Vec<PathBuf>,
    producers: usize,
) -> Vec<Vec<PathBuf>> {
    let producers = producers.max(1);
    let base = paths.len() / producers;
    let remainder = paths.len() % producers;

    let mut partitions = Vec::with_capacity(producers);
    let mut rest = paths;
    for index in 0..producers {
        let take = base + usize::from(index < remainder);
        if take == 0 {
            break;
        }
        let tail = rest.split_off(take);
        partitions.push(core::mem::replace(&mut rest, tail));
    }
    partitions
}

/// Producer body: stream the partition's files into the queue.
///
/// An unopenable file is skipped with a warning but still counted as
/// completed, so the driver's file count converges. A mid-file read error
/// drops the remainder of that file only.
fn produce_files(
    paths: Vec<PathBuf>,
    chunk_size: usize,
    queue: &ChunkQueue<LineChunk>,
    progress: &ProgressTracker,
) {
    for path in paths {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) => {
                log::warn!("skipping {}: {err}", path.display());
                progress.file_completed(&name);
                continue;
            }
        };

        let mut chunk: LineChunk = Vec::with_capacity(chunk_size);
        let mut pending_bytes: u64 = 0;

        for line in BufReader::new(file).lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    log::warn!(
                        "read error in {}: {err}; dropping the remainder of the file",
                        path.display(),
                    );
                    break;
                }
            };

            pending_bytes += line.len() as u64 + 1;
            chunk.push(line);

            if chunk.len() >= chunk_size {
                progress.add_bytes(pending_bytes);
                pending_bytes = 0;
                queue.push(core::mem::replace(&mut chunk, Vec::with_capacity(chunk_size)));
            }
        }

        if !chunk.is_empty() {
            queue.push(chunk);
        }
        if pending_bytes > 0 {
            progress.add_bytes(pending_bytes);
        }
        progress.file_completed(&name);
    }
}

/// Consumer body: drain the queue into a thread-local count map.
fn consume_chunks<K, C>(queue: &ChunkQueue<LineChunk>) -> WMHashMap<K, C>
where
    K: StringChunkType,
    C: CountType,
{
    let mut counts = WMHashMap::new();
    while let Some(chunk) = queue.wait_and_pop() {
        for line in &chunk {
            count_line(line, &mut counts);
        }
    }
    counts
}

/// Tally one line: maximal ASCII-letter runs become pre-split, lowercased
/// words; whitespace is skipped; every other character is one atomic token.
///
/// Classification inspects the ASCII subset only. Non-ASCII characters are
/// kept whole as atomic tokens so every key stays valid UTF-8.
fn count_line<K, C>(
    line: &str,
    counts: &mut WMHashMap<K, C>,
) where
    K: StringChunkType,
    C: CountType,
{
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let byte = bytes[i];
        if byte.is_ascii_alphabetic() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                i += 1;
            }
            for sub in pre_split(&line[start..i]) {
                let lowered = sub.to_ascii_lowercase();
                *counts.entry(K::from(lowered.as_str())).or_default() += C::one();
            }
        } else if byte.is_ascii_whitespace() {
            i += 1;
        } else {
            let Some(ch) = line[i..].chars().next() else {
                break;
            };
            let end = i + ch.len_utf8();
            *counts.entry(K::from(&line[i..end])).or_default() += C::one();
            i = end;
        }
    }
}
