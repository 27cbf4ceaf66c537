//! # `wordmill` Subword Vocabulary Trainer
//!
//! `wordmill` learns a byte-pair-encoded subword vocabulary from a text
//! corpus, assigns per-token embeddings, persists everything as flat CSV
//! artifacts, and reloads them to tokenize new text.
//!
//! See:
//! * [`corpus`] to stream a directory of text files into a word-frequency
//!   map (bounded producer/consumer pipeline with progress signalling).
//! * [`training`] to learn the vocabulary with the incremental pair-stats
//!   merge loop.
//! * [`segment`] to tokenize new text by greedy longest-prefix matching.
//! * [`stats`] to compute per-token usage counts for reporting.
//! * [`embedding`] to generate the token embedding matrix.
//! * [`artifacts`] to persist and reload everything.
//!
//! ## Training Example
//!
//! ```rust,no_run
//! use compact_str::CompactString;
//! use wordmill::Segmenter;
//! use wordmill::corpus::{CorpusReader, collect_corpus_files};
//! use wordmill::training::BpeTrainerOptions;
//! use wordmill::types::WMHashMap;
//!
//! fn example(dir: &std::path::Path) -> anyhow::Result<()> {
//!     let files = collect_corpus_files(dir)?;
//!
//!     let reader = CorpusReader::default();
//!     let counts: WMHashMap<CompactString, u64> = reader.read_files(&files);
//!
//!     let vocab = BpeTrainerOptions::new(32_768).init().train(&counts);
//!     let segmenter = Segmenter::from_vocab(&vocab);
//!
//!     for token in segmenter.split_sentence("Low, lower!") {
//!         println!("{token}");
//!     }
//!     Ok(())
//! }
//! ```
#![warn(missing_docs, unused)]

pub mod artifacts;
pub mod corpus;
pub mod embedding;
pub mod errors;
pub mod presplit;
pub mod segment;
pub mod stats;
pub mod training;
pub mod types;

#[doc(inline)]
pub use errors::{WMResult, WordmillError};
#[doc(inline)]
pub use segment::Segmenter;
#[doc(inline)]
pub use training::{BpeTrainer, BpeTrainerOptions, TrainedVocab};
