//! # Vocabulary Training
//!
//! Support for learning a subword vocabulary from a word-frequency map.
//!
//! Training keeps four structures alive: the word splits (`S`), the pair
//! statistics (`P`), the pair-to-words inverted index (`I`), and the
//! symbol interner. All of them speak interned ids and all of them die
//! with the merge loop; the [`TrainedVocab`] is the persistent output.
//!
//! ```rust,no_run
//! use compact_str::CompactString;
//! use wordmill::training::{BpeTrainer, BpeTrainerOptions};
//! use wordmill::types::WMHashMap;
//!
//! let mut counts: WMHashMap<CompactString, u64> = WMHashMap::new();
//! for word in ["low", "low", "lower", "newest", "widest"] {
//!     *counts.entry(CompactString::from(word)).or_default() += 1;
//! }
//!
//! let vocab = BpeTrainerOptions::new(1024).init().train(&counts);
//! assert!(vocab.merges_performed() <= 1024);
//! ```

mod bpe_trainer;
mod pair_index;
mod symbol_span;
mod symbol_table;

#[doc(inline)]
pub use bpe_trainer::{
    BpeTrainer, BpeTrainerOptions, MergeRecord, TrainedVocab, is_bpe_word,
};
pub(crate) use bpe_trainer::sort_for_matching;
#[doc(inline)]
pub use pair_index::PairIndex;
#[doc(inline)]
pub use symbol_span::SymbolSpan;
#[doc(inline)]
pub use symbol_table::{EOW, SymbolTable};
