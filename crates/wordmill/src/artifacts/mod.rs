//! # Artifact I/O
//!
//! Stable CSV persistence of the training outputs. All artifacts live flat
//! in one output directory and are self-contained: inference needs only
//! the token statistics (for the symbol list) and an embeddings file.

pub mod dialect;
mod load;
mod save;

#[doc(inline)]
pub use dialect::HeaderMode;
#[doc(inline)]
pub use load::{
    find_embeddings_file, load_embeddings, load_segmenter, load_token_stats, load_unique_tokens,
};
#[doc(inline)]
pub use save::{
    save_embeddings, save_merge_history, save_seeds, save_token_stats, save_unique_tokens,
};

/// Pre-BPE unique tokens, one column.
pub const UNIQUE_TOKENS_FILE: &str = "_unique_initial_tokens.csv";

/// Final token statistics, `token,repetitions`.
pub const TOKEN_STATS_FILE: &str = "_final_token_stats.csv";

/// Token embeddings, token plus `d` values per row.
pub const EMBEDDINGS_FILE: &str = "_final_embeddings.csv";

/// Alternate embeddings file name accepted on load.
pub const EMBEDDINGS_ONLY_FILE: &str = "_embeddings_only.csv";

/// Per-token embedding seeds, `token,seed`.
pub const SEEDS_FILE: &str = "_seedsForEmbeddings.csv";

/// Ordered merge history, `left,right,token`.
pub const MERGE_HISTORY_FILE: &str = "_merge_history.csv";
