//! # BPE Vocabulary Trainer
//!
//! Incremental merge loop over an inverted index: each merge touches only
//! the words whose split contains the selected pair, so per-merge cost is
//! proportional to those words' spans rather than the whole corpus.

use crate::training::pair_index::PairIndex;
use crate::training::symbol_span::SymbolSpan;
use crate::training::symbol_table::{EOW, SymbolTable};
use crate::types::{CountType, Pair, StringChunkType, SymbolId, WMHashMap, WMHashSet};

/// Options for [`BpeTrainer`].
#[derive(Debug, Clone)]
pub struct BpeTrainerOptions {
    /// The number of merges to perform.
    pub num_merges: usize,
}

impl BpeTrainerOptions {
    /// Create new options.
    pub fn new(num_merges: usize) -> Self {
        Self { num_merges }
    }

    /// Set the number of merges.
    pub fn with_num_merges(
        self,
        num_merges: usize,
    ) -> Self {
        Self { num_merges }
    }

    /// Initialize a [`BpeTrainer`] from these options.
    pub fn init(self) -> BpeTrainer {
        BpeTrainer::new(self)
    }
}

/// One recorded merge: `left + right -> token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRecord {
    /// The left side of the merged pair.
    pub left: String,

    /// The right side of the merged pair.
    pub right: String,

    /// The new token, `left + right`.
    pub token: String,
}

/// A trained vocabulary with its merge history.
///
/// Tokens are kept sorted by descending length (ties lexicographic) so the
/// segmenter's first prefix hit is the longest one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainedVocab {
    tokens: Vec<String>,
    merges: Vec<MergeRecord>,
    merges_performed: usize,
}

impl TrainedVocab {
    /// Build a vocabulary from a bare token list, re-sorting it for greedy
    /// matching. Used when reloading persisted artifacts, where the merge
    /// history is not required.
    pub fn from_tokens(mut tokens: Vec<String>) -> Self {
        sort_for_matching(&mut tokens);
        Self {
            tokens,
            merges: Vec::new(),
            merges_performed: 0,
        }
    }

    /// The tokens, sorted by descending length.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The ordered merge history.
    pub fn merges(&self) -> &[MergeRecord] {
        &self.merges
    }

    /// The number of merges actually performed; smaller than the requested
    /// count when the pair statistics ran dry.
    pub fn merges_performed(&self) -> usize {
        self.merges_performed
    }

    /// The vocabulary size.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Sort tokens for greedy longest-prefix matching: length descending,
/// ties lexicographic.
pub(crate) fn sort_for_matching(tokens: &mut [String]) {
    tokens.sort_unstable_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
}

/// Whether `word` participates in BPE.
///
/// Empty keys, keys starting with a non-letter, and single-character keys
/// are atomic; single-letter words never enter the split table.
pub fn is_bpe_word(word: &str) -> bool {
    let mut chars = word.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_alphabetic()) && chars.next().is_some()
}

/// Trainer for learning a subword vocabulary by byte-pair encoding.
pub struct BpeTrainer {
    /// Trainer options.
    pub options: BpeTrainerOptions,
}

impl BpeTrainer {
    /// Create a trainer from options.
    pub fn new(options: BpeTrainerOptions) -> Self {
        Self { options }
    }

    /// Learn a vocabulary from a word-frequency map.
    ///
    /// Atomic keys go straight into the vocabulary; the rest are split into
    /// characters plus the end-of-word marker, and the most frequent
    /// adjacent pair is merged until `num_merges` is exhausted or no pair
    /// remains. Both terminations are normal.
    pub fn train<K, C>(
        &self,
        word_counts: &WMHashMap<K, C>,
    ) -> TrainedVocab
    where
        K: StringChunkType,
        C: CountType,
    {
        let mut table = SymbolTable::new();
        let mut vocab: WMHashSet<SymbolId> = WMHashSet::new();

        let mut spans: Vec<SymbolSpan> = Vec::new();
        let mut freqs: Vec<C> = Vec::new();

        let eow = table.intern(EOW);

        for (word, &count) in word_counts {
            let word = word.as_ref();
            if word.is_empty() {
                log::debug!("ignoring empty word key");
                continue;
            }
            if is_bpe_word(word) {
                let mut symbols: Vec<SymbolId> = Vec::with_capacity(word.len() + 1);
                let mut buf = [0u8; 4];
                for ch in word.chars() {
                    let id = table.intern(ch.encode_utf8(&mut buf));
                    vocab.insert(id);
                    symbols.push(id);
                }
                symbols.push(eow);
                spans.push(SymbolSpan::from_symbols(symbols));
                freqs.push(count);
            } else {
                vocab.insert(table.intern(word));
            }
        }

        if spans.is_empty() {
            log::warn!("no words eligible for BPE; vocabulary holds atomic tokens only");
            return finalize(&table, vocab, Vec::new(), 0);
        }
        vocab.insert(eow);

        log::info!(
            "BPE setup: {} words for merging, {} seed symbols, {} merges requested",
            spans.len(),
            vocab.len(),
            self.options.num_merges,
        );

        let mut index = PairIndex::from_split_table(&spans, &freqs);
        log::info!("initial pair statistics: {} distinct pairs", index.len());

        let mut merges: Vec<MergeRecord> = Vec::new();
        let mut merges_done = 0;

        for step in 0..self.options.num_merges {
            let Some((pair, pair_freq)) = select_best_pair(&index, &table) else {
                log::info!("no pairs left to merge; stopping after {merges_done} merges");
                break;
            };

            let token = table.intern_concat(pair.0, pair.1);
            vocab.insert(token);
            merges.push(MergeRecord {
                left: table.resolve(pair.0).to_owned(),
                right: table.resolve(pair.1).to_owned(),
                token: table.resolve(token).to_owned(),
            });

            apply_merge(&mut spans, &freqs, &mut index, pair, token);
            merges_done += 1;

            if (step + 1) % 1000 == 0 || step + 1 == self.options.num_merges {
                log::info!(
                    "merge {}/{}: {:?} + {:?} -> {:?} (frequency {pair_freq})",
                    step + 1,
                    self.options.num_merges,
                    table.resolve(pair.0),
                    table.resolve(pair.1),
                    table.resolve(token),
                );
            }
        }

        finalize(&table, vocab, merges, merges_done)
    }
}

/// Select the pair with the highest weighted count.
///
/// Selection is a linear scan over the pair table, O(|P|) per merge; ties
/// break to the lexicographically smallest resolved pair, which makes the
/// choice reproducible across runs.
fn select_best_pair<C: CountType>(
    index: &PairIndex<C>,
    table: &SymbolTable,
) -> Option<(Pair, C)> {
    let mut best: Option<(Pair, C)> = None;
    for (&pair, &count) in &index.counts {
        let better = match best {
            None => true,
            Some((best_pair, best_count)) => {
                if count != best_count {
                    count > best_count
                } else {
                    (table.resolve(pair.0), table.resolve(pair.1))
                        < (table.resolve(best_pair.0), table.resolve(best_pair.1))
                }
            }
        };
        if better {
            best = Some((pair, count));
        }
    }
    best
}

/// Apply one merge across every word listed for `pair`, updating the pair
/// statistics and the inverted index incrementally.
///
/// The listed word set may be stale (over-inclusive); words without a live
/// occurrence are no-ops. Consecutive occurrences within one word merge
/// non-overlappingly left to right in the same pass.
fn apply_merge<C: CountType>(
    spans: &mut [SymbolSpan],
    freqs: &[C],
    index: &mut PairIndex<C>,
    pair: Pair,
    token: SymbolId,
) {
    let affected = index.take_words(pair);

    for word_idx in affected {
        let freq = freqs[word_idx];
        spans[word_idx].merge_pair_cb(pair, token, &mut |delta_pair, delta| {
            if delta < 0 {
                index.subtract(delta_pair, freq);
            } else {
                index.add(delta_pair, freq, word_idx);
            }
        });
    }

    index.drop_count(pair);
}

/// Resolve the vocabulary ids and sort for greedy matching.
fn finalize(
    table: &SymbolTable,
    vocab: WMHashSet<SymbolId>,
    merges: Vec<MergeRecord>,
    merges_performed: usize,
) -> TrainedVocab {
    let mut tokens: Vec<String> = vocab
        .into_iter()
        .map(|id| table.resolve(id).to_owned())
        .collect();
    sort_for_matching(&mut tokens);

    log::info!("BPE training complete: final vocabulary size {}", tokens.len());

    TrainedVocab {
        tokens,
        merges,
        merges_performed,
    }
}

#[cfg(test)]
mod tests {
    use compact_str::CompactString;

    use super::*;

    /// The corpus of the classic BPE walkthrough:
    /// `low x5, lower x2, newest x6, widest x3`.
    fn walkthrough_counts() -> WMHashMap<CompactString, u64> {
        [("low", 5), ("lower", 2), ("newest", 6), ("widest", 3)]
            .into_iter()
            .map(|(w, c)| (CompactString::from(w), c))
            .collect()
    }

    fn base_characters() -> Vec<&'static str> {
        vec!["l", "o", "w", "e", "r", "n", "s", "t", "i", "d"]
    }

    fn train(
        counts: &WMHashMap<CompactString, u64>,
        num_merges: usize,
    ) -> TrainedVocab {
        BpeTrainerOptions::new(num_merges).init().train(counts)
    }

    #[test]
    fn test_is_bpe_word() {
        assert!(is_bpe_word("low"));
        assert!(is_bpe_word("ab"));

        assert!(!is_bpe_word(""));
        assert!(!is_bpe_word("a"));
        assert!(!is_bpe_word("!"));
        assert!(!is_bpe_word("7seven"));
    }

    #[test]
    fn test_zero_merges_yields_base_vocab() {
        let vocab = train(&walkthrough_counts(), 0);

        let mut expected: Vec<String> = base_characters()
            .into_iter()
            .map(str::to_owned)
            .collect();
        expected.push(EOW.to_owned());
        sort_for_matching(&mut expected);

        assert_eq!(vocab.tokens(), expected.as_slice());
        assert_eq!(vocab.merges_performed(), 0);
    }

    #[test]
    fn test_first_merges_follow_pair_frequencies() {
        let vocab = train(&walkthrough_counts(), 1);
        assert!(vocab.tokens().iter().any(|t| t == "es"));
        assert_eq!(vocab.merges()[0].token, "es");

        let vocab = train(&walkthrough_counts(), 2);
        assert_eq!(vocab.merges()[1].left, "es");
        assert_eq!(vocab.merges()[1].right, "t");
        assert!(vocab.tokens().iter().any(|t| t == "est"));
    }

    #[test]
    fn test_ten_merges_reconstruct_frequent_words() {
        let vocab = train(&walkthrough_counts(), 10);
        let tokens = vocab.tokens();

        for ch in base_characters() {
            assert!(tokens.iter().any(|t| t == ch), "missing base char {ch:?}");
        }
        assert!(tokens.iter().any(|t| t == "low</w>"));
        assert!(tokens.iter().any(|t| t == "newest</w>"));

        // `lower` and `widest` stay reconstructable from learned pieces.
        for needed in ["low", "e", "r", "est</w>", "w", "i", "d"] {
            assert!(tokens.iter().any(|t| t == needed), "missing {needed:?}");
        }
    }

    #[test]
    fn test_merge_budget_beyond_pairs_terminates_early() {
        let vocab = train(&walkthrough_counts(), 100_000);
        assert!(vocab.merges_performed() < 100_000);
        assert_eq!(vocab.merges().len(), vocab.merges_performed());

        // Every word collapsed into a single token.
        for word in ["low</w>", "lower</w>", "newest</w>", "widest</w>"] {
            assert!(vocab.tokens().iter().any(|t| t == word));
        }
    }

    #[test]
    fn test_atomic_only_corpus_performs_no_merges() {
        let counts: WMHashMap<CompactString, u64> = [("!", 3), ("7", 2), ("a", 5)]
            .into_iter()
            .map(|(w, c)| (CompactString::from(w), c))
            .collect();

        let vocab = train(&counts, 64);

        let mut expected = vec!["!".to_owned(), "7".to_owned(), "a".to_owned()];
        sort_for_matching(&mut expected);
        assert_eq!(vocab.tokens(), expected.as_slice());
        assert_eq!(vocab.merges_performed(), 0);
    }

    #[test]
    fn test_empty_corpus_yields_empty_vocab() {
        let counts: WMHashMap<CompactString, u64> = WMHashMap::new();
        let vocab = train(&counts, 16);
        assert!(vocab.is_empty());
    }

    #[test]
    fn test_tokens_sorted_by_descending_length() {
        let vocab = train(&walkthrough_counts(), 8);
        let tokens = vocab.tokens();
        for window in tokens.windows(2) {
            assert!(window[0].len() >= window[1].len());
        }
        assert!(tokens.iter().all(|t| !t.is_empty()));
    }

    /// After every merge step the incremental statistics must equal a fresh
    /// recompute over the split table.
    #[test]
    fn test_incremental_stats_match_recompute() {
        let mut table = SymbolTable::new();
        let eow = table.intern(EOW);

        let words = [("low", 5u64), ("lower", 2), ("newest", 6), ("widest", 3)];
        let mut spans = Vec::new();
        let mut freqs = Vec::new();
        for (word, freq) in words {
            let mut symbols: Vec<SymbolId> = Vec::new();
            let mut buf = [0u8; 4];
            for ch in word.chars() {
                symbols.push(table.intern(ch.encode_utf8(&mut buf)));
            }
            symbols.push(eow);
            spans.push(SymbolSpan::from_symbols(symbols));
            freqs.push(freq);
        }

        let mut index = PairIndex::from_split_table(&spans, &freqs);

        for _ in 0..12 {
            let Some((pair, _)) = select_best_pair(&index, &table) else {
                break;
            };
            let token = table.intern_concat(pair.0, pair.1);
            apply_merge(&mut spans, &freqs, &mut index, pair, token);

            let recomputed = PairIndex::from_split_table(&spans, &freqs);
            assert_eq!(index.counts, recomputed.counts);

            // Over-inclusion only: every live pair's words are indexed.
            for (word_idx, span) in spans.iter().enumerate() {
                for live_pair in span.pairs() {
                    assert!(
                        index
                            .words
                            .get(&live_pair)
                            .is_some_and(|set| set.contains(&word_idx)),
                        "index lost {live_pair:?} in word {word_idx}",
                    );
                }
            }
        }
    }

    /// Splits always concatenate back to the word plus the marker.
    #[test]
    fn test_split_concatenation_invariant() {
        let mut table = SymbolTable::new();
        let eow = table.intern(EOW);

        let word = "seesaw";
        let mut symbols: Vec<SymbolId> = Vec::new();
        let mut buf = [0u8; 4];
        for ch in word.chars() {
            symbols.push(table.intern(ch.encode_utf8(&mut buf)));
        }
        symbols.push(eow);

        let mut spans = vec![SymbolSpan::from_symbols(symbols)];
        let freqs = vec![4u64];
        let mut index = PairIndex::from_split_table(&spans, &freqs);

        for _ in 0..6 {
            let Some((pair, _)) = select_best_pair(&index, &table) else {
                break;
            };
            let token = table.intern_concat(pair.0, pair.1);
            apply_merge(&mut spans, &freqs, &mut index, pair, token);

            let joined: String = spans[0]
                .symbols()
                .iter()
                .map(|&id| table.resolve(id))
                .collect();
            assert_eq!(joined, format!("{word}{EOW}"));
        }
    }
}
