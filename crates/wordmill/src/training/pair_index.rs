//! # Pair Statistics and Inverted Index

use crate::training::symbol_span::SymbolSpan;
use crate::types::{CountType, Pair, WMHashMap, WMHashSet};

/// Running pair frequencies (`P`) with the pair-to-words inverted index
/// (`I`) over a split table.
///
/// The inverted index is over-inclusive: a pair's word set may list words
/// whose split no longer contains the pair (stale after earlier merges),
/// but it always lists every word that currently does. The merge walk
/// tolerates stale entries; a word without a live occurrence is a no-op.
#[derive(Debug, Clone, Default)]
pub struct PairIndex<C: CountType> {
    /// Weighted occurrence count of every adjacent pair.
    pub counts: WMHashMap<Pair, C>,

    /// Indices of the words whose current split contains the pair.
    pub words: WMHashMap<Pair, WMHashSet<usize>>,
}

impl<C: CountType> PairIndex<C> {
    /// Build the index from a split table and per-word counts.
    ///
    /// ## Arguments
    /// * `spans` - the current splits; assumed to belong to distinct words.
    /// * `freqs` - `freqs[i]` is the corpus frequency of `spans[i]`.
    pub fn from_split_table(
        spans: &[SymbolSpan],
        freqs: &[C],
    ) -> Self {
        let size_hint = spans.len() / 100;
        let mut index = Self {
            counts: WMHashMap::with_capacity(size_hint),
            words: WMHashMap::with_capacity(size_hint),
        };

        let zero = C::zero();
        for (word_idx, span) in spans.iter().enumerate() {
            let freq = freqs[word_idx];
            if freq != zero && span.len() >= 2 {
                for pair in span.pairs() {
                    index.add(pair, freq, word_idx);
                }
            }
        }
        index
    }

    /// The weighted count of `pair`; zero when absent.
    pub fn count(
        &self,
        pair: Pair,
    ) -> C {
        self.counts.get(&pair).copied().unwrap_or_else(C::zero)
    }

    /// Add `freq` occurrences of `pair` in word `word_idx`.
    pub fn add(
        &mut self,
        pair: Pair,
        freq: C,
        word_idx: usize,
    ) {
        *self.counts.entry(pair).or_default() += freq;
        self.words.entry(pair).or_default().insert(word_idx);
    }

    /// Subtract `freq` occurrences of `pair`, dropping the entry once its
    /// count is exhausted. The inverted-index entry is left behind; stale
    /// word sets are pruned when the pair is next selected.
    ///
    /// ## Panics
    /// A missing entry means the incremental accounting diverged from the
    /// split table, which is a programming error.
    pub fn subtract(
        &mut self,
        pair: Pair,
        freq: C,
    ) {
        let Some(count) = self.counts.get_mut(&pair) else {
            panic!("pair statistics out of sync: no count for {pair:?}");
        };
        if *count <= freq {
            self.counts.remove(&pair);
        } else {
            *count -= freq;
        }
    }

    /// Take the word set of `pair`, removing it from the inverted index.
    pub fn take_words(
        &mut self,
        pair: Pair,
    ) -> WMHashSet<usize> {
        self.words.remove(&pair).unwrap_or_default()
    }

    /// Drop the count entry of `pair`.
    pub fn drop_count(
        &mut self,
        pair: Pair,
    ) {
        self.counts.remove(&pair);
    }

    /// The number of distinct pairs with a live count.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no pair has a live count.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans_of(words: &[Vec<u32>]) -> Vec<SymbolSpan> {
        words.iter().map(SymbolSpan::from).collect()
    }

    #[test]
    fn test_from_split_table() {
        // "ab" x2, "abc" x3, ids a=0 b=1 c=2.
        let spans = spans_of(&[vec![0, 1], vec![0, 1, 2]]);
        let freqs: Vec<u64> = vec![2, 3];

        let index = PairIndex::from_split_table(&spans, &freqs);

        assert_eq!(index.count((0, 1)), 5);
        assert_eq!(index.count((1, 2)), 3);
        assert_eq!(index.count((0, 2)), 0);
        assert_eq!(index.len(), 2);

        assert_eq!(
            index.words.get(&(0, 1)),
            Some(&WMHashSet::from_iter([0, 1]))
        );
        assert_eq!(index.words.get(&(1, 2)), Some(&WMHashSet::from_iter([1])));
    }

    #[test]
    fn test_zero_frequency_words_are_skipped() {
        let spans = spans_of(&[vec![0, 1]]);
        let freqs: Vec<u64> = vec![0];

        let index = PairIndex::from_split_table(&spans, &freqs);
        assert!(index.is_empty());
    }

    #[test]
    fn test_subtract_drops_exhausted_entries() {
        let spans = spans_of(&[vec![0, 1]]);
        let freqs: Vec<u64> = vec![4];
        let mut index = PairIndex::from_split_table(&spans, &freqs);

        index.subtract((0, 1), 1);
        assert_eq!(index.count((0, 1)), 3);

        index.subtract((0, 1), 3);
        assert_eq!(index.count((0, 1)), 0);
        assert!(index.is_empty());
    }

    #[test]
    #[should_panic(expected = "pair statistics out of sync")]
    fn test_subtract_missing_entry_panics() {
        let mut index: PairIndex<u64> = PairIndex::default();
        index.subtract((0, 1), 1);
    }

    #[test]
    fn test_take_words() {
        let spans = spans_of(&[vec![0, 1], vec![0, 1]]);
        let freqs: Vec<u64> = vec![1, 1];
        let mut index = PairIndex::from_split_table(&spans, &freqs);

        let words = index.take_words((0, 1));
        assert_eq!(words, WMHashSet::from_iter([0, 1]));
        assert!(index.take_words((0, 1)).is_empty());
    }
}
