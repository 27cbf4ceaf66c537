//! # Final Token Statistics
//!
//! Per-token usage counts when every word of the corpus is retokenized
//! with the final vocabulary. Reporting only; nothing downstream consumes
//! the numbers.

use rayon::prelude::*;

use crate::corpus::map_merge;
use crate::segment::Segmenter;
use crate::training::is_bpe_word;
use crate::types::{CountType, StringChunkType, WMHashMap};

/// How many words one rayon task tallies before handing off.
const STATS_CHUNK: usize = 1024;

/// Compute the usage count of every final token.
///
/// BPE-eligible words are segmented with the trained vocabulary and each
/// emitted symbol inherits the word's corpus frequency; atomic tokens
/// contribute their frequency directly. The key set is partitioned across
/// rayon workers and the partial maps tree-merge at the end.
pub fn build_token_stats<K, C>(
    word_counts: &WMHashMap<K, C>,
    segmenter: &Segmenter,
) -> WMHashMap<String, C>
where
    K: StringChunkType,
    C: CountType,
{
    let entries: Vec<(&K, C)> = word_counts.iter().map(|(k, &c)| (k, c)).collect();

    entries
        .par_chunks(STATS_CHUNK)
        .fold(WMHashMap::new, |mut local, chunk| {
            for &(word, count) in chunk {
                tally_word(word.as_ref(), count, segmenter, &mut local);
            }
            local
        })
        .reduce(WMHashMap::new, |mut dest, mut source| {
            map_merge::merge_two(&mut dest, &mut source);
            dest
        })
}

fn tally_word<C: CountType>(
    word: &str,
    count: C,
    segmenter: &Segmenter,
    stats: &mut WMHashMap<String, C>,
) {
    if is_bpe_word(word) {
        for token in segmenter.split_word(word) {
            *stats.entry(token).or_default() += count;
        }
    } else {
        *stats.entry(word.to_owned()).or_default() += count;
    }
}

/// Stats as rows sorted alphabetically by token, the persistence order.
pub fn sorted_stats<C: CountType>(stats: &WMHashMap<String, C>) -> Vec<(&str, C)> {
    let mut rows: Vec<(&str, C)> = stats.iter().map(|(token, &count)| (token.as_str(), count)).collect();
    rows.sort_unstable_by(|a, b| a.0.cmp(b.0));
    rows
}
