//! # Partial Map Merger
//!
//! Balanced tree-reduce of per-consumer partial count maps. Counts are
//! integers, so the merge is associative and commutative; the tree shape
//! only bounds peak memory and wall time.

use core::hash::Hash;
use core::ops::AddAssign;

use crate::types::WMHashMap;

/// Merge `source` into `dest`, draining `source`.
///
/// Always iterates the smaller side: the maps are swapped first when
/// `source` is the larger one.
pub fn merge_two<K, C>(
    dest: &mut WMHashMap<K, C>,
    source: &mut WMHashMap<K, C>,
) where
    K: Eq + Hash,
    C: Default + AddAssign,
{
    if source.len() > dest.len() {
        core::mem::swap(dest, source);
    }
    for (key, count) in source.drain() {
        *dest.entry(key).or_default() += count;
    }
}

/// Reduce partial maps into a single owned map via a balanced binary tree.
///
/// The two halves of each level run on separate rayon workers; inputs are
/// consumed destructively.
pub fn merge_counts<K, C>(mut maps: Vec<WMHashMap<K, C>>) -> WMHashMap<K, C>
where
    K: Eq + Hash + Send,
    C: Default + AddAssign + Send,
{
    reduce(&mut maps)
}

fn reduce<K, C>(maps: &mut [WMHashMap<K, C>]) -> WMHashMap<K, C>
where
    K: Eq + Hash + Send,
    C: Default + AddAssign + Send,
{
    match maps.len() {
        0 => WMHashMap::new(),
        1 => core::mem::take(&mut maps[0]),
        len => {
            let (lower, upper) = maps.split_at_mut(len / 2);
            let (mut dest, mut source) = rayon::join(|| reduce(lower), || reduce(upper));
            merge_two(&mut dest, &mut source);
            dest
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts_of(pairs: &[(&str, u64)]) -> WMHashMap<String, u64> {
        pairs
            .iter()
            .map(|&(word, count)| (word.to_string(), count))
            .collect()
    }

    #[test]
    fn test_merge_two_adds_counts() {
        let mut dest = counts_of(&[("low", 2), ("new", 1)]);
        let mut source = counts_of(&[("low", 3)]);

        merge_two(&mut dest, &mut source);

        assert!(source.is_empty());
        assert_eq!(dest, counts_of(&[("low", 5), ("new", 1)]));
    }

    #[test]
    fn test_merge_two_swaps_smaller_into_larger() {
        let mut dest = counts_of(&[("a", 1)]);
        let mut source = counts_of(&[("b", 1), ("c", 1), ("d", 1)]);

        merge_two(&mut dest, &mut source);

        assert_eq!(dest, counts_of(&[("a", 1), ("b", 1), ("c", 1), ("d", 1)]));
    }

    #[test]
    fn test_merge_counts_empty_input() {
        let merged: WMHashMap<String, u64> = merge_counts(Vec::new());
        assert!(merged.is_empty());
    }

    #[test]
    fn test_merge_counts_tree() {
        let maps = vec![
            counts_of(&[("a", 1), ("b", 2)]),
            counts_of(&[("b", 3)]),
            counts_of(&[("c", 4)]),
            counts_of(&[("a", 1), ("c", 1)]),
            counts_of(&[]),
        ];

        let merged = merge_counts(maps);
        assert_eq!(merged, counts_of(&[("a", 2), ("b", 5), ("c", 5)]));
    }
}
