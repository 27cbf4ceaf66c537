//! # Common Types and Traits

use core::{
    fmt::{Debug, Display},
    hash::Hash,
    ops::{AddAssign, SubAssign},
};

use num_traits::{FromPrimitive, PrimInt, ToPrimitive};

/// Interned id of a vocabulary symbol.
///
/// Symbols are interned once into a [`crate::training::SymbolTable`];
/// every training structure (`S`, `P`, `I`, the merge history) speaks
/// in ids so pair hashing is a pair-of-ints hash.
pub type SymbolId = u32;

/// A pair of adjacent symbols.
pub type Pair = (SymbolId, SymbolId);

/// Type alias for hash maps in this crate.
pub type WMHashMap<K, V> = ahash::AHashMap<K, V>;

/// Type alias for hash sets in this crate.
pub type WMHashSet<V> = ahash::AHashSet<V>;

/// A type that can be used as a word key.
pub trait StringChunkType:
    for<'a> From<&'a str> + AsRef<str> + Debug + Clone + Send + Sync + Eq + Hash + Ord
{
}

impl<T> StringChunkType for T where
    T: for<'a> From<&'a str> + AsRef<str> + Debug + Clone + Send + Sync + Eq + Hash + Ord
{
}

/// A type that can be used as a word count.
pub trait CountType:
    'static
    + PrimInt
    + FromPrimitive
    + ToPrimitive
    + Hash
    + Default
    + Debug
    + Display
    + Send
    + Sync
    + AddAssign
    + SubAssign
{
}

impl<T> CountType for T where
    T: 'static
        + PrimInt
        + FromPrimitive
        + ToPrimitive
        + Hash
        + Default
        + Debug
        + Display
        + Send
        + Sync
        + AddAssign
        + SubAssign
{
}
