//! # Symbol Span Buffer

use crate::types::{Pair, SymbolId};

/// The current split of one word: a mutable span of symbol ids, rewritten
/// as merges land. Concatenating the span always reproduces the word
/// followed by the end-of-word marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSpan {
    symbols: Vec<SymbolId>,
}

impl<S: AsRef<[SymbolId]>> From<S> for SymbolSpan {
    fn from(symbols: S) -> Self {
        Self::from_symbols(symbols.as_ref().to_vec())
    }
}

impl SymbolSpan {
    const DEC: i32 = -1;
    const INC: i32 = 1;

    /// Create a span from symbol ids.
    pub fn from_symbols(symbols: Vec<SymbolId>) -> Self {
        Self { symbols }
    }

    /// View the symbols as a slice.
    pub fn symbols(&self) -> &[SymbolId] {
        &self.symbols
    }

    /// The number of symbols in the span.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the span is empty.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterator over adjacent [`Pair`] windows of this span.
    pub fn pairs(&self) -> impl Iterator<Item = Pair> + '_ {
        self.symbols.windows(2).map(|w| (w[0], w[1]))
    }

    /// Merge all occurrences of `pair -> replacement`, committed
    /// non-overlappingly left to right in a single pass.
    ///
    /// `on_delta` is called for each neighboring pair the rewrite destroys
    /// (`-1`) or creates (`+1`). The left neighbor of a delta is the symbol
    /// last emitted into the rebuilt span, which may already be
    /// `replacement` when occurrences are consecutive; that keeps the
    /// reported deltas exact. Deltas for `pair` itself are not reported;
    /// the caller retires it wholesale.
    pub fn merge_pair_cb<F>(
        &mut self,
        pair: Pair,
        replacement: SymbolId,
        on_delta: &mut F,
    ) where
        F: FnMut(Pair, i32),
    {
        let (a, b) = pair;
        let n = self.symbols.len();
        if n < 2 {
            return;
        }

        let mut rebuilt: Vec<SymbolId> = Vec::with_capacity(n);

        let mut i = 0;
        while i < n {
            let current = self.symbols[i];

            if i + 1 < n && (current, self.symbols[i + 1]) == pair {
                if let Some(&left) = rebuilt.last() {
                    on_delta((left, a), Self::DEC);
                    on_delta((left, replacement), Self::INC);
                }

                if i + 2 < n {
                    let right = self.symbols[i + 2];
                    on_delta((b, right), Self::DEC);
                    on_delta((replacement, right), Self::INC);
                }

                rebuilt.push(replacement);
                i += 2;
            } else {
                rebuilt.push(current);
                i += 1;
            }
        }

        self.symbols = rebuilt;
    }
}
